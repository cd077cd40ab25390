use std::time::Duration;

use amqp_dispatch_core::Confirmation;
use tokio::sync::watch;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ConfirmState {
    outstanding: usize,
    nacked: bool,
}

/// Counts publishes the broker has not confirmed yet.
///
/// Only a counter and a nack flag are kept, so publishes that nobody waits on
/// leave nothing behind once the broker answers them.
pub(crate) struct ConfirmTracker {
    state: watch::Sender<ConfirmState>,
}

impl ConfirmTracker {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ConfirmState::default());
        Self { state }
    }

    pub(crate) fn begin(&self) {
        self.state.send_modify(|s| s.outstanding += 1);
    }

    pub(crate) fn settle(&self, nacked: bool) {
        self.state.send_modify(|s| {
            s.outstanding = s.outstanding.saturating_sub(1);
            s.nacked |= nacked;
        });
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.state.borrow().outstanding
    }

    /// Waits for every publish begun so far. A nack seen since the previous
    /// wait is reported once, then cleared.
    pub(crate) async fn wait(&self, timeout: Duration) -> Confirmation {
        let mut rx = self.state.subscribe();
        let settled = tokio::time::timeout(timeout, rx.wait_for(|s| s.outstanding == 0))
            .await
            .is_ok();
        if !settled {
            return Confirmation::TimedOut;
        }

        let mut nacked = false;
        self.state.send_modify(|s| {
            nacked = s.nacked;
            s.nacked = false;
        });
        if nacked {
            Confirmation::Nacked
        } else {
            Confirmation::Acked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn settled_publishes_leave_nothing_pending() {
        let tracker = ConfirmTracker::new();
        for _ in 0..10_000 {
            tracker.begin();
            tracker.settle(false);
        }
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn wait_with_nothing_outstanding_acks() {
        let tracker = ConfirmTracker::new();
        assert_eq!(tracker.wait(Duration::from_millis(10)).await, Confirmation::Acked);
    }

    #[tokio::test]
    async fn wait_sees_late_ack() {
        let tracker = Arc::new(ConfirmTracker::new());
        tracker.begin();

        let t = Arc::clone(&tracker);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            t.settle(false);
        });

        assert_eq!(tracker.wait(Duration::from_secs(5)).await, Confirmation::Acked);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn nack_is_reported_once() {
        let tracker = ConfirmTracker::new();
        tracker.begin();
        tracker.begin();
        tracker.settle(true);
        tracker.settle(false);

        assert_eq!(tracker.wait(Duration::from_millis(10)).await, Confirmation::Nacked);
        assert_eq!(tracker.wait(Duration::from_millis(10)).await, Confirmation::Acked);
    }

    #[tokio::test]
    async fn unanswered_publish_times_out() {
        let tracker = ConfirmTracker::new();
        tracker.begin();
        assert_eq!(tracker.wait(Duration::from_millis(20)).await, Confirmation::TimedOut);
        assert_eq!(tracker.outstanding(), 1);
    }
}
