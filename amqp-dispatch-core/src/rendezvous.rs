// amqp-dispatch-core/src/rendezvous.rs
//! Capacity-one handoff between a delivery callback and a waiting task.
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{DeliveryCallback, ReplyMessage};

/// Creates a connected sender/receiver pair holding at most one item, ever.
pub fn rendezvous<T>() -> (ReplySender<T>, PendingReply<T>) {
    let (tx, rx) = mpsc::channel(1);
    let sender = ReplySender {
        tx,
        filled: Arc::new(AtomicBool::new(false)),
    };
    (sender, PendingReply { rx })
}

pub struct ReplySender<T> {
    tx: mpsc::Sender<T>,
    filled: Arc<AtomicBool>,
}

impl<T> Clone for ReplySender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            filled: Arc::clone(&self.filled),
        }
    }
}

impl<T> ReplySender<T> {
    /// Returns `false` if the slot was already filled or the receiver is gone.
    pub fn offer(&self, item: T) -> bool {
        if self.filled.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.tx.try_send(item).is_ok()
    }
}

#[async_trait]
impl DeliveryCallback for ReplySender<ReplyMessage> {
    async fn handle(&self, delivery: ReplyMessage) {
        if !self.offer(delivery) {
            debug!("reply slot already filled, dropping extra delivery");
        }
    }
}

/// What a bounded wait on a [`PendingReply`] ended with.
#[derive(Debug, PartialEq, Eq)]
pub enum Polled<T> {
    Item(T),
    Elapsed,
    /// Every sender was dropped without offering anything.
    Closed,
}

pub struct PendingReply<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> PendingReply<T> {
    /// Waits up to `timeout` for the single item.
    pub async fn poll(&mut self, timeout: Duration) -> Polled<T> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(item)) => Polled::Item(item),
            Ok(None) => Polled::Closed,
            Err(_) => Polled::Elapsed,
        }
    }
}
