use async_trait::async_trait;
use tokio::sync::mpsc;

use super::message::ChangeEvent;
use crate::error::AdminResult;

/// Buffer between a transport's reader task and the notifier
pub const SIGNAL_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Broadcast,
    StorageWatch,
}

/// What a transport observed
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeSignal {
    Event(ChangeEvent),
    StorageKeyChanged(String),
}

/// Pub/sub port the change notifier is written against
#[async_trait]
pub trait ChangeTransport: Send + Sync {
    fn kind(&self) -> TransportKind;

    async fn publish(&self, event: &ChangeEvent) -> AdminResult<()>;

    /// Start observing. The reader task stops once the receiver is dropped.
    async fn subscribe(&self) -> AdminResult<mpsc::Receiver<ChangeSignal>>;
}
