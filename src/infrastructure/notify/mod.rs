//! Shipped [`TransferListener`] implementations.

use crate::domain::ports::listener::{TransferListener, TransferNotification};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Logs each notification at info level.
#[derive(Debug, Default)]
pub struct TracingListener;

impl TransferListener for TracingListener {
    fn notify(&self, notification: &TransferNotification) {
        info!(
            count = notification.count,
            sources = ?notification.sources,
            "{}",
            notification.message
        );
    }
}

/// Forwards notifications into an unbounded channel.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<TransferNotification>,
}

impl ChannelListener {
    pub fn new(tx: mpsc::UnboundedSender<TransferNotification>) -> Self {
        Self { tx }
    }

    /// Listener plus the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransferNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TransferListener for ChannelListener {
    fn notify(&self, notification: &TransferNotification) {
        if self.tx.send(notification.clone()).is_err() {
            warn!("notification receiver dropped");
        }
    }
}
