use serde::Serialize;

/// Emitted at most once per cycle when new qualifying transfers appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferNotification {
    /// How many qualifying transfers are new since the previous cycle.
    pub count: usize,
    /// Sources that contributed the new transfers.
    pub sources: Vec<String>,
    pub message: String,
}

impl TransferNotification {
    pub fn new(count: usize, sources: Vec<String>) -> Self {
        let message = match count {
            1 => "1 new transfer detected".to_string(),
            n => format!("{n} new transfers detected"),
        };
        Self {
            count,
            sources,
            message,
        }
    }
}

/// Receives scheduler notifications. Delivery is fire-and-forget.
pub trait TransferListener: Send + Sync {
    fn notify(&self, notification: &TransferNotification);
}
