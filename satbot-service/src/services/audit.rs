//! Best-effort audit trail of chat interactions.
//!
//! Records are handed to a background task over a bounded channel with
//! `try_send`. The request path never waits on it, and a full or closed channel
//! only drops the record.

use std::time::Duration;
use tokio::sync::mpsc;

/// Records buffered before new ones are dropped.
pub const AUDIT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub question: String,
    pub response_time: Duration,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    tx: mpsc::Sender<AuditRecord>,
}

impl AuditLog {
    /// Wrap an existing sender. The caller owns the receiving side.
    pub fn new(tx: mpsc::Sender<AuditRecord>) -> Self {
        Self { tx }
    }

    /// Start a background task that writes records to the `satbot::audit` target.
    /// Must be called from inside a tokio runtime.
    pub fn spawn(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(drain(rx));
        Self::new(tx)
    }

    pub fn record(&self, record: AuditRecord) {
        if let Err(e) = self.tx.try_send(record) {
            tracing::debug!(error = %e, "Dropped audit record");
        }
    }
}

async fn drain(mut rx: mpsc::Receiver<AuditRecord>) {
    while let Some(record) = rx.recv().await {
        tracing::info!(
            target: "satbot::audit",
            question = %record.question,
            response_time = %format!("{:.4} seconds", record.response_time.as_secs_f64()),
            "Chat interaction"
        );
    }
}
