use std::sync::atomic::{AtomicU64, Ordering};

/// Race arbitration by request order: only the most recently issued token is current
#[derive(Debug, Default)]
pub struct SequenceGate {
    latest: AtomicU64,
}

impl SequenceGate {
    /// Mints the next token, making every earlier one stale
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}
