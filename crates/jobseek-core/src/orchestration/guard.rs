use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Single-slot in-flight guard. Each search takes a ticket; taking a new one
/// supersedes every ticket handed out before it.
#[derive(Clone, Debug, Default)]
pub struct InFlightGuard {
    generation: Arc<AtomicU64>,
}

#[derive(Clone, Debug)]
pub struct SearchTicket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> SearchTicket {
        let issued = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SearchTicket {
            generation: self.generation.clone(),
            issued,
        }
    }
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.issued
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }

    pub fn is_superseded(&self) -> bool {
        !self.is_current()
    }
}
