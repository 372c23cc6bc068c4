use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Polled by the pipeline between units of work.
pub trait StopSignal: Send + Sync {
    fn should_stop(&self) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

impl StopSignal for InterruptFlag {
    fn should_stop(&self) -> bool {
        self.is_raised()
    }
}

pub struct NeverStop;

impl StopSignal for NeverStop {
    fn should_stop(&self) -> bool {
        false
    }
}
