use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation shared between a download and whoever may
/// interrupt it.
///
/// Clones observe the same flag. The downloader checks it before each
/// listing request and before each item; a transfer already in flight is
/// allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag so the handle can drive another download.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
