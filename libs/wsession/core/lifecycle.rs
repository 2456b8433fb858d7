use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tracks whether a session is still alive
///
/// Starts active and is deactivated exactly once, at teardown. Every
/// asynchronous continuation of the session checks [`LifecycleGuard::is_active`]
/// before touching state or invoking hooks. Clones share the same flag.
#[derive(Debug, Clone)]
pub struct LifecycleGuard {
    active: Arc<AtomicBool>,
}

impl LifecycleGuard {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Flip the guard to inactive
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}
