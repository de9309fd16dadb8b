//! Definition of [`CancelToken`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative stop request for one participant.
///
/// Participant checks the token at every suspension point.
/// Setting the flag alone does not wake a waiting participant,
/// so the driver wakes waiters through its turn token after cancelling.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    /// Set once cancellation is requested.
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create token which is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Allows to check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
