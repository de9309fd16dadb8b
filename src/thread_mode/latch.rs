//! Definition of [`CountdownLatch`].

use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Released when every participant thread counted down.
#[derive(Clone)]
pub(crate) struct CountdownLatch {
    /// Remaining count and the condition signalled when it reaches zero.
    pair: Arc<(Mutex<usize>, Condvar)>,
}

impl CountdownLatch {
    /// Create latch which is released after `count` count downs.
    pub fn new(count: usize) -> Self {
        Self {
            pair: Arc::new((Mutex::new(count), Condvar::new())),
        }
    }

    /// Lock the counter. Poisoned counter is still a valid count.
    fn count(&self) -> MutexGuard<'_, usize> {
        self.pair.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decrement the count and release waiters when it reaches zero.
    pub fn count_down(&self) {
        let mut count = self.count();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.pair.1.notify_all();
        }
    }

    /// Returns `true` if the latch was released before the timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let count = self.count();
        let (count, _) = self
            .pair
            .1
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *count == 0
    }

    /// Returns guard which counts down on drop, also when thread panics.
    pub fn guard(&self) -> LatchGuard {
        LatchGuard {
            latch: self.clone(),
        }
    }
}

/// Counts the latch down once, when dropped.
pub(crate) struct LatchGuard {
    /// Latch to count down.
    latch: CountdownLatch,
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}
