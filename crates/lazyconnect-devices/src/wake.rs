/*!
 * Level-triggered wake signal for the coordinator worker.
 */
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// A single-slot set/clear flag a sleeping task can wait on
///
/// Setting the flag while nobody waits is not lost: the next [`wait`]
/// returns immediately until the flag is cleared. Any number of `set` calls
/// between two waits coalesce into one wake-up.
///
/// [`wait`]: WakeSignal::wait
#[derive(Debug, Default)]
pub struct WakeSignal {
    flag: AtomicBool,
    notify: Notify,
}

impl WakeSignal {
    /// Create a cleared signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every current waiter
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Clear the flag
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Whether the flag is currently set
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Wait until the flag is set or `ceiling` elapses
    ///
    /// Returns `true` when woken by the flag, `false` on timeout. Does not
    /// clear the flag.
    pub async fn wait(&self, ceiling: Duration) -> bool {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent `set` cannot slip
        // between the check and the wait.
        notified.as_mut().enable();

        if self.is_set() {
            return true;
        }

        tokio::time::timeout(ceiling, notified).await.is_ok()
    }
}
