use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cooperative cancellation signal shared by the dispatcher, its workers and
/// the prober
///
/// Once triggered it stays triggered. Workers stop pulling new targets,
/// pacing and backoff sleeps return early, and requests already on the wire
/// finish or run into their own timeout.
#[derive(Debug, Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Requests shutdown; idempotent
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes once shutdown has been requested
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender outlives every handle, so this can only end by triggering
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }

    /// Sleeps for `duration` unless shutdown is requested first
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.triggered() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
