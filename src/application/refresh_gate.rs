// Single-flight guard around upstream refreshes of one source
use tokio::sync::{Mutex, MutexGuard};

/// Serializes refreshes of one upstream and remembers when the last
/// attempt failed, so request-time refreshes can back off.
pub struct RefreshGate {
    last_failure_ms: Mutex<Option<i64>>,
    retry_backoff_ms: i64,
}

/// Held while a refresh is in flight; other callers wait in `enter`.
pub struct RefreshPermit<'a> {
    last_failure_ms: MutexGuard<'a, Option<i64>>,
    retry_backoff_ms: i64,
}

impl RefreshGate {
    pub fn new(retry_backoff_ms: i64) -> Self {
        Self {
            last_failure_ms: Mutex::new(None),
            retry_backoff_ms,
        }
    }

    pub async fn enter(&self) -> RefreshPermit<'_> {
        RefreshPermit {
            last_failure_ms: self.last_failure_ms.lock().await,
            retry_backoff_ms: self.retry_backoff_ms,
        }
    }
}

impl RefreshPermit<'_> {
    pub fn backing_off(&self, now_ms: i64) -> bool {
        match *self.last_failure_ms {
            Some(failed_at) => now_ms - failed_at < self.retry_backoff_ms,
            None => false,
        }
    }

    pub fn record<T>(&mut self, now_ms: i64, outcome: &anyhow::Result<T>) {
        *self.last_failure_ms = match outcome {
            Ok(_) => None,
            Err(_) => Some(now_ms),
        };
    }
}
