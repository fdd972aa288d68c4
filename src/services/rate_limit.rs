use std::sync::Arc;
use std::time::Duration;

use crate::db::LocalStore;
use crate::errors::BookingError;

/// Local-store key holding recent submission timestamps (milliseconds).
pub const RATE_LIMIT_KEY: &str = "mm_rate_limit";

/// Sliding-window limit on outbound submissions, persisted alongside the
/// bookings so it survives restarts.
pub struct RateLimiter {
    backend: Arc<dyn LocalStore>,
    max_submissions: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(backend: Arc<dyn LocalStore>, max_submissions: usize, window: Duration) -> Self {
        Self {
            backend,
            max_submissions,
            window,
        }
    }

    /// Records a submission at `now_ms`, or refuses if the window is full.
    pub fn check(&self, now_ms: i64) -> Result<(), BookingError> {
        let window_ms = self.window.as_millis() as i64;
        let mut recent: Vec<i64> = self
            .load()
            .into_iter()
            .filter(|t| now_ms - t < window_ms)
            .collect();

        if recent.len() >= self.max_submissions {
            tracing::warn!(recent = recent.len(), "submission rate limit reached");
            return Err(BookingError::RateLimited {
                window_minutes: self.window.as_secs().div_ceil(60),
            });
        }

        recent.push(now_ms);
        match serde_json::to_string(&recent) {
            Ok(json) => {
                if let Err(e) = self.backend.set_item(RATE_LIMIT_KEY, &json) {
                    tracing::warn!(error = %e, "failed to record submission time");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode submission times"),
        }
        Ok(())
    }

    fn load(&self) -> Vec<i64> {
        match self.backend.get_item(RATE_LIMIT_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read submission times");
                Vec::new()
            }
        }
    }
}
