//! Fixed-window rate limiting for model calls
//!
//! The limiter is owned by the analysis service and injected wherever calls
//! are issued; it is cheap to clone and all clones share one window.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    calls: u32,
}

/// Asynchronous fixed-window call limiter.
///
/// Grants up to `limit` slots per window; callers over the quota suspend
/// until the window resets. A burst straddling a window boundary can briefly
/// exceed the average rate.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<WindowState>>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                window_start: Instant::now(),
                calls: 0,
            })),
            limit: limit.max(1),
            window,
        }
    }

    /// Wait until a call slot is available, then consume it.
    ///
    /// The lock is never held across the sleep.
    pub async fn await_slot(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let elapsed = state.window_start.elapsed();

                if elapsed >= self.window {
                    state.window_start = Instant::now();
                    state.calls = 0;
                }

                if state.calls < self.limit {
                    state.calls += 1;
                    return;
                }

                self.window.saturating_sub(state.window_start.elapsed())
            };

            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                limit = self.limit,
                "Rate limit window exhausted, waiting for reset"
            );
            tokio::time::sleep(wait).await;
        }
    }
}
