use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

/// Spaces requests at least `min_interval` apart and honours server-imposed
/// pauses after a 429.
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
    min_interval: Duration,
}

struct RateLimitState {
    last_request: Option<Instant>,
    blocked_until: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: Mutex::new(RateLimitState {
                last_request: None,
                blocked_until: None,
            }),
            min_interval,
        }
    }

    pub async fn wait(&self) {
        let mut state = self.state.lock().await;

        let mut ready_at = state
            .last_request
            .map(|last| last + self.min_interval)
            .unwrap_or_else(Instant::now);

        if let Some(blocked_until) = state.blocked_until.take() {
            ready_at = ready_at.max(blocked_until);
        }

        let now = Instant::now();
        if ready_at > now {
            let wait_duration = ready_at - now;
            drop(state);
            tracing::debug!("Throttling, waiting {:?}", wait_duration);
            sleep(wait_duration).await;
            state = self.state.lock().await;
        }

        state.last_request = Some(Instant::now());
    }

    /// Holds the next request back for at least `delay`.
    pub async fn pause_for(&self, delay: Duration) {
        let mut state = self.state.lock().await;
        let until = Instant::now() + delay;
        state.blocked_until = Some(state.blocked_until.map_or(until, |b| b.max(until)));
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_millis(340))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spaces_consecutive_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(340));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(680));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_delays_next_request() {
        let limiter = RateLimiter::new(Duration::from_millis(10));
        limiter.wait().await;
        limiter.pause_for(Duration::from_secs(2)).await;
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
