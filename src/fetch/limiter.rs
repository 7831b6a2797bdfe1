//! Request pacing
//!
//! Two constraints apply before every request: a rolling sixty-second quota
//! window, and a minimum inter-request delay plus random jitter. Both are
//! enforced by sleeping, never by dropping requests.

use crate::config::FetchConfig;
use rand::Rng;
use std::collections::VecDeque;
use tokio::time::{sleep, Duration, Instant};

/// Width of the rolling quota window
const WINDOW: Duration = Duration::from_secs(60);

/// Paces requests against the configured quota and delay
///
/// Timestamps of recent requests are kept in a deque; entries older than the
/// window are pruned on every acquire. Uses tokio's clock, so tests can run
/// it under a paused runtime.
pub struct RateLimiter {
    requests_per_minute: u32,
    min_delay: Duration,
    jitter_min: Duration,
    jitter_max: Duration,
    window: VecDeque<Instant>,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter from the fetch config
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            requests_per_minute: config.requests_per_minute,
            min_delay: Duration::from_millis(config.delay_between_requests_ms),
            jitter_min: Duration::from_millis(config.jitter_min_ms),
            jitter_max: Duration::from_millis(config.jitter_max_ms),
            window: VecDeque::new(),
            last_request: None,
        }
    }

    /// Waits until the next request is allowed, then records it
    ///
    /// Sleeps first for the quota window (if the last minute is full), then
    /// for the minimum delay plus jitter since the previous request.
    pub async fn acquire(&mut self) {
        self.wait_for_window().await;
        self.wait_for_delay().await;

        let now = Instant::now();
        self.window.push_back(now);
        self.last_request = Some(now);
    }

    async fn wait_for_window(&mut self) {
        loop {
            let now = Instant::now();
            while let Some(front) = self.window.front() {
                if now.duration_since(*front) >= WINDOW {
                    self.window.pop_front();
                } else {
                    break;
                }
            }

            if (self.window.len() as u32) < self.requests_per_minute {
                return;
            }

            // Window is full; sleep until the oldest entry ages out
            let oldest = *self.window.front().expect("window is non-empty");
            let wake_at = oldest + WINDOW;
            sleep(wake_at.saturating_duration_since(now)).await;
        }
    }

    async fn wait_for_delay(&mut self) {
        let Some(last) = self.last_request else {
            return;
        };

        let jitter = if self.jitter_max > self.jitter_min {
            let range = (self.jitter_max - self.jitter_min).as_millis() as u64;
            Duration::from_millis(rand::thread_rng().gen_range(0..=range))
        } else {
            Duration::ZERO
        };

        let wake_at = last + self.min_delay + self.jitter_min + jitter;
        let now = Instant::now();
        if wake_at > now {
            sleep(wake_at - now).await;
        }
    }

    /// Number of requests currently inside the rolling window
    pub fn requests_in_window(&self) -> usize {
        self.window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config(rpm: u32, delay_ms: u64) -> FetchConfig {
        FetchConfig {
            requests_per_minute: rpm,
            delay_between_requests_ms: delay_ms,
            jitter_min_ms: 0,
            jitter_max_ms: 0,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_window_blocks_excess_requests() {
        let mut limiter = RateLimiter::new(&create_test_config(3, 0));

        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_eq!(limiter.requests_in_window(), 3);

        // The fourth acquire must wait until the first request ages out
        let start = Instant::now();
        limiter.acquire().await;
        let waited = Instant::now().duration_since(start);
        assert!(waited >= Duration::from_secs(59));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_delay_between_requests() {
        let mut limiter = RateLimiter::new(&create_test_config(100, 2000));

        limiter.acquire().await;
        let start = Instant::now();
        limiter.acquire().await;
        let waited = Instant::now().duration_since(start);
        assert!(waited >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_immediate() {
        let mut limiter = RateLimiter::new(&create_test_config(10, 5000));

        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(Instant::now().duration_since(start), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_prunes_old_entries() {
        let mut limiter = RateLimiter::new(&create_test_config(5, 0));

        limiter.acquire().await;
        sleep(Duration::from_secs(61)).await;
        limiter.acquire().await;
        // The first request has aged out of the window
        assert_eq!(limiter.requests_in_window(), 1);
    }
}
