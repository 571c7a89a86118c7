//! Sliding-window rate limiter, one per provider.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            window,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Provider quotas: Adzuna 100/hour, Remotive 60/minute, JSearch 50/minute.
    pub fn for_provider(provider: &str) -> Self {
        match provider {
            "Adzuna" => Self::new(100, Duration::from_secs(3600)),
            "JSearch" => Self::new(50, Duration::from_secs(60)),
            _ => Self::new(60, Duration::from_secs(60)),
        }
    }

    /// Waits until a call fits in the window, then records it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.calls.lock().await;
                let now = Instant::now();
                self.prune(&mut calls, now);
                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    return;
                }
                match calls.front() {
                    Some(oldest) => self.window.saturating_sub(now - *oldest),
                    None => Duration::ZERO,
                }
            };
            warn!("Rate limit reached. Waiting {:.2} seconds...", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }

    pub async fn calls_in_window(&self) -> usize {
        let mut calls = self.calls.lock().await;
        self.prune(&mut calls, Instant::now());
        calls.len()
    }

    fn prune(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(oldest) = calls.front() {
            if now - *oldest >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}
