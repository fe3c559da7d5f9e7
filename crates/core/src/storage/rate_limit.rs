use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_REQUESTS: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Rolling-window limiter keyed by client address.
///
/// Only accepted requests are recorded, so a client that keeps hammering
/// while blocked does not extend its own lockout. Clients with no hit inside
/// the window are dropped by a sweep that runs at most once per window.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    state: Mutex<LimiterState>,
}

#[derive(Debug, Default)]
struct LimiterState {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(LimiterState::default()),
        }
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Returns `true` and records the hit when `key` is under its limit.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        if self.max_requests == 0 {
            return false;
        }

        let mut state = self.state.lock();
        let due = state
            .last_sweep
            .map_or(true, |t| now.saturating_duration_since(t) >= self.window);
        if due {
            let span = self.window;
            state.hits.retain(|_, w| {
                w.back()
                    .is_some_and(|last| now.saturating_duration_since(*last) < span)
            });
            state.last_sweep = Some(now);
        }

        let window = state.hits.entry(key.to_string()).or_default();

        while let Some(oldest) = window.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.max_requests {
            return false;
        }
        window.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.state.lock().hits.len()
    }
}
