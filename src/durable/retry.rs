//! Bounded fixed-delay retry
//!
//! Blocking: the calling thread sleeps between attempts. There is no
//! cancellation; the loop runs until success or the attempt ceiling.

use std::io;
use std::thread;
use std::time::Duration;

/// Default attempt ceiling for the atomic replace
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Attempt ceiling and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds or the ceiling is reached.
    ///
    /// `op` receives the 1-based attempt number. `on_retry` is called with
    /// the failed attempt number and its error before each sleep. On
    /// exhaustion the last error is returned with the number of attempts
    /// made.
    pub fn run<T, F, R>(&self, mut op: F, mut on_retry: R) -> Result<(T, u32), (io::Error, u32)>
    where
        F: FnMut(u32) -> io::Result<T>,
        R: FnMut(u32, &io::Error),
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if attempt >= self.max_attempts => return Err((e, attempt)),
                Err(e) => {
                    on_retry(attempt, &e);
                    thread::sleep(self.delay);
                    attempt += 1;
                }
            }
        }
    }
}
