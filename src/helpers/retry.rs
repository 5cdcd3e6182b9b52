use std::thread;
use std::time::Duration;
use log::{debug, info, warn};

/// Retry mechanism with a fixed delay between attempts
///
/// Discogs allows one request per second, so the default delay is one second.
#[derive(Debug, Clone)]
pub struct RetryHandler {
    /// Current retry number (0 before the first retry)
    attempt: usize,
    /// Maximum number of retries after the initial attempt
    max_retries: usize,
    delay: Duration,
}

impl RetryHandler {
    /// Create a handler allowing `max_retries` retries after the first attempt
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self {
            attempt: 0,
            max_retries,
            delay,
        }
    }

    /// A handler that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Number of retries performed so far
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub fn should_retry(&self) -> bool {
        self.attempt < self.max_retries
    }

    /// Sleep for the retry delay and count the retry
    pub fn wait(&mut self) {
        debug!("Retry attempt {}: waiting {:?} before next attempt", self.attempt + 1, self.delay);
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.attempt += 1;
    }

    /// Run an operation, retrying while it fails with a retryable error
    ///
    /// # Arguments
    /// * `operation` - The operation to run
    /// * `is_retryable` - Decides whether an error warrants another attempt
    /// * `operation_name` - Name for logging purposes
    pub fn execute_with_retry<T, E, F, R>(
        &mut self,
        mut operation: F,
        is_retryable: R,
        operation_name: &str,
    ) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        R: Fn(&E) -> bool,
    {
        loop {
            debug!("Attempting {} (attempt {})", operation_name, self.attempt + 1);
            match operation() {
                Ok(result) => {
                    if self.attempt > 0 {
                        info!("{} succeeded on attempt {}", operation_name, self.attempt + 1);
                    }
                    return Ok(result);
                }
                Err(e) => {
                    if !is_retryable(&e) {
                        return Err(e);
                    }
                    if !self.should_retry() {
                        if self.max_retries > 0 {
                            warn!("{} failed after {} attempts, giving up", operation_name, self.attempt + 1);
                        }
                        return Err(e);
                    }
                    self.wait();
                }
            }
        }
    }
}

impl Default for RetryHandler {
    fn default() -> Self {
        Self::none()
    }
}
