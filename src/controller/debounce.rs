//! Trailing-edge debouncer
//!
//! Every `push` restarts the quiet period; only the last value pushed is
//! released once the period elapses without another push.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Quiet period applied to search input
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Releases the pending value if its deadline has passed
    pub fn poll(&mut self) -> Option<T> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Waits out the current quiet period and releases the pending value.
    /// Returns `None` immediately when nothing is pending.
    pub async fn settled(&mut self) -> Option<T> {
        let deadline = self.deadline?;
        sleep_until(deadline).await;
        self.poll()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
