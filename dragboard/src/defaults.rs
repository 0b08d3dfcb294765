//! Tunable engine defaults.
//!
//! Every constant here can be overridden per board through [`BoardConfig`];
//! the order key baseline and spacing live on
//! [`OrderKey`](crate::types::OrderKey) itself.

use std::time::Duration;

/// Pointer travel, in board units, required before a press becomes a drag
pub const ACTIVATION_DISTANCE: f64 = 8.0;

/// Attempts per persistence call: the first try plus one retry
pub const PERSIST_ATTEMPTS: u32 = 2;

/// Delay before the retry attempt
pub const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Capacity of the board event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Per-board overrides for the engine defaults
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Pointer travel before a press arms a drag
    pub activation_distance: f64,
    /// Attempts per persistence call (first try included)
    pub persist_attempts: u32,
    /// Delay between persistence attempts
    pub retry_delay: Duration,
    /// Event channel capacity
    pub event_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            activation_distance: ACTIVATION_DISTANCE,
            persist_attempts: PERSIST_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            event_capacity: EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl BoardConfig {
    /// Create a config with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config suitable for quick unit tests (no real waiting)
    pub fn instant() -> Self {
        Self {
            retry_delay: Duration::from_millis(1),
            ..Self::default()
        }
    }

    /// Set the activation distance
    pub fn with_activation_distance(mut self, distance: f64) -> Self {
        self.activation_distance = distance;
        self
    }

    /// Set the attempts per persistence call
    pub fn with_persist_attempts(mut self, attempts: u32) -> Self {
        self.persist_attempts = attempts;
        self
    }

    /// Set the delay between persistence attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}
