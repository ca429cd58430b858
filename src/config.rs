use crate::error::{Result, SentinelError};
use crate::state::RetryPolicy;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct SentinelConfig {
    /// Retries permitted within the window before a failure goes terminal
    pub max_retry_attempts: u32,
    /// Sliding retry window in seconds
    pub retry_window_secs: u32,
    /// Capacity of the transition broadcast channel
    pub event_channel_capacity: usize,
    pub custom_settings: HashMap<String, String>,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            retry_window_secs: 300,
            event_channel_capacity: 1000,
            custom_settings: HashMap::new(),
        }
    }
}

impl SentinelConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(max_attempts) = std::env::var("SENTINEL_MAX_RETRY_ATTEMPTS") {
            config.max_retry_attempts = max_attempts.parse().map_err(|e| {
                SentinelError::ConfigurationError(format!("Invalid max_retry_attempts: {e}"))
            })?;
        }

        if let Ok(window) = std::env::var("SENTINEL_RETRY_WINDOW_SECS") {
            config.retry_window_secs = window.parse().map_err(|e| {
                SentinelError::ConfigurationError(format!("Invalid retry_window_secs: {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("SENTINEL_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.parse().map_err(|e| {
                SentinelError::ConfigurationError(format!("Invalid event_channel_capacity: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Build the default retry policy from the configured window settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.max_retry_attempts == 0 {
            RetryPolicy::Never
        } else {
            RetryPolicy::MaxAttemptsWithinWindow {
                max_attempts: self.max_retry_attempts,
                window_secs: self.retry_window_secs,
            }
        }
    }
}
