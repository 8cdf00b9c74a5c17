//! Run configuration passed to [`crate::WorkflowRunner`] at construction.

use std::time::Duration;

use jobapp_types::Credentials;
use thiserror::Error;

/// Delay between two poll requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Poll requests issued before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;
/// Time allowed from run start until the confirmation is sent.
pub const DEFAULT_CONFIRMATION_BUDGET: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {field}")]
    MissingField { field: &'static str },

    #[error("invalid timing: {reason}")]
    InvalidTiming { reason: String },
}

/// Polling cadence and the confirmation deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTiming {
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub confirmation_budget: Duration,
}

impl Default for RunTiming {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            confirmation_budget: DEFAULT_CONFIRMATION_BUDGET,
        }
    }
}

impl RunTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidTiming {
                reason: "at least one poll attempt is required".to_string(),
            });
        }
        if self.confirmation_budget.is_zero() {
            return Err(ConfigError::InvalidTiming {
                reason: "confirmation budget must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything a run needs besides the API itself.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub credentials: Credentials,
    pub timing: RunTiming,
}

impl WorkflowConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timing: RunTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: RunTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Reject blank credentials and unusable timing before any request is sent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let credentials = &self.credentials;
        let required = [
            ("EMAIL", &credentials.email),
            ("PASSWORD", &credentials.password),
            ("FIRST_NAME", &credentials.first_name),
            ("LAST_NAME", &credentials.last_name),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::MissingField { field });
        }
        self.timing.validate()
    }
}
