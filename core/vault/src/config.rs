//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use vaultpass_common::{Error, Result};

/// Default inactivity timeout (10 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default expiry tick period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Longest configurable auto-clear preference, in minutes.
pub const MAX_TIMEOUT_MINUTES: u64 = 12 * 60;

/// Configuration for a vault session.
///
/// The timeout comes from the user's auto-clear preference; the tick period
/// only controls how often the background task re-checks the deadline and has
/// no effect on when the deadline falls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity timeout; a pure wall-clock deadline from the moment of unlock.
    pub timeout: Duration,
    /// How often the expiry task polls the clock.
    pub tick: Duration,
}

impl SessionConfig {
    /// Build a config from the user's auto-clear preference.
    ///
    /// # Errors
    /// - Returns error if minutes is zero or above [`MAX_TIMEOUT_MINUTES`]
    pub fn from_minutes(minutes: u64) -> Result<Self> {
        if minutes == 0 || minutes > MAX_TIMEOUT_MINUTES {
            return Err(Error::InvalidInput(format!(
                "Auto-clear time must be between 1 and {} minutes",
                MAX_TIMEOUT_MINUTES
            )));
        }
        Ok(Self {
            timeout: Duration::from_secs(minutes * 60),
            tick: DEFAULT_TICK,
        })
    }

    /// Override the timeout with an arbitrary duration.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the tick period.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            tick: DEFAULT_TICK,
        }
    }
}
