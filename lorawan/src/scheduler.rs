//! Duty-cycle scheduling
//!
//! Computes the delay until the next transmit attempt. Arming the timer is up
//! to the caller.

use core::time::Duration;

use rand_core::RngCore;

use crate::config::{AppConfig, ConfigError};

/// Nominal uplink period with symmetric random jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    period: Duration,
    jitter: Duration,
    compliance_cadence: Duration,
}

impl DutyCycle {
    /// Window of `period ± jitter`, or `compliance_cadence` while testing
    pub fn new(
        period: Duration,
        jitter: Duration,
        compliance_cadence: Duration,
    ) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if jitter >= period {
            return Err(ConfigError::JitterTooLarge);
        }
        if compliance_cadence.is_zero() {
            return Err(ConfigError::ZeroComplianceCadence);
        }
        Ok(Self {
            period,
            jitter,
            compliance_cadence,
        })
    }

    /// Window taken from the application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::new(config.tx_period, config.tx_jitter, config.compliance_cadence)
    }

    /// Shortest delay [`next_delay`](Self::next_delay) can return outside testing
    pub fn min_delay(&self) -> Duration {
        self.period - self.jitter
    }

    /// Longest delay [`next_delay`](Self::next_delay) can return outside testing
    pub fn max_delay(&self) -> Duration {
        self.period + self.jitter
    }

    /// Delay until the next transmit attempt
    ///
    /// The offset into the window is drawn at microsecond resolution, so the
    /// result stays within [`min_delay`](Self::min_delay) and
    /// [`max_delay`](Self::max_delay) for sub-millisecond windows too.
    pub fn next_delay(&self, compliance_running: bool, rng: &mut impl RngCore) -> Duration {
        if compliance_running {
            return self.compliance_cadence;
        }
        let span = 2 * self.jitter.as_micros() as u64 + 1;
        let offset = rng.next_u64() % span;
        self.min_delay() + Duration::from_micros(offset)
    }
}
