use core::time::Duration;

use super::ConfigError;
use crate::COMPLIANCE_PORT;

/// Application payload size in confirmed mode (LED state, counter, RSSI, SNR)
pub const CONFIRMED_PAYLOAD_SIZE: u8 = 6;
/// Application payload size in unconfirmed mode (LED state only)
pub const UNCONFIRMED_PAYLOAD_SIZE: u8 = 1;

/// Application parameters of the controller
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Application port used outside compliance testing
    pub app_port: u8,
    /// Send confirmed uplinks by default
    pub confirmed: bool,
    /// Number of transmissions of a confirmed uplink
    pub confirmed_retries: u8,
    /// Adaptive data rate
    pub adr: bool,
    /// Public or private network sync word
    pub public_network: bool,
    /// Regional duty-cycle enforcement in the MAC engine
    pub duty_cycle_enforcement: bool,
    /// Nominal uplink period
    pub tx_period: Duration,
    /// Symmetric jitter bound around the nominal period
    pub tx_jitter: Duration,
    /// Delay between join attempts
    pub join_retry_interval: Duration,
    /// Uplink cadence while a compliance test runs
    pub compliance_cadence: Duration,
    /// How long the TX and RX indicators stay on
    pub indicator_on_time: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_port: 15,
            confirmed: true,
            confirmed_retries: 8,
            adr: true,
            public_network: true,
            duty_cycle_enforcement: false,
            tx_period: Duration::from_millis(5_000),
            tx_jitter: Duration::from_millis(1_000),
            join_retry_interval: Duration::from_millis(10_000),
            compliance_cadence: Duration::from_millis(1),
            indicator_on_time: Duration::from_millis(500),
        }
    }
}

impl AppConfig {
    /// Check that the parameters can drive the controller
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.tx_jitter >= self.tx_period {
            return Err(ConfigError::JitterTooLarge);
        }
        if self.join_retry_interval.is_zero() {
            return Err(ConfigError::ZeroJoinInterval);
        }
        if self.compliance_cadence.is_zero() {
            return Err(ConfigError::ZeroComplianceCadence);
        }
        if self.app_port == 0 || self.app_port == COMPLIANCE_PORT {
            return Err(ConfigError::InvalidPort(self.app_port));
        }
        Ok(())
    }

    /// Default application payload size for the given confirmed mode
    pub fn payload_size(confirmed: bool) -> u8 {
        if confirmed {
            CONFIRMED_PAYLOAD_SIZE
        } else {
            UNCONFIRMED_PAYLOAD_SIZE
        }
    }
}
