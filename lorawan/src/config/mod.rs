//! Device and application configuration
//!
//! This module contains the commissioning inputs of the end device and the
//! application parameters of the controller. It includes:
//! - Activation (OTAA identifiers and key, or ABP session parameters)
//! - Application port, confirmed mode and MAC flags
//! - Duty-cycle window and indicator timing

/// Application parameters
pub mod app;

/// Device commissioning
pub mod device;

pub use app::AppConfig;
pub use device::Activation;

/// Configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Nominal duty-cycle period is zero
    ZeroPeriod,
    /// Jitter bound is not strictly smaller than the nominal period
    JitterTooLarge,
    /// Join retry interval is zero
    ZeroJoinInterval,
    /// Compliance cadence is zero
    ZeroComplianceCadence,
    /// Application port is 0 or the reserved compliance port
    InvalidPort(u8),
}
