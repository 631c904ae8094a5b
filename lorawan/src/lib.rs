//! Class A LoRaWAN end-device application controller
//!
//! This crate drives a Class A end device on top of an external LoRaWAN MAC
//! engine. It does not implement the MAC itself (channel plans, ADR, crypto and
//! regional duty-cycle enforcement stay with the engine); it orchestrates it:
//!
//! # Features
//! - Device state machine (init, join, send, cycle, sleep)
//! - OTAA and ABP activation
//! - MAC confirm/indication adapter with owned status snapshots
//! - LoRaWAN certification compliance test protocol on port 224
//! - Duty-cycle scheduling with randomized jitter
//! - At most one outstanding transmission at any time
//! - `no_std`, no allocation
//!
//! # Example
//! ```ignore
//! use lorawan_app::{
//!     config::{app::AppConfig, device::Activation},
//!     controller::{Controller, Timers},
//! };
//!
//! let activation = Activation::Otaa {
//!     dev_eui: [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF],
//!     app_eui: [0x00; 8],
//!     app_key: [0x11; 16],
//! };
//!
//! // MAC engine, timers, display and RNG are board specific
//! let mut controller = Controller::new(
//!     mac,
//!     Timers { duty_cycle, tx_indicator, rx_indicator },
//!     display,
//!     rng,
//!     activation,
//!     AppConfig::default(),
//! )?;
//!
//! loop {
//!     controller.process();
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), no_std)]

/// Commissioning and application configuration
pub mod config;

/// Compliance test protocol (port 224)
pub mod compliance;

/// Device controller state machine and MAC event adapter
pub mod controller;

/// Display collaborator interface
pub mod display;

/// Outgoing frame construction
pub mod frame;

/// External MAC engine interface
pub mod mac;

/// Duty-cycle scheduling
pub mod scheduler;

/// Critical-section protected controller handle
pub mod shared;

/// Status snapshots and refresh flags
pub mod status;

/// One-shot timer abstraction
pub mod timer;

#[cfg(feature = "defmt")]
#[allow(unused_imports)]
pub(crate) use defmt::{debug, error, info, warn};

#[cfg(not(feature = "defmt"))]
#[allow(unused_imports)]
pub(crate) use log::{debug, error, info, warn};

/// Reserved application port of the compliance test protocol
pub const COMPLIANCE_PORT: u8 = 224;

/// Maximum application payload carried in a single uplink
pub const MAX_APP_PAYLOAD_SIZE: usize = 64;

/// Maximum LoRaWAN MAC payload size
pub const MAX_MAC_PAYLOAD_SIZE: usize = 242;
