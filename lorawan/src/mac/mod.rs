//! External LoRaWAN MAC engine interface
//!
//! The controller never implements MAC semantics. It talks to the engine
//! through the request API in [`engine`] and receives the results as the
//! event objects in [`event`]:
//! - Confirms: outcome of a locally initiated request (join, data, link check)
//! - Indications: unsolicited events such as downlink data

/// MAC engine request API
pub mod engine;

/// Confirm and indication events
pub mod event;

pub use engine::{MacEngine, MacError, MacParam, SendRequest};
pub use event::{decode_snr, Confirm, Indication, MacEvent, MacStatus, RequestKind};
