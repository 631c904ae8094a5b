//! Outgoing application frame
//!
//! The frame is rebuilt once per transmit attempt, right before submission,
//! and resent verbatim when the MAC engine asks for a retry.

use heapless::Vec;

use crate::compliance::ComplianceTest;
use crate::config::AppConfig;
use crate::status::{Indicator, StatusStore};
use crate::{COMPLIANCE_PORT, MAX_APP_PAYLOAD_SIZE};

/// Application uplink staged for the MAC engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingFrame {
    port: u8,
    confirmed: bool,
    payload: Vec<u8, MAX_APP_PAYLOAD_SIZE>,
}

impl OutgoingFrame {
    /// Empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Destination port
    pub fn port(&self) -> u8 {
        self.port
    }

    /// Whether the frame is sent as a confirmed uplink
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload size
    pub fn size(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Rebuild the frame for the active application port
    ///
    /// On the application port the payload is the application LED state,
    /// followed in confirmed mode by the last downlink counter, RSSI (both big
    /// endian) and SNR. On the compliance port the payload is whatever the
    /// compliance test staged.
    pub fn build(&mut self, compliance: &mut ComplianceTest, status: &StatusStore) {
        self.port = compliance.port();
        self.confirmed = compliance.confirmed();
        self.payload.clear();

        if self.port == COMPLIANCE_PORT {
            // Compliance payloads never exceed the frame capacity
            let _ = self.payload.extend_from_slice(compliance.build_uplink());
            return;
        }

        let _ = self.payload.push(status.indicator(Indicator::App) as u8);
        if self.confirmed {
            let downlink = status.downlink();
            let _ = self.payload.extend_from_slice(&downlink.counter.to_be_bytes());
            let _ = self.payload.extend_from_slice(&downlink.rssi.to_be_bytes());
            let _ = self.payload.push(downlink.snr as u8);
        }
        debug_assert_eq!(self.size(), AppConfig::payload_size(self.confirmed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfirmed_app_frame() {
        let mut compliance = ComplianceTest::new(15, false);
        let mut status = StatusStore::new();
        status.set_indicator(Indicator::App, true);

        let mut frame = OutgoingFrame::new();
        frame.build(&mut compliance, &status);

        assert_eq!(frame.port(), 15);
        assert!(!frame.is_confirmed());
        assert_eq!(frame.payload(), &[0x01]);
        assert_eq!(frame.size(), AppConfig::payload_size(false));
    }

    #[test]
    fn test_confirmed_app_frame() {
        let mut compliance = ComplianceTest::new(15, true);
        let mut status = StatusStore::new();
        status.update_downlink(|downlink| {
            downlink.counter = 0x1234;
            downlink.rssi = -90;
            downlink.snr = -7;
        });

        let mut frame = OutgoingFrame::new();
        frame.build(&mut compliance, &status);

        assert!(frame.is_confirmed());
        assert_eq!(frame.payload(), &[0x00, 0x12, 0x34, 0xFF, 0xA6, 0xF9]);
        assert_eq!(frame.size(), AppConfig::payload_size(true));
    }

    #[test]
    fn test_rebuild_replaces_previous_content() {
        let mut compliance = ComplianceTest::new(15, true);
        let status = StatusStore::new();
        let mut frame = OutgoingFrame::new();
        frame.build(&mut compliance, &status);
        assert_eq!(frame.size(), 6);

        compliance.on_downlink(&[0x01, 0x01, 0x01, 0x01]);
        frame.build(&mut compliance, &status);
        assert_eq!(frame.port(), COMPLIANCE_PORT);
        assert!(!frame.is_confirmed());
        assert_eq!(frame.payload(), &[0x00, 0x00]);
    }
}
