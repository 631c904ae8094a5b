//! LoRaWAN certification compliance test protocol
//!
//! Test commands arrive as downlinks on [`COMPLIANCE_PORT`]. While a test
//! runs the application uplinks on the same port and answers each command
//! with the payload it expects:
//!
//! | command | uplink |
//! |---|---|
//! | `01 01 01 01` (not running) | start test, counter echo |
//! | `00` | stop test, back to the application port |
//! | `01` | 2-byte big-endian downlink counter |
//! | `02` / `03` | confirmed uplinks on / off, counter echo |
//! | `04 ..` | `04` followed by every received byte plus one |
//! | `05` | link check, answered with `05 margin gateways` |
//!
//! Commands only stage state; the uplink payload is produced at transmit time
//! by [`ComplianceTest::build_uplink`].

use heapless::Vec;

use crate::{debug, info, warn};
use crate::{COMPLIANCE_PORT, MAX_APP_PAYLOAD_SIZE};

/// Payload that starts a compliance test
pub const ENABLE_COMMAND: [u8; 4] = [0x01, 0x01, 0x01, 0x01];

/// Uplink tag of a link check answer
const LINK_CHECK_TAG: u8 = 5;

/// Compliance test sub-state, the first byte of a test command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SubState {
    /// Stop the test
    Disable = 0,
    /// Echo the downlink counter
    Echo = 1,
    /// Switch to confirmed uplinks
    ConfirmedOn = 2,
    /// Switch to unconfirmed uplinks
    ConfirmedOff = 3,
    /// Echo the received payload incremented by one
    EchoIncrement = 4,
    /// Request a link check
    LinkCheck = 5,
}

impl TryFrom<u8> for SubState {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(SubState::Disable),
            1 => Ok(SubState::Echo),
            2 => Ok(SubState::ConfirmedOn),
            3 => Ok(SubState::ConfirmedOff),
            4 => Ok(SubState::EchoIncrement),
            5 => Ok(SubState::LinkCheck),
            other => Err(other),
        }
    }
}

/// Side effect on the MAC engine requested by a test command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Test started: force ADR on, disable duty-cycle enforcement
    Enabled,
    /// Test stopped: restore the configured ADR and duty-cycle enforcement
    Disabled,
    /// Issue a link check request
    LinkCheck,
}

/// Compliance test state and the application transmit parameters it controls
#[derive(Debug, Clone)]
pub struct ComplianceTest {
    running: bool,
    sub_state: SubState,
    confirmed: bool,
    port: u8,
    payload: Vec<u8, MAX_APP_PAYLOAD_SIZE>,
    downlink_counter: u16,
    link_check_pending: bool,
    demod_margin: u8,
    gateway_count: u8,
    default_port: u8,
    default_confirmed: bool,
}

impl ComplianceTest {
    /// Disabled test, uplinks on `app_port` with the given confirmed mode
    pub fn new(app_port: u8, confirmed: bool) -> Self {
        Self {
            running: false,
            sub_state: SubState::Disable,
            confirmed,
            port: app_port,
            payload: Vec::new(),
            downlink_counter: 0,
            link_check_pending: false,
            demod_margin: 0,
            gateway_count: 0,
            default_port: app_port,
            default_confirmed: confirmed,
        }
    }

    /// Whether a test is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current sub-state
    pub fn sub_state(&self) -> SubState {
        self.sub_state
    }

    /// Whether uplinks are confirmed
    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    /// Active application port
    pub fn port(&self) -> u8 {
        self.port
    }

    /// Downlinks counted since the test started
    pub fn downlink_counter(&self) -> u16 {
        self.downlink_counter
    }

    /// Whether a link check answer waits to be sent
    pub fn link_check_pending(&self) -> bool {
        self.link_check_pending
    }

    /// Count an accepted downlink event
    pub fn count_downlink(&mut self) {
        if self.running {
            self.downlink_counter = self.downlink_counter.wrapping_add(1);
        }
    }

    /// Record a link check answer
    pub fn on_link_check(&mut self, demod_margin: u8, gateway_count: u8) {
        if !self.running {
            return;
        }
        self.demod_margin = demod_margin;
        self.gateway_count = gateway_count;
        self.link_check_pending = true;
    }

    /// Handle a downlink payload received on the compliance port
    ///
    /// Malformed commands are ignored without touching any state.
    pub fn on_downlink(&mut self, payload: &[u8]) -> Option<Action> {
        if !self.running {
            if payload == ENABLE_COMMAND {
                self.enable();
                return Some(Action::Enabled);
            }
            debug!("compliance test not running, ignoring {} bytes", payload.len());
            return None;
        }

        let Some(&first) = payload.first() else {
            warn!("empty compliance command");
            return None;
        };
        let sub_state = match SubState::try_from(first) {
            Ok(sub_state) => sub_state,
            Err(byte) => {
                warn!("unknown compliance command {}", byte);
                return None;
            }
        };
        if sub_state == SubState::EchoIncrement && payload.len() > MAX_APP_PAYLOAD_SIZE {
            warn!("compliance echo of {} bytes does not fit", payload.len());
            return None;
        }

        self.sub_state = sub_state;
        match sub_state {
            SubState::Disable => {
                self.disable();
                Some(Action::Disabled)
            }
            SubState::Echo => None,
            SubState::ConfirmedOn => {
                self.confirmed = true;
                self.sub_state = SubState::Echo;
                None
            }
            SubState::ConfirmedOff => {
                self.confirmed = false;
                self.sub_state = SubState::Echo;
                None
            }
            SubState::EchoIncrement => {
                self.payload.clear();
                for (i, byte) in payload.iter().enumerate() {
                    let echoed = if i == 0 {
                        SubState::EchoIncrement as u8
                    } else {
                        byte.wrapping_add(1)
                    };
                    // Length checked above
                    let _ = self.payload.push(echoed);
                }
                None
            }
            SubState::LinkCheck => Some(Action::LinkCheck),
        }
    }

    /// Produce the compliance uplink payload for the next transmission
    pub fn build_uplink(&mut self) -> &[u8] {
        if self.link_check_pending {
            self.link_check_pending = false;
            self.sub_state = SubState::Echo;
            self.payload.clear();
            let _ = self
                .payload
                .extend_from_slice(&[LINK_CHECK_TAG, self.demod_margin, self.gateway_count]);
            return &self.payload;
        }

        match self.sub_state {
            SubState::EchoIncrement => {
                // Staged when the command was received, sent once
                self.sub_state = SubState::Echo;
            }
            _ => {
                self.payload.clear();
                let _ = self
                    .payload
                    .extend_from_slice(&self.downlink_counter.to_be_bytes());
            }
        }
        &self.payload
    }

    fn enable(&mut self) {
        info!("compliance test started");
        self.running = true;
        self.sub_state = SubState::Echo;
        self.confirmed = false;
        self.port = COMPLIANCE_PORT;
        self.payload.clear();
        let _ = self.payload.extend_from_slice(&[0, 0]);
        self.downlink_counter = 0;
        self.link_check_pending = false;
        self.demod_margin = 0;
        self.gateway_count = 0;
    }

    fn disable(&mut self) {
        info!("compliance test stopped");
        self.running = false;
        self.confirmed = self.default_confirmed;
        self.port = self.default_port;
        self.payload.clear();
        self.downlink_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> ComplianceTest {
        let mut test = ComplianceTest::new(15, true);
        assert_eq!(test.on_downlink(&ENABLE_COMMAND), Some(Action::Enabled));
        test
    }

    #[test]
    fn test_enable() {
        let mut test = ComplianceTest::new(15, true);
        assert!(!test.is_running());

        assert_eq!(test.on_downlink(&ENABLE_COMMAND), Some(Action::Enabled));
        assert!(test.is_running());
        assert_eq!(test.sub_state(), SubState::Echo);
        assert!(!test.confirmed());
        assert_eq!(test.port(), COMPLIANCE_PORT);
        assert_eq!(test.downlink_counter(), 0);
    }

    #[test]
    fn test_enable_requires_exact_command() {
        let mut test = ComplianceTest::new(15, true);
        assert_eq!(test.on_downlink(&[0x01, 0x01, 0x01]), None);
        assert_eq!(test.on_downlink(&[0x01, 0x01, 0x01, 0x02]), None);
        assert_eq!(test.on_downlink(&[0x01, 0x01, 0x01, 0x01, 0x01]), None);
        assert!(!test.is_running());
        assert_eq!(test.port(), 15);
        assert!(test.confirmed());
    }

    #[test]
    fn test_disable_restores_defaults() {
        let mut test = running();
        test.count_downlink();
        assert_eq!(test.on_downlink(&[0x00]), Some(Action::Disabled));

        assert!(!test.is_running());
        assert_eq!(test.port(), 15);
        assert!(test.confirmed());
        assert_eq!(test.downlink_counter(), 0);
    }

    #[test]
    fn test_counter_echo() {
        let mut test = running();
        for _ in 0..0x0102 {
            test.count_downlink();
        }
        assert_eq!(test.on_downlink(&[0x01]), None);
        assert_eq!(test.build_uplink(), &[0x01, 0x02]);
    }

    #[test]
    fn test_confirmed_toggle_returns_to_echo() {
        let mut test = running();
        test.on_downlink(&[0x02]);
        assert!(test.confirmed());
        assert_eq!(test.sub_state(), SubState::Echo);

        test.on_downlink(&[0x03]);
        assert!(!test.confirmed());
        assert_eq!(test.sub_state(), SubState::Echo);
    }

    #[test]
    fn test_echo_increment() {
        let mut test = running();
        test.on_downlink(&[0x04, 0x10, 0x20]);
        assert_eq!(test.sub_state(), SubState::EchoIncrement);

        assert_eq!(test.build_uplink(), &[0x04, 0x11, 0x21]);
        assert_eq!(test.sub_state(), SubState::Echo);
        // Next uplink is the counter echo again
        assert_eq!(test.build_uplink(), &[0x00, 0x00]);
    }

    #[test]
    fn test_echo_increment_wraps() {
        let mut test = running();
        test.on_downlink(&[0x04, 0xFF]);
        assert_eq!(test.build_uplink(), &[0x04, 0x00]);
    }

    #[test]
    fn test_link_check_takes_precedence() {
        let mut test = running();
        assert_eq!(test.on_downlink(&[0x05]), Some(Action::LinkCheck));
        assert_eq!(test.sub_state(), SubState::LinkCheck);

        test.on_link_check(12, 3);
        assert!(test.link_check_pending());
        assert_eq!(test.build_uplink(), &[0x05, 12, 3]);
        assert!(!test.link_check_pending());
        assert_eq!(test.sub_state(), SubState::Echo);
    }

    #[test]
    fn test_malformed_commands_ignored() {
        let mut test = running();
        test.on_downlink(&[0x02]);

        assert_eq!(test.on_downlink(&[]), None);
        assert_eq!(test.on_downlink(&[0x09, 0x01]), None);
        let oversized = [0x04; MAX_APP_PAYLOAD_SIZE + 1];
        assert_eq!(test.on_downlink(&oversized), None);

        assert!(test.is_running());
        assert!(test.confirmed());
        assert_eq!(test.sub_state(), SubState::Echo);
    }

    #[test]
    fn test_link_check_ignored_when_not_running() {
        let mut test = ComplianceTest::new(15, false);
        test.on_link_check(10, 2);
        test.count_downlink();
        assert!(!test.link_check_pending());
        assert_eq!(test.downlink_counter(), 0);
    }
}
