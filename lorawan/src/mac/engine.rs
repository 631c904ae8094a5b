use crate::config::device::{AesKey, DevAddr, Eui64, NetId};

/// Synchronous rejection of a MAC engine request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacError {
    /// Engine is processing another request
    Busy,
    /// Data request before the network was joined
    NoNetworkJoined,
    /// Payload length or port not allowed at the current data rate
    LengthError,
    /// Pending MAC commands do not fit
    MacCommandError,
    /// No channel is free right now, try again later
    NoFreeChannel,
    /// Radio is switched off
    DeviceOff,
    /// Invalid request parameter
    ParameterInvalid,
    /// Request not supported by the engine
    Unsupported,
}

/// Parameter managed by the MAC engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MacParam {
    /// Adaptive data rate
    Adr(bool),
    /// Public network sync word
    PublicNetwork(bool),
    /// Network joined flag
    NetworkJoined(bool),
    /// Regional duty-cycle enforcement (test mode only)
    DutyCycleEnforcement(bool),
    /// Network identifier
    NetId(NetId),
    /// Device address
    DevAddr(DevAddr),
    /// Network session key
    NwkSKey(AesKey),
    /// Application session key
    AppSKey(AesKey),
}

/// Data uplink request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendRequest<'a> {
    /// Application port
    pub port: u8,
    /// Payload, empty for a MAC flush frame
    pub payload: &'a [u8],
    /// Confirmed uplink with the given number of transmissions
    pub confirmed: Option<u8>,
}

impl<'a> SendRequest<'a> {
    /// Unconfirmed uplink
    pub fn unconfirmed(port: u8, payload: &'a [u8]) -> Self {
        Self {
            port,
            payload,
            confirmed: None,
        }
    }

    /// Confirmed uplink
    pub fn confirmed(port: u8, payload: &'a [u8], retries: u8) -> Self {
        Self {
            port,
            payload,
            confirmed: Some(retries),
        }
    }

    /// Whether the uplink requests an acknowledgement
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }
}

/// Request API of the external MAC engine
///
/// Every request is fire-and-forget: `Ok` only means the engine accepted it.
/// The outcome arrives later as a [`Confirm`](super::Confirm), which the
/// application hands to the controller.
pub trait MacEngine {
    /// Initialize the engine and register the application callbacks
    fn init(&mut self) -> Result<(), MacError>;

    /// Start an over-the-air join
    fn join_request(
        &mut self,
        dev_eui: &Eui64,
        app_eui: &Eui64,
        app_key: &AesKey,
    ) -> Result<(), MacError>;

    /// Submit a data uplink
    fn send(&mut self, request: &SendRequest<'_>) -> Result<(), MacError>;

    /// Check whether `size` payload bytes can be sent with the current data rate
    fn query_tx_possible(&mut self, size: u8) -> Result<(), MacError>;

    /// Queue a link check request with the next uplink
    fn link_check_request(&mut self) -> Result<(), MacError>;

    /// Set a managed parameter
    fn set_param(&mut self, param: MacParam) -> Result<(), MacError>;
}
