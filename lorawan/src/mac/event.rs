/// Event status reported by the MAC engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacStatus {
    /// Request completed or event valid
    Ok,
    /// Radio TX timeout
    TxTimeout,
    /// No downlink in RX1/RX2
    RxTimeout,
    /// Downlink reception error
    RxError,
    /// Join accept not received
    JoinFailed,
    /// Downlink frame counter gap
    DownlinkRepeated,
    /// MIC check failed
    MicFail,
    /// Any other engine error
    Error,
}

impl MacStatus {
    /// Whether the status is OK
    pub fn is_ok(&self) -> bool {
        *self == MacStatus::Ok
    }
}

/// Kind of the locally initiated request a confirm refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind {
    /// Join request
    Join,
    /// Link check request
    LinkCheck,
    /// Unconfirmed data uplink
    Unconfirmed,
    /// Confirmed data uplink
    Confirmed,
}

/// Outcome of a locally initiated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirm {
    /// Completion status
    pub status: MacStatus,
    /// Request this confirm refers to
    pub kind: RequestKind,
    /// Acknowledgement received (confirmed uplinks)
    pub acknowledged: bool,
    /// Data rate used for the uplink
    pub datarate: u8,
    /// Uplink frame counter of the transmitted frame
    pub uplink_counter: u32,
    /// Link check demodulation margin
    pub demod_margin: u8,
    /// Link check gateway count
    pub gateway_count: u8,
}

impl Confirm {
    /// Confirm carrying only status and kind
    pub fn new(status: MacStatus, kind: RequestKind) -> Self {
        Self {
            status,
            kind,
            acknowledged: false,
            datarate: 0,
            uplink_counter: 0,
            demod_margin: 0,
            gateway_count: 0,
        }
    }
}

/// Unsolicited MAC event
///
/// `payload` points into the engine's receive buffer and is only valid for
/// the duration of the call that delivers the indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indication<'a> {
    /// Event status
    pub status: MacStatus,
    /// Downlink port
    pub port: u8,
    /// Whether the frame carried application data
    pub has_data: bool,
    /// Downlink payload
    pub payload: &'a [u8],
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Raw SNR register, sign-magnitude quarter dB
    pub snr: u8,
}

/// Event delivered by the MAC engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacEvent<'a> {
    /// Request confirm
    Confirm(Confirm),
    /// Indication
    Indication(Indication<'a>),
}

impl From<Confirm> for MacEvent<'_> {
    fn from(confirm: Confirm) -> Self {
        MacEvent::Confirm(confirm)
    }
}

impl<'a> From<Indication<'a>> for MacEvent<'a> {
    fn from(indication: Indication<'a>) -> Self {
        MacEvent::Indication(indication)
    }
}

/// Decode the sign-magnitude quarter-dB SNR register into whole dB
pub fn decode_snr(raw: u8) -> i8 {
    if raw & 0x80 != 0 {
        // Invert and divide by 4
        let magnitude = (256u16 - raw as u16) as u8 >> 2;
        -(magnitude as i8)
    } else {
        // Divide by 4
        (raw >> 2) as i8
    }
}
