//! Status store
//!
//! Last known uplink and downlink snapshots, indicator states and the
//! per-category refresh flags consumed by the display collaborator. Every
//! write raises the matching flag; [`StatusStore::take_refresh`] clears it.

use heapless::Vec;

use crate::{MAX_APP_PAYLOAD_SIZE, MAX_MAC_PAYLOAD_SIZE};

/// Display category with its own refresh flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    /// Network joined state
    NetworkJoined,
    /// An indicator changed
    Indicator(Indicator),
    /// Uplink snapshot
    Uplink,
    /// Downlink snapshot
    Downlink,
    /// Frame type of the last submitted uplink
    FrameType,
}

impl Category {
    /// Every category, in display refresh order
    pub const ALL: [Category; 7] = [
        Category::NetworkJoined,
        Category::Indicator(Indicator::Tx),
        Category::Indicator(Indicator::Rx),
        Category::Indicator(Indicator::App),
        Category::Uplink,
        Category::Downlink,
        Category::FrameType,
    ];

    fn bit(self) -> u8 {
        match self {
            Category::NetworkJoined => 0x01,
            Category::Indicator(Indicator::Tx) => 0x02,
            Category::Indicator(Indicator::Rx) => 0x04,
            Category::Indicator(Indicator::App) => 0x08,
            Category::Uplink => 0x10,
            Category::Downlink => 0x20,
            Category::FrameType => 0x40,
        }
    }
}

/// Device indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// Lit while an uplink was just submitted
    Tx,
    /// Lit after an accepted downlink event
    Rx,
    /// Application output controlled by downlinks on ports 1 and 2
    App,
}

/// Last uplink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UplinkStatus {
    /// Acknowledged by the network (confirmed uplinks only)
    pub acknowledged: bool,
    /// Data rate of the last transmission
    pub datarate: u8,
    /// Uplink frame counter
    pub counter: u16,
    /// Application port
    pub port: u8,
    /// Submitted payload
    pub payload: Vec<u8, MAX_APP_PAYLOAD_SIZE>,
}

impl UplinkStatus {
    /// Payload size
    pub fn size(&self) -> u8 {
        self.payload.len() as u8
    }
}

/// Last downlink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownlinkStatus {
    /// RSSI in dBm
    pub rssi: i16,
    /// SNR in dB
    pub snr: i8,
    /// Number of accepted downlink events, wraps at 65536
    pub counter: u16,
    /// The last event carried application data
    pub has_data: bool,
    /// Downlink port
    pub port: u8,
    /// Owned copy of the downlink payload
    pub payload: Vec<u8, MAX_MAC_PAYLOAD_SIZE>,
}

impl DownlinkStatus {
    /// Payload size
    pub fn size(&self) -> u8 {
        self.payload.len() as u8
    }
}

/// Status store shared by the controller and the display collaborator
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    network_joined: bool,
    uplink: UplinkStatus,
    downlink: DownlinkStatus,
    tx_indicator: bool,
    rx_indicator: bool,
    app_indicator: bool,
    confirmed_frame: bool,
    refresh: u8,
}

impl StatusStore {
    /// Empty store, nothing to refresh
    pub fn new() -> Self {
        Self::default()
    }

    /// Network joined state
    pub fn network_joined(&self) -> bool {
        self.network_joined
    }

    /// Update network joined state
    pub fn set_network_joined(&mut self, joined: bool) {
        self.network_joined = joined;
        self.raise(Category::NetworkJoined);
    }

    /// Last uplink
    pub fn uplink(&self) -> &UplinkStatus {
        &self.uplink
    }

    /// Modify the uplink snapshot and raise its flag
    pub fn update_uplink(&mut self, f: impl FnOnce(&mut UplinkStatus)) {
        f(&mut self.uplink);
        self.raise(Category::Uplink);
    }

    /// Last downlink
    pub fn downlink(&self) -> &DownlinkStatus {
        &self.downlink
    }

    /// Modify the downlink snapshot and raise its flag
    pub fn update_downlink(&mut self, f: impl FnOnce(&mut DownlinkStatus)) {
        f(&mut self.downlink);
        self.raise(Category::Downlink);
    }

    /// Indicator state
    pub fn indicator(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Tx => self.tx_indicator,
            Indicator::Rx => self.rx_indicator,
            Indicator::App => self.app_indicator,
        }
    }

    /// Set an indicator and raise its flag
    pub fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Tx => self.tx_indicator = on,
            Indicator::Rx => self.rx_indicator = on,
            Indicator::App => self.app_indicator = on,
        }
        self.raise(Category::Indicator(indicator));
    }

    /// Whether the last submitted uplink was confirmed
    pub fn confirmed_frame(&self) -> bool {
        self.confirmed_frame
    }

    /// Record the frame type of a submitted uplink and raise its flag
    pub fn set_frame_type(&mut self, confirmed: bool) {
        self.confirmed_frame = confirmed;
        self.raise(Category::FrameType);
    }

    /// Whether a category waits for a display refresh
    pub fn needs_refresh(&self, category: Category) -> bool {
        self.refresh & category.bit() != 0
    }

    /// Clear the refresh flag of a category, returning whether it was set
    pub fn take_refresh(&mut self, category: Category) -> bool {
        let set = self.needs_refresh(category);
        self.refresh &= !category.bit();
        set
    }

    fn raise(&mut self, category: Category) {
        self.refresh |= category.bit();
    }
}
