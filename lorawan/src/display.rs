//! Display collaborator
//!
//! One-way notifications about the status store. The controller calls each
//! method only when the matching refresh flag is raised, at most once per
//! main loop pass.

use embedded_hal::digital::v2::OutputPin;

use crate::status::{DownlinkStatus, Indicator, UplinkStatus};

/// Receiver of status notifications
pub trait Display {
    /// Network joined state changed
    fn update_network_joined(&mut self, joined: bool);

    /// Indicator changed
    fn update_indicator(&mut self, indicator: Indicator, on: bool);

    /// New uplink snapshot
    fn update_uplink(&mut self, uplink: &UplinkStatus);

    /// New downlink snapshot
    fn update_downlink(&mut self, downlink: &DownlinkStatus);

    /// Frame type of the last submitted uplink
    fn update_frame_type(&mut self, _confirmed: bool) {}
}

/// Display without output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDisplay;

impl Display for NoDisplay {
    fn update_network_joined(&mut self, _joined: bool) {}
    fn update_indicator(&mut self, _indicator: Indicator, _on: bool) {}
    fn update_uplink(&mut self, _uplink: &UplinkStatus) {}
    fn update_downlink(&mut self, _downlink: &DownlinkStatus) {}
}

/// Drives the three indicators on GPIO pins
///
/// Snapshots and join state are not shown.
pub struct LedDisplay<TX, RX, APP> {
    tx: TX,
    rx: RX,
    app: APP,
}

impl<TX, RX, APP> LedDisplay<TX, RX, APP>
where
    TX: OutputPin,
    RX: OutputPin,
    APP: OutputPin,
{
    /// Create the display, all indicators off
    pub fn new(mut tx: TX, mut rx: RX, mut app: APP) -> Self {
        let _ = tx.set_low();
        let _ = rx.set_low();
        let _ = app.set_low();
        Self { tx, rx, app }
    }

    /// Release the pins
    pub fn release(self) -> (TX, RX, APP) {
        (self.tx, self.rx, self.app)
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool) {
    let result = if on { pin.set_high() } else { pin.set_low() };
    if result.is_err() {
        crate::warn!("indicator pin write failed");
    }
}

impl<TX, RX, APP> Display for LedDisplay<TX, RX, APP>
where
    TX: OutputPin,
    RX: OutputPin,
    APP: OutputPin,
{
    fn update_network_joined(&mut self, _joined: bool) {}

    fn update_indicator(&mut self, indicator: Indicator, on: bool) {
        match indicator {
            Indicator::Tx => drive(&mut self.tx, on),
            Indicator::Rx => drive(&mut self.rx, on),
            Indicator::App => drive(&mut self.app, on),
        }
    }

    fn update_uplink(&mut self, _uplink: &UplinkStatus) {}

    fn update_downlink(&mut self, _downlink: &DownlinkStatus) {}
}
