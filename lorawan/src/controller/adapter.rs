use rand_core::RngCore;

use super::Controller;
use crate::compliance::Action;
use crate::display::Display;
use crate::mac::{decode_snr, Confirm, Indication, MacEngine, MacParam, RequestKind};
use crate::status::Indicator;
use crate::timer::Timer;
use crate::{debug, info, warn};
use crate::{COMPLIANCE_PORT, MAX_MAC_PAYLOAD_SIZE};

impl<M, T, D, R> Controller<M, T, D, R>
where
    M: MacEngine,
    T: Timer,
    D: Display,
    R: RngCore,
{
    /// Request confirm entry point
    ///
    /// Always reopens the transmit gate, whatever the status, so a failed
    /// request cannot stall the device.
    pub fn on_confirm(&mut self, confirm: &Confirm) {
        if confirm.status.is_ok() {
            match confirm.kind {
                RequestKind::Join => {
                    info!("network joined");
                    self.status.set_network_joined(true);
                }
                RequestKind::LinkCheck => {
                    self.compliance
                        .on_link_check(confirm.demod_margin, confirm.gateway_count);
                }
                RequestKind::Unconfirmed | RequestKind::Confirmed => {
                    let acknowledged =
                        confirm.kind == RequestKind::Confirmed && confirm.acknowledged;
                    self.status.update_uplink(|uplink| {
                        uplink.acknowledged = acknowledged;
                        uplink.datarate = confirm.datarate;
                        uplink.counter = confirm.uplink_counter as u16;
                    });
                }
            }
        } else {
            warn!("{:?} request failed: {:?}", confirm.kind, confirm.status);
        }

        self.next_tx = true;
    }

    /// Indication entry point
    ///
    /// The payload is copied before returning; the MAC engine may reuse its
    /// buffer afterwards.
    pub fn on_indication(&mut self, indication: &Indication<'_>) {
        if !indication.status.is_ok() {
            warn!("dropping indication: {:?}", indication.status);
            return;
        }

        self.compliance.count_downlink();

        let payload = indication.payload;
        if payload.len() > MAX_MAC_PAYLOAD_SIZE {
            warn!("downlink of {} bytes truncated", payload.len());
        }
        let copied = &payload[..payload.len().min(MAX_MAC_PAYLOAD_SIZE)];
        self.status.update_downlink(|downlink| {
            downlink.rssi = indication.rssi;
            downlink.snr = decode_snr(indication.snr);
            downlink.counter = downlink.counter.wrapping_add(1);
            downlink.has_data = indication.has_data;
            downlink.port = indication.port;
            downlink.payload.clear();
            let _ = downlink.payload.extend_from_slice(copied);
        });

        self.status.set_indicator(Indicator::Rx, true);
        self.timers.rx_indicator.start(self.config.indicator_on_time);

        if indication.has_data {
            self.process_rx_data(indication.port, payload);
        }
    }

    fn process_rx_data(&mut self, port: u8, payload: &[u8]) {
        match port {
            // Application LED control
            1 | 2 => {
                if let [state] = payload {
                    self.status.set_indicator(Indicator::App, state & 0x01 != 0);
                }
            }
            COMPLIANCE_PORT => {
                if let Some(action) = self.compliance.on_downlink(payload) {
                    self.apply_compliance(action);
                }
            }
            _ => debug!("ignoring downlink on port {}", port),
        }
    }

    fn apply_compliance(&mut self, action: Action) {
        match action {
            Action::Enabled => {
                self.set_param(MacParam::Adr(true));
                self.set_param(MacParam::DutyCycleEnforcement(false));
            }
            Action::Disabled => {
                self.set_param(MacParam::Adr(self.config.adr));
                self.set_param(MacParam::DutyCycleEnforcement(
                    self.config.duty_cycle_enforcement,
                ));
            }
            Action::LinkCheck => {
                if let Err(e) = self.mac.link_check_request() {
                    warn!("link check request rejected: {:?}", e);
                }
            }
        }
    }
}
