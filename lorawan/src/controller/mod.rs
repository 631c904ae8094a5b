//! Device controller
//!
//! Top level state machine of the end device:
//!
//! ```text
//! Init -> Join -> Cycle -> Sleep        (OTAA, until the join is confirmed)
//!         Join -> Send                  (ABP)
//!                 Send -> Cycle -> Sleep
//! Sleep --duty-cycle timer--> Join (not joined) | Send (joined)
//! ```
//!
//! All shared state lives in one owned [`Controller`]. Timer expiries and MAC
//! events are entry points taking `&mut self`, so they cannot interleave with
//! each other or with [`Controller::process`]. Interrupt driven platforms
//! serialize them through [`SharedController`](crate::shared::SharedController).

use core::time::Duration;

use heapless::Vec;
use rand_core::RngCore;

use crate::compliance::ComplianceTest;
use crate::config::{Activation, AppConfig, ConfigError};
use crate::display::Display;
use crate::frame::OutgoingFrame;
use crate::mac::{MacEngine, MacError, MacEvent, MacParam, SendRequest};
use crate::scheduler::DutyCycle;
use crate::status::{Category, Indicator, StatusStore};
use crate::timer::{self, Timer, TimerId};
use crate::{debug, error, info, warn};

/// MAC event adapter
mod adapter;

/// Device state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeviceState {
    /// One-time setup
    Init = 0,
    /// Network activation
    Join = 1,
    /// Build and submit an uplink
    Send = 2,
    /// Arm the duty-cycle timer
    Cycle = 3,
    /// Idle until the duty-cycle timer fires
    Sleep = 4,
}

impl From<u8> for DeviceState {
    /// Restore a state from its raw value, e.g. from retained RAM
    ///
    /// Unknown values recover to [`DeviceState::Init`].
    fn from(raw: u8) -> Self {
        match raw {
            0 => DeviceState::Init,
            1 => DeviceState::Join,
            2 => DeviceState::Send,
            3 => DeviceState::Cycle,
            4 => DeviceState::Sleep,
            other => {
                warn!("unknown device state {}, restarting", other);
                DeviceState::Init
            }
        }
    }
}

/// Event consumed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A timer expired
    Timer(TimerId),
    /// MAC engine confirm or indication
    Mac(MacEvent<'a>),
}

impl<'a> From<MacEvent<'a>> for Event<'a> {
    fn from(event: MacEvent<'a>) -> Self {
        Event::Mac(event)
    }
}

impl From<TimerId> for Event<'_> {
    fn from(id: TimerId) -> Self {
        Event::Timer(id)
    }
}

/// Controller error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// Invalid configuration
    Config(ConfigError),
    /// MAC engine rejected a request
    Mac(MacError),
}

impl From<ConfigError> for ControllerError {
    fn from(error: ConfigError) -> Self {
        ControllerError::Config(error)
    }
}

impl From<MacError> for ControllerError {
    fn from(error: MacError) -> Self {
        ControllerError::Mac(error)
    }
}

/// The three one-shot timers used by the controller
#[derive(Debug)]
pub struct Timers<T: Timer> {
    /// Next transmit attempt or join retry
    pub duty_cycle: T,
    /// TX indicator on-time
    pub tx_indicator: T,
    /// RX indicator on-time
    pub rx_indicator: T,
}

impl<T: Timer> Timers<T> {
    /// Timer by identifier
    pub fn get_mut(&mut self, id: TimerId) -> &mut T {
        match id {
            TimerId::DutyCycle => &mut self.duty_cycle,
            TimerId::TxIndicator => &mut self.tx_indicator,
            TimerId::RxIndicator => &mut self.rx_indicator,
        }
    }
}

/// Class A end-device application controller
pub struct Controller<M, T, D, R>
where
    M: MacEngine,
    T: Timer,
    D: Display,
    R: RngCore,
{
    mac: M,
    timers: Timers<T>,
    display: D,
    rng: R,
    activation: Activation,
    config: AppConfig,
    duty_cycle: DutyCycle,
    state: DeviceState,
    /// Transmit gate: true when no request is outstanding
    next_tx: bool,
    /// The staged frame was rejected and must be resent as is
    retry_pending: bool,
    next_delay: Duration,
    frame: OutgoingFrame,
    status: StatusStore,
    compliance: ComplianceTest,
}

impl<M, T, D, R> Controller<M, T, D, R>
where
    M: MacEngine,
    T: Timer,
    D: Display,
    R: RngCore,
{
    /// Create a controller in [`DeviceState::Init`] with the transmit gate open
    pub fn new(
        mac: M,
        timers: Timers<T>,
        display: D,
        rng: R,
        activation: Activation,
        config: AppConfig,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        let duty_cycle = DutyCycle::from_config(&config)?;
        let compliance = ComplianceTest::new(config.app_port, config.confirmed);

        Ok(Self {
            mac,
            timers,
            display,
            rng,
            activation,
            config,
            duty_cycle,
            state: DeviceState::Init,
            next_tx: true,
            retry_pending: false,
            next_delay: Duration::ZERO,
            frame: OutgoingFrame::new(),
            status: StatusStore::new(),
            compliance,
        })
    }

    /// Current state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Whether a new transmit attempt may start
    pub fn can_transmit(&self) -> bool {
        self.next_tx
    }

    /// Delay computed by the last Join or Send pass
    pub fn next_delay(&self) -> Duration {
        self.next_delay
    }

    /// Status store
    pub fn status(&self) -> &StatusStore {
        &self.status
    }

    /// Compliance test state
    pub fn compliance(&self) -> &ComplianceTest {
        &self.compliance
    }

    /// Last built frame
    pub fn frame(&self) -> &OutgoingFrame {
        &self.frame
    }

    /// Application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// MAC engine
    pub fn mac(&self) -> &M {
        &self.mac
    }

    /// MAC engine, mutable
    pub fn mac_mut(&mut self) -> &mut M {
        &mut self.mac
    }

    /// Timers
    pub fn timers(&self) -> &Timers<T> {
        &self.timers
    }

    /// Timers, mutable
    pub fn timers_mut(&mut self) -> &mut Timers<T> {
        &mut self.timers
    }

    /// Display collaborator
    pub fn display(&self) -> &D {
        &self.display
    }

    /// One main loop pass
    ///
    /// Dispatches expired timers, runs the state machine until it sleeps and
    /// refreshes the display.
    pub fn process(&mut self) {
        for id in [TimerId::DutyCycle, TimerId::TxIndicator, TimerId::RxIndicator] {
            if timer::expired(self.timers.get_mut(id)) {
                self.on_timer(id);
            }
        }
        self.run();
        self.refresh();
    }

    /// Handle a single event
    pub fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Timer(id) => self.on_timer(id),
            Event::Mac(MacEvent::Confirm(confirm)) => self.on_confirm(&confirm),
            Event::Mac(MacEvent::Indication(indication)) => self.on_indication(&indication),
        }
    }

    /// Timer expiry entry point
    pub fn on_timer(&mut self, id: TimerId) {
        match id {
            TimerId::DutyCycle => {
                self.state = if self.status.network_joined() {
                    DeviceState::Send
                } else {
                    DeviceState::Join
                };
                debug!("duty-cycle timer, next state {:?}", self.state);
            }
            TimerId::TxIndicator => self.status.set_indicator(Indicator::Tx, false),
            TimerId::RxIndicator => self.status.set_indicator(Indicator::Rx, false),
        }
    }

    /// Run state passes until the controller sleeps
    pub fn run(&mut self) {
        while self.state != DeviceState::Sleep {
            self.step();
        }
    }

    /// Execute one state pass
    pub fn step(&mut self) {
        match self.state {
            DeviceState::Init => self.init(),
            DeviceState::Join => self.join(),
            DeviceState::Send => self.send(),
            DeviceState::Cycle => {
                debug!("next cycle in {} ms", self.next_delay.as_millis() as u64);
                self.timers.duty_cycle.start(self.next_delay);
                self.state = DeviceState::Sleep;
            }
            DeviceState::Sleep => {}
        }
    }

    /// Forward raised refresh flags to the display
    pub fn refresh(&mut self) {
        for category in Category::ALL {
            if !self.status.take_refresh(category) {
                continue;
            }
            match category {
                Category::NetworkJoined => {
                    self.display.update_network_joined(self.status.network_joined())
                }
                Category::Indicator(indicator) => self
                    .display
                    .update_indicator(indicator, self.status.indicator(indicator)),
                Category::Uplink => self.display.update_uplink(self.status.uplink()),
                Category::Downlink => self.display.update_downlink(self.status.downlink()),
                Category::FrameType => self
                    .display
                    .update_frame_type(self.status.confirmed_frame()),
            }
        }
    }

    fn init(&mut self) {
        if let Err(e) = self.mac.init() {
            error!("MAC engine init failed: {:?}", e);
        }
        self.set_param(MacParam::Adr(self.config.adr));
        self.set_param(MacParam::PublicNetwork(self.config.public_network));
        self.set_param(MacParam::DutyCycleEnforcement(
            self.config.duty_cycle_enforcement,
        ));

        self.timers.tx_indicator.cancel();
        self.timers.rx_indicator.cancel();
        self.status.set_indicator(Indicator::Tx, false);
        self.status.set_indicator(Indicator::Rx, false);
        self.status.set_network_joined(false);

        self.state = DeviceState::Join;
    }

    fn join(&mut self) {
        match self.activation {
            Activation::Otaa {
                dev_eui,
                app_eui,
                app_key,
            } => {
                if self.next_tx {
                    self.next_tx = false;
                    match self.mac.join_request(&dev_eui, &app_eui, &app_key) {
                        Ok(()) => debug!("join request submitted"),
                        Err(e) => {
                            // No confirm will follow
                            warn!("join request rejected: {:?}", e);
                            self.next_tx = true;
                        }
                    }
                }
                self.next_delay = self.config.join_retry_interval;
                self.state = DeviceState::Cycle;
            }
            Activation::Abp {
                net_id,
                dev_addr,
                nwk_skey,
                app_skey,
            } => {
                self.set_param(MacParam::NetId(net_id));
                self.set_param(MacParam::DevAddr(dev_addr));
                self.set_param(MacParam::NwkSKey(nwk_skey));
                self.set_param(MacParam::AppSKey(app_skey));
                self.set_param(MacParam::NetworkJoined(true));
                info!("session personalized");
                self.status.set_network_joined(true);
                self.state = DeviceState::Send;
            }
        }
    }

    fn send(&mut self) {
        if self.next_tx {
            if !self.retry_pending {
                self.frame.build(&mut self.compliance, &self.status);
            }
            let retry = self.submit_frame();
            self.next_tx = retry;
            self.retry_pending = retry;

            self.status.set_indicator(Indicator::Tx, true);
            self.timers.tx_indicator.start(self.config.indicator_on_time);
        }

        self.next_delay = self
            .duty_cycle
            .next_delay(self.compliance.is_running(), &mut self.rng);
        self.state = DeviceState::Cycle;
    }

    /// Submit the staged frame, returning whether it must be retried
    fn submit_frame(&mut self) -> bool {
        let frame = &self.frame;
        let request = match self.mac.query_tx_possible(frame.size()) {
            Ok(()) if frame.is_confirmed() => SendRequest::confirmed(
                frame.port(),
                frame.payload(),
                self.config.confirmed_retries,
            ),
            Ok(()) => SendRequest::unconfirmed(frame.port(), frame.payload()),
            Err(e) => {
                // Flush pending MAC commands with an empty frame
                warn!("{} bytes cannot be sent now: {:?}", frame.size(), e);
                SendRequest::unconfirmed(frame.port(), &[])
            }
        };

        self.status.set_frame_type(request.is_confirmed());
        match self.mac.send(&request) {
            Ok(()) => {
                debug!(
                    "uplink submitted on port {}, {} bytes",
                    request.port,
                    request.payload.len()
                );
                self.status.update_uplink(|uplink| {
                    uplink.acknowledged = false;
                    uplink.port = request.port;
                    uplink.payload = Vec::from_slice(request.payload).unwrap_or_default();
                });
                false
            }
            Err(e) => {
                warn!("uplink rejected: {:?}, retrying next cycle", e);
                true
            }
        }
    }

    fn set_param(&mut self, param: MacParam) {
        if let Err(e) = self.mac.set_param(param) {
            warn!("MAC parameter rejected: {:?}", e);
        }
    }
}
