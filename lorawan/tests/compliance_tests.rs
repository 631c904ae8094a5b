use std::time::Duration;

use lorawan_app::{
    compliance::{SubState, ENABLE_COMMAND},
    config::{Activation, AppConfig},
    mac::{Confirm, Indication, MacParam, MacStatus, RequestKind},
    COMPLIANCE_PORT,
};

use mock::*;

fn command(payload: &[u8]) -> Indication<'_> {
    Indication {
        status: MacStatus::Ok,
        port: COMPLIANCE_PORT,
        has_data: true,
        payload,
        rssi: -40,
        snr: 0x20,
    }
}

/// Joined controller with a running compliance test and the gate open
fn testing_controller() -> TestController {
    let mut controller = joined_controller();
    controller.on_indication(&command(&ENABLE_COMMAND));
    assert!(controller.compliance().is_running());
    controller
}

/// Transmit one uplink and confirm it
fn uplink(controller: &mut TestController) -> SentFrame {
    next_cycle(controller);
    confirm_outstanding(controller, MacStatus::Ok);
    controller.mac().last_sent().unwrap().clone()
}

#[test]
fn test_enable_redirects_uplinks() {
    let mut controller = testing_controller();

    let compliance = controller.compliance();
    assert_eq!(compliance.sub_state(), SubState::Echo);
    assert!(!compliance.confirmed());
    assert_eq!(compliance.port(), COMPLIANCE_PORT);

    let params = &controller.mac().params;
    assert_eq!(params[params.len() - 2], MacParam::Adr(true));
    assert_eq!(params[params.len() - 1], MacParam::DutyCycleEnforcement(false));

    let sent = uplink(&mut controller);
    assert_eq!(sent.port, COMPLIANCE_PORT);
    assert_eq!(sent.confirmed, None);
    assert_eq!(sent.payload, vec![0x00, 0x00]);
    assert_eq!(
        controller.timers().duty_cycle.armed,
        Some(Duration::from_millis(1))
    );
}

#[test]
fn test_enable_ignored_when_dropped_or_malformed() {
    let mut controller = joined_controller();

    let mut dropped = command(&ENABLE_COMMAND);
    dropped.status = MacStatus::MicFail;
    controller.on_indication(&dropped);
    controller.on_indication(&command(&[0x01, 0x01, 0x01]));

    assert!(!controller.compliance().is_running());
    assert_eq!(controller.compliance().port(), 15);
}

#[test]
fn test_downlink_counter_echo() {
    let mut controller = testing_controller();
    controller.on_indication(&command(&[0x01]));
    controller.on_indication(&command(&[0x01]));
    assert_eq!(controller.compliance().downlink_counter(), 2);

    let sent = uplink(&mut controller);
    assert_eq!(sent.payload, vec![0x00, 0x02]);
    // Every downlink counts, including the enable command
    assert_eq!(controller.status().downlink().counter, 3);
}

#[test]
fn test_confirmed_mode_commands() {
    let mut controller = testing_controller();

    controller.on_indication(&command(&[0x02]));
    let sent = uplink(&mut controller);
    assert_eq!(sent.confirmed, Some(8));
    assert_eq!(sent.payload.len(), 2);

    controller.on_indication(&command(&[0x03]));
    let sent = uplink(&mut controller);
    assert_eq!(sent.confirmed, None);
    assert_eq!(controller.compliance().sub_state(), SubState::Echo);
}

#[test]
fn test_echo_increment() {
    let mut controller = testing_controller();
    controller.on_indication(&command(&[0x04, 0x10, 0x20]));

    let sent = uplink(&mut controller);
    assert_eq!(sent.payload, vec![0x04, 0x11, 0x21]);

    let sent = uplink(&mut controller);
    assert_eq!(sent.payload, vec![0x00, 0x01]);
}

#[test]
fn test_link_check() {
    let mut controller = testing_controller();
    controller.on_indication(&command(&[0x05]));
    assert_eq!(controller.mac().link_checks, 1);
    assert_eq!(controller.compliance().sub_state(), SubState::LinkCheck);

    let mut answer = Confirm::new(MacStatus::Ok, RequestKind::LinkCheck);
    answer.demod_margin = 20;
    answer.gateway_count = 2;
    controller.on_confirm(&answer);
    assert!(controller.compliance().link_check_pending());

    let sent = uplink(&mut controller);
    assert_eq!(sent.payload, vec![0x05, 20, 2]);
    assert_eq!(controller.compliance().sub_state(), SubState::Echo);
}

#[test]
fn test_failed_link_check_not_reported() {
    let mut controller = testing_controller();
    controller.on_indication(&command(&[0x05]));

    let mut answer = Confirm::new(MacStatus::RxTimeout, RequestKind::LinkCheck);
    answer.demod_margin = 20;
    controller.on_confirm(&answer);
    assert!(!controller.compliance().link_check_pending());
}

#[test]
fn test_disable_restores_application() {
    let config = AppConfig {
        adr: false,
        ..AppConfig::default()
    };
    let mut controller =
        controller_with(Activation::new_otaa(DEV_EUI, APP_EUI, APP_KEY), config);
    controller.process();
    confirm_outstanding(&mut controller, MacStatus::Ok);

    controller.on_indication(&command(&ENABLE_COMMAND));
    let params = &controller.mac().params;
    assert_eq!(params[params.len() - 2], MacParam::Adr(true));

    controller.on_indication(&command(&[0x00]));

    let compliance = controller.compliance();
    assert!(!compliance.is_running());
    assert_eq!(compliance.port(), 15);
    assert!(compliance.confirmed());

    let params = &controller.mac().params;
    assert_eq!(params[params.len() - 2], MacParam::Adr(false));
    assert_eq!(params[params.len() - 1], MacParam::DutyCycleEnforcement(false));

    let sent = uplink(&mut controller);
    assert_eq!(sent.port, 15);
    assert_eq!(sent.confirmed, Some(8));
    assert_eq!(sent.payload.len(), 6);

    let delay = controller.timers().duty_cycle.armed.unwrap();
    assert!(delay >= Duration::from_millis(4_000));
}

#[test]
fn test_unknown_command_ignored() {
    let mut controller = testing_controller();
    controller.on_indication(&command(&[0x02]));
    controller.on_indication(&command(&[0x07, 0x01]));

    assert!(controller.compliance().is_running());
    assert!(controller.compliance().confirmed());
    assert_eq!(controller.compliance().sub_state(), SubState::Echo);
}
