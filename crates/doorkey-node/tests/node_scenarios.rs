//! End-to-end node tests: framed bytes in, framed bytes and pin levels out.

use doorkey_core::{DeviceAddress, Millis, SerialNumber, TokenSnapshot, constants::*};
use doorkey_hardware::PinState;
use doorkey_hardware::mock::{
    EventLog, HardwareEvent, MockClock, MockOneWire, MockOneWireHandle, MockPin, MockPinHandle,
    MockTransport, MockTransportHandle,
};
use doorkey_hardware::token::dallas_crc8;
use doorkey_node::{ActuatorPins, BusDirection, Node, NodeConfig};
use doorkey_protocol::{Command, PingRequest, Response, StreamParser, encode_frame};

const ADDR: u8 = 9;

struct Harness {
    node: Node<MockTransport, MockOneWire>,
    bus: MockTransportHandle,
    one_wire: MockOneWireHandle,
    de: MockPinHandle,
    relay: MockPinHandle,
    green: MockPinHandle,
    red: MockPinHandle,
    log: EventLog,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(NodeConfig::default().with_device_address(DeviceAddress::new(ADDR)))
    }

    fn with_config(config: NodeConfig) -> Self {
        let log = EventLog::new();
        let (transport, bus) = MockTransport::with_log(log.clone());
        let (one_wire, one_wire_handle) = MockOneWire::new();
        let (de, de_handle) = MockPin::with_log("de", log.clone());
        let (re, _) = MockPin::with_log("re", log.clone());
        let (relay, relay_handle) = MockPin::with_log("relay", log.clone());
        let (green, green_handle) = MockPin::new("green");
        let (red, red_handle) = MockPin::new("red");

        let node = Node::new(
            config,
            transport,
            BusDirection::new(Box::new(de), Box::new(re)),
            one_wire,
            ActuatorPins {
                relay: Box::new(relay),
                green: Box::new(green),
                red: Box::new(red),
            },
        )
        .unwrap();
        log.clear();

        Self {
            node,
            bus,
            one_wire: one_wire_handle,
            de: de_handle,
            relay: relay_handle,
            green: green_handle,
            red: red_handle,
            log,
        }
    }

    fn send(&self, message: &[u8]) {
        self.bus.inject(&encode_frame(message));
    }

    fn send_command(&self, command: &Command) {
        self.send(&command.encode_request(PROTOCOL_VERSION, DeviceAddress::new(ADDR)));
    }

    /// Deframe everything the node wrote since the last call.
    fn responses(&self) -> Vec<Vec<u8>> {
        let mut parser = StreamParser::new();
        parser.feed(&self.bus.take_written());
        parser.drain_frames().map(|f| f.payload().to_vec()).collect()
    }

    fn levels(&self) -> (PinState, PinState, PinState) {
        (self.relay.state(), self.green.state(), self.red.state())
    }
}

fn token_rom(family: u8, serial: [u8; 6]) -> [u8; ROM_CODE_LENGTH] {
    let mut rom = [0u8; ROM_CODE_LENGTH];
    rom[0] = family;
    rom[1..7].copy_from_slice(&serial);
    rom[7] = dallas_crc8(&rom[..7]);
    rom
}

#[test]
fn test_ping_echo() {
    let mut h = Harness::new();
    h.send(&[PROTOCOL_VERSION, ADDR, COMMAND_PING, 0xAA, 0xBB]);

    let outcome = h.node.step(Millis::new(0));

    assert_eq!(outcome.response, Some(Response::Pong { data: [0xAA, 0xBB] }));
    assert_eq!(h.responses(), vec![vec![PROTOCOL_VERSION, ADDR, 0xAA, 0xBB]]);
    assert_eq!(h.levels(), (PinState::Low, PinState::Low, PinState::Low));
}

#[test]
fn test_unlock_door() {
    let mut h = Harness::new();
    h.send(&[PROTOCOL_VERSION, ADDR, COMMAND_UNLOCK_DOOR]);

    h.node.step(Millis::new(100));

    assert_eq!(h.responses(), vec![vec![PROTOCOL_VERSION, ADDR]]);
    assert_eq!(h.levels(), (PinState::High, PinState::High, PinState::Low));
    assert!(h.node.core().actuators().relay().engaged);
}

#[test]
fn test_get_status_with_token() {
    let mut h = Harness::new();
    let serial = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];
    h.one_wire.touch(token_rom(0x01, serial));

    // First step only discovers the token
    h.node.step(Millis::new(0));
    assert_eq!(
        h.node.token(),
        TokenSnapshot::present(0x01, SerialNumber::new(serial))
    );

    h.send(&[PROTOCOL_VERSION, ADDR, COMMAND_GET_STATUS]);
    h.node.step(Millis::new(1));

    assert_eq!(
        h.responses(),
        vec![vec![
            PROTOCOL_VERSION,
            ADDR,
            0x01,
            0x01,
            0x11,
            0x22,
            0x33,
            0x44,
            0x55,
            0x66
        ]]
    );
}

#[test]
fn test_get_status_without_token() {
    let mut h = Harness::new();
    h.send_command(&Command::GetStatus);
    h.node.step(Millis::new(0));

    assert_eq!(
        h.responses(),
        vec![vec![PROTOCOL_VERSION, ADDR, 0, 0, 0, 0, 0, 0, 0, 0]]
    );
}

#[test]
fn test_other_address_gets_no_reply() {
    let mut h = Harness::new();
    h.send(&[PROTOCOL_VERSION, ADDR + 1, COMMAND_UNLOCK_DOOR]);
    h.send(&[PROTOCOL_VERSION, ADDR + 1, COMMAND_PING, 0x01, 0x02]);

    for t in 0..4 {
        h.node.step(Millis::new(t));
    }

    assert!(h.bus.written().is_empty());
    assert!(h.log.pin_history("de").is_empty());
    assert_eq!(h.levels(), (PinState::Low, PinState::Low, PinState::Low));
}

#[test]
fn test_invalid_messages_are_silent() {
    let mut h = Harness::new();
    h.send(&[PROTOCOL_VERSION, ADDR]);
    h.send(&[PROTOCOL_VERSION + 1, ADDR, COMMAND_UNLOCK_DOOR]);
    h.send(&[PROTOCOL_VERSION, ADDR, 0x7F]);
    h.send(&[PROTOCOL_VERSION, ADDR, COMMAND_REJECT_KEY, 0x00]);

    for t in 0..8 {
        h.node.step(Millis::new(t));
    }

    assert!(h.bus.written().is_empty());
    assert_eq!(h.levels(), (PinState::Low, PinState::Low, PinState::Low));
}

#[test]
fn test_corrupted_frame_gets_no_reply() {
    let mut h = Harness::new();
    let mut frame = encode_frame(&[PROTOCOL_VERSION, ADDR, COMMAND_UNLOCK_DOOR]);
    frame[3] ^= 0x01;
    h.bus.inject(&frame);

    h.node.step(Millis::new(0));

    assert!(h.bus.written().is_empty());
    assert_eq!(h.node.dropped_frames(), 1);
    assert_eq!(h.relay.state(), PinState::Low);
}

#[test]
fn test_line_noise_between_frames() {
    let mut h = Harness::new();
    h.bus.inject(&[0x00, 0xFF, 0x13]);
    h.send_command(&Command::Ping(PingRequest::new([0x01, 0x02])));
    h.bus.inject(&[0x55]);
    h.send_command(&Command::Ping(PingRequest::new([0x03, 0x04])));

    for t in 0..4 {
        h.node.step(Millis::new(t));
    }

    assert_eq!(
        h.responses(),
        vec![
            vec![PROTOCOL_VERSION, ADDR, 0x01, 0x02],
            vec![PROTOCOL_VERSION, ADDR, 0x03, 0x04],
        ]
    );
}

#[test]
fn test_one_dispatch_per_step() {
    let mut h = Harness::new();
    h.send_command(&Command::Ping(PingRequest::new([0x01, 0x01])));
    h.send_command(&Command::Ping(PingRequest::new([0x02, 0x02])));

    let first = h.node.step(Millis::new(0));
    assert_eq!(first.response, Some(Response::Pong { data: [0x01, 0x01] }));
    assert!(h.bus.pending_rx() > 0);

    let second = h.node.step(Millis::new(1));
    assert_eq!(second.response, Some(Response::Pong { data: [0x02, 0x02] }));
    assert_eq!(h.bus.pending_rx(), 0);
}

#[test]
fn test_direction_lines_wrap_the_response() {
    let mut h = Harness::new();
    h.send_command(&Command::UnlockDoor);
    h.node.step(Millis::new(0));

    let events = h.log.events();
    let position = |event: &HardwareEvent| events.iter().position(|e| e == event).unwrap();

    let de_high = position(&HardwareEvent::pin("de", PinState::High));
    let re_high = position(&HardwareEvent::pin("re", PinState::High));
    let flush = position(&HardwareEvent::Flush);
    let de_low = position(&HardwareEvent::pin("de", PinState::Low));
    let re_low = position(&HardwareEvent::pin("re", PinState::Low));
    let relay_high = position(&HardwareEvent::pin("relay", PinState::High));

    assert!(de_high < re_high);
    assert!(matches!(events[re_high + 1], HardwareEvent::Write(_)));
    assert!(re_high < flush && flush < de_low && de_low < re_low);
    // The response leaves before the outputs are written
    assert!(re_low < relay_high);
    assert_eq!(h.bus.unflushed(), 0);
    assert_eq!(h.de.state(), PinState::Low);
}

#[test]
fn test_relay_and_indicator_expire() {
    let mut h = Harness::new();
    h.send_command(&Command::UnlockDoor);
    h.node.step(Millis::new(1000));

    h.node.step(Millis::new(1000 + DEFAULT_RELAY_HOLD_MS - 1));
    assert_eq!(h.levels(), (PinState::High, PinState::High, PinState::Low));

    h.node.step(Millis::new(1000 + DEFAULT_RELAY_HOLD_MS));
    assert_eq!(h.levels(), (PinState::Low, PinState::Low, PinState::Low));
}

#[test]
fn test_reject_after_unlock() {
    let mut h = Harness::new();
    h.send_command(&Command::UnlockDoor);
    h.node.step(Millis::new(0));
    h.send_command(&Command::RejectKey);
    h.node.step(Millis::new(10));

    assert_eq!(h.levels(), (PinState::High, PinState::Low, PinState::High));
    assert_eq!(
        h.responses(),
        vec![vec![PROTOCOL_VERSION, ADDR], vec![PROTOCOL_VERSION, ADDR]]
    );
}

#[test]
fn test_repeated_unlock_refreshes_hold() {
    let mut h = Harness::new();
    h.send_command(&Command::UnlockDoor);
    h.node.step(Millis::new(0));
    h.send_command(&Command::UnlockDoor);
    h.node.step(Millis::new(3000));

    h.node.step(Millis::new(7999));
    assert_eq!(h.relay.state(), PinState::High);
    h.node.step(Millis::new(8000));
    assert_eq!(h.relay.state(), PinState::Low);
}

#[test]
fn test_hold_across_clock_wrap() {
    let mut h = Harness::new();
    let start = Millis::new(u32::MAX - 100);
    h.send_command(&Command::UnlockDoor);
    h.node.step(start);

    h.node.step(start.wrapping_add(DEFAULT_RELAY_HOLD_MS - 1));
    assert_eq!(h.relay.state(), PinState::High);
    h.node.step(start.wrapping_add(DEFAULT_RELAY_HOLD_MS));
    assert_eq!(h.relay.state(), PinState::Low);
}

#[test]
fn test_token_removed_after_keep_interval() {
    let mut h = Harness::new();
    h.one_wire.touch(token_rom(0x01, [1, 2, 3, 4, 5, 6]));
    h.node.step(Millis::new(0));
    assert!(h.node.token().present);

    h.one_wire.release();
    let mut t = 0;
    while t < DEFAULT_TOKEN_KEEP_INTERVAL_MS {
        t += DEFAULT_TOKEN_SEARCH_INTERVAL_MS;
        h.node.step(Millis::new(t));
    }
    assert_eq!(h.node.token(), TokenSnapshot::absent());
}

#[test]
fn test_output_failure_does_not_stop_the_loop() {
    let mut h = Harness::new();
    h.green.set_fail(true);
    h.send_command(&Command::UnlockDoor);

    let outcome = h.node.step(Millis::new(0));

    assert_eq!(outcome.response, Some(Response::DoorUnlocked));
    assert_eq!(h.relay.state(), PinState::High);
    assert_eq!(h.green.state(), PinState::Low);
}

#[test]
fn test_transmit_failure_keeps_state() {
    let mut h = Harness::new();
    h.bus.fail_writes(true);
    h.send_command(&Command::UnlockDoor);

    h.node.step(Millis::new(0));

    assert_eq!(h.relay.state(), PinState::High);
    assert_eq!(h.de.state(), PinState::Low);
}

#[test]
fn test_failing_reads_are_counted_and_recover() {
    let mut h = Harness::new();
    h.send_command(&Command::UnlockDoor);
    h.bus.fail_reads(true);

    for t in 0..250 {
        let outcome = h.node.step(Millis::new(t));
        assert!(outcome.read_failed);
        assert_eq!(outcome.response, None);
    }
    assert_eq!(h.node.read_errors(), 250);

    // The loop keeps running and serves the queued request once reads work
    h.bus.fail_reads(false);
    let outcome = h.node.step(Millis::new(250));
    assert!(!outcome.read_failed);
    assert_eq!(outcome.response, Some(Response::DoorUnlocked));
    assert_eq!(h.node.read_errors(), 0);
}

#[test]
fn test_run_until_with_clock() {
    let mut h = Harness::new();
    let (clock, time) = MockClock::new(Millis::new(0));
    h.send_command(&Command::RejectKey);

    let outcome = h.node.run_until(&clock, 5, |o| o.response.is_some()).unwrap();
    assert_eq!(outcome.response, Some(Response::KeyRejected));
    assert_eq!(h.red.state(), PinState::High);

    time.advance(DEFAULT_INDICATOR_HOLD_MS);
    assert!(
        h.node
            .run_until(&clock, 1, |o| o.levels.red == PinState::Low)
            .is_some()
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let (transport, _) = MockTransport::new();
    let (one_wire, _) = MockOneWire::new();
    let pin = |name: &str| Box::new(MockPin::new(name).0);

    let result = Node::new(
        NodeConfig::default().with_relay_hold_ms(0),
        transport,
        BusDirection::new(pin("de"), pin("re")),
        one_wire,
        ActuatorPins {
            relay: pin("relay"),
            green: pin("green"),
            red: pin("red"),
        },
    );
    assert!(result.is_err());
}
