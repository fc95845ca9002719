//! Node assembly and the main loop step.
//!
//! [`NodeCore`] is the hardware-free heart of a node: it dispatches one
//! message, runs the handler, expires actuator holds and hands back the
//! response bytes. [`Node`] wires a core to real (or mock) peripherals and
//! performs one loop iteration per [`Node::step`]:
//!
//! 1. read bus bytes until a frame completes or none are left, then dispatch
//!    at most one frame and transmit its response
//! 2. poll the token reader
//! 3. expire actuator holds and write all three outputs
//!
//! Handler effects of one message are therefore on the outputs before the
//! next message is even read.

use std::thread;
use std::time::Duration;

use doorkey_core::{
    DeviceAddress, Millis, TokenSnapshot,
    constants::{PROTOCOL_VERSION, TOKEN_REPORT_INTERVAL_MS},
};
use doorkey_hardware::{Clock, DigitalOutput, OneWireBus, SerialTransport, TokenReader};
use doorkey_protocol::{Response, StreamParser, encode_response};
use tracing::{debug, info, warn};

use crate::{
    actuator::{ActuatorController, OutputLevels},
    config::NodeConfig,
    dispatcher::Dispatcher,
    error::Result,
    handlers,
    transmitter::{BusDirection, BusInterface},
};

/// Sleep applied by [`Node::run`] after an iteration that read nothing.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Sleep applied by [`Node::run`] while bus reads keep failing.
const READ_ERROR_SLEEP: Duration = Duration::from_millis(100);

/// Consecutive read failures between two warnings.
const READ_ERROR_LOG_EVERY: u32 = 100;

/// Dispatcher, handlers and actuator state, with no I/O.
///
/// # Examples
///
/// ```
/// use doorkey_core::{DeviceAddress, Millis, TokenSnapshot};
/// use doorkey_node::{NodeConfig, NodeCore};
///
/// let mut core = NodeCore::new(NodeConfig::default().with_device_address(DeviceAddress::new(2)));
///
/// let out = core.tick(Millis::new(0), Some(&[1, 2, 0x01, 0xAA, 0xBB]), &TokenSnapshot::absent());
/// assert_eq!(out, Some(vec![1, 2, 0xAA, 0xBB]));
///
/// // Another node's traffic
/// let out = core.tick(Millis::new(1), Some(&[1, 3, 0x01, 0xAA, 0xBB]), &TokenSnapshot::absent());
/// assert_eq!(out, None);
/// ```
#[derive(Debug, Clone)]
pub struct NodeCore {
    config: NodeConfig,
    dispatcher: Dispatcher,
    actuators: ActuatorController,
}

impl NodeCore {
    pub fn new(config: NodeConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.device_address),
            actuators: ActuatorController::new(config.relay_hold_ms, config.indicator_hold_ms),
            config,
        }
    }

    /// Validate `message` and run its handler.
    ///
    /// Returns `None` if the message was discarded.
    pub fn dispatch(&mut self, now: Millis, message: &[u8], token: &TokenSnapshot) -> Option<Response> {
        let command = self.dispatcher.dispatch(message)?;
        Some(handlers::handle(&command, now, &mut self.actuators, token))
    }

    /// Expire actuator holds and return the output levels.
    pub fn tick_actuators(&mut self, now: Millis) -> OutputLevels {
        self.actuators.tick(now)
    }

    /// One hardware-free loop iteration.
    ///
    /// Dispatches `incoming` if present, then runs the actuator tick, and
    /// returns the complete response message to transmit, if any.
    pub fn tick(&mut self, now: Millis, incoming: Option<&[u8]>, token: &TokenSnapshot) -> Option<Vec<u8>> {
        let response = incoming.and_then(|message| self.dispatch(now, message, token));
        self.actuators.tick(now);
        response.map(|r| encode_response(PROTOCOL_VERSION, self.address(), &r))
    }

    /// Output levels as of the last tick.
    pub fn outputs(&self) -> OutputLevels {
        self.actuators.levels()
    }

    pub fn actuators(&self) -> &ActuatorController {
        &self.actuators
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn address(&self) -> DeviceAddress {
        self.config.device_address
    }
}

/// Relay and indicator outputs of a node.
pub struct ActuatorPins {
    pub relay: Box<dyn DigitalOutput>,
    pub green: Box<dyn DigitalOutput>,
    pub red: Box<dyn DigitalOutput>,
}

impl ActuatorPins {
    /// Write all three levels. Every pin is written even if one fails.
    fn apply(&mut self, levels: OutputLevels) {
        for (name, pin, state) in [
            ("relay", &mut self.relay, levels.relay),
            ("green", &mut self.green, levels.green),
            ("red", &mut self.red, levels.red),
        ] {
            if let Err(e) = pin.set_state(state) {
                warn!(output = name, error = %e, "output write failed");
            }
        }
    }
}

impl std::fmt::Debug for ActuatorPins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorPins").finish_non_exhaustive()
    }
}

/// What one loop iteration did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Bytes read from the bus.
    pub bytes_read: usize,

    /// Response transmitted, if a message was dispatched.
    pub response: Option<Response>,

    /// Levels written to the actuator outputs.
    pub levels: OutputLevels,

    /// The bus read failed this iteration.
    pub read_failed: bool,
}

/// A door node bound to its peripherals.
#[derive(Debug)]
pub struct Node<T, B> {
    core: NodeCore,
    bus: BusInterface<T>,
    parser: StreamParser,
    token_reader: TokenReader<B>,
    pins: ActuatorPins,
    last_report: Millis,
    read_errors: u32,
}

impl<T: SerialTransport, B: OneWireBus> Node<T, B> {
    /// Assemble a node and drive every output to its idle level.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or an output cannot
    /// be written.
    pub fn new(
        config: NodeConfig,
        transport: T,
        direction: BusDirection,
        one_wire: B,
        mut pins: ActuatorPins,
    ) -> Result<Self> {
        config.validate()?;

        let mut bus = BusInterface::new(transport, direction);
        bus.release()?;
        pins.relay.set_low()?;
        pins.green.set_low()?;
        pins.red.set_low()?;

        let token_reader = TokenReader::new(
            one_wire,
            config.token_search_interval_ms,
            config.token_keep_interval_ms,
        );

        info!(address = %config.device_address, "node ready");

        Ok(Self {
            core: NodeCore::new(config),
            bus,
            parser: StreamParser::new(),
            token_reader,
            pins,
            last_report: Millis::default(),
            read_errors: 0,
        })
    }

    /// Run one loop iteration at time `now`.
    pub fn step(&mut self, now: Millis) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        // (a) receive, dispatch, respond
        loop {
            match self.bus.read_byte() {
                Ok(Some(byte)) => {
                    self.read_recovered();
                    outcome.bytes_read += 1;
                    if self.parser.feed_byte(byte) {
                        break;
                    }
                }
                Ok(None) => {
                    self.read_recovered();
                    break;
                }
                Err(e) => {
                    if self.read_errors % READ_ERROR_LOG_EVERY == 0 {
                        warn!(error = %e, consecutive = self.read_errors.saturating_add(1), "bus read failed");
                    }
                    self.read_errors = self.read_errors.saturating_add(1);
                    outcome.read_failed = true;
                    break;
                }
            }
        }

        if let Some(frame) = self.parser.next_frame() {
            let token = self.token_reader.snapshot();
            if let Some(response) = self.core.dispatch(now, frame.payload(), &token) {
                if let Err(e) = self.bus.transmit(PROTOCOL_VERSION, self.core.address(), &response) {
                    warn!(error = %e, "response transmit failed");
                }
                outcome.response = Some(response);
            }
        }

        // (b) token presence
        self.token_reader.poll(now);
        if now.has_elapsed(self.last_report, TOKEN_REPORT_INTERVAL_MS) {
            self.last_report = now;
            let token = self.token_reader.snapshot();
            if token.present {
                debug!("{token}");
            }
        }

        // (c) actuators
        outcome.levels = self.core.tick_actuators(now);
        self.pins.apply(outcome.levels);

        outcome
    }

    fn read_recovered(&mut self) {
        if self.read_errors > 0 {
            info!(failures = self.read_errors, "bus read recovered");
            self.read_errors = 0;
        }
    }

    /// Run forever against `clock`.
    ///
    /// Sleeps briefly when idle, longer while the bus cannot be read.
    pub fn run<C: Clock>(&mut self, clock: &C) -> ! {
        loop {
            let outcome = self.step(clock.now());
            if outcome.read_failed {
                thread::sleep(READ_ERROR_SLEEP);
            } else if outcome.bytes_read == 0 {
                thread::sleep(IDLE_SLEEP);
            }
        }
    }

    /// Step until `done` returns `true` or `max_steps` iterations ran.
    ///
    /// Returns the outcome that satisfied `done`, or `None` if the step limit
    /// was reached first.
    pub fn run_until<C, F>(&mut self, clock: &C, max_steps: usize, mut done: F) -> Option<StepOutcome>
    where
        C: Clock,
        F: FnMut(&StepOutcome) -> bool,
    {
        for _ in 0..max_steps {
            let outcome = self.step(clock.now());
            if done(&outcome) {
                return Some(outcome);
            }
        }
        None
    }

    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    /// Current token snapshot.
    pub fn token(&self) -> TokenSnapshot {
        self.token_reader.snapshot()
    }

    /// Consecutive failed bus reads, zero once a read succeeds.
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    /// Frames dropped by the deframer since start.
    pub fn dropped_frames(&self) -> u64 {
        self.parser.dropped_frames()
    }
}
