//! `doorkey run`: a door node on a serial port.
//!
//! The transceiver's driver enable is wired to RTS; its receiver enable is
//! assumed tied to DE, so it gets a no-op line. A PC has no relay or
//! indicator GPIO, so those outputs log their level changes.

use crate::args::RunArgs;
use crate::config::CliConfig;
use crate::token::StaticToken;
use anyhow::{Context, Result};
use doorkey_hardware::serial::SerialPortTransport;
use doorkey_hardware::{LoggedOutput, NoopOutput, SystemClock};
use doorkey_node::{ActuatorPins, BusDirection, Node};
use tracing::info;

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    config.apply(args);

    let port = config
        .serial
        .port
        .as_deref()
        .context("no serial port given (use --port or [serial] port)")?;
    let transport = SerialPortTransport::open(port, config.serial.baud_rate)
        .with_context(|| format!("opening {port}"))?;
    let direction = BusDirection::new(
        Box::new(transport.direction_pin().context("cloning serial port for RTS")?),
        Box::new(NoopOutput),
    );
    let pins = ActuatorPins {
        relay: Box::new(LoggedOutput::new("relay")),
        green: Box::new(LoggedOutput::new("green")),
        red: Box::new(LoggedOutput::new("red")),
    };

    info!(
        port,
        baud_rate = config.serial.baud_rate,
        address = %config.node.device_address,
        "starting door node"
    );

    let mut node = Node::new(config.node, transport, direction, StaticToken::new(args.token), pins)
        .context("initializing node")?;
    node.run(&SystemClock::new())
}
