//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use doorkey_core::constants::ROM_CODE_LENGTH;
use doorkey_hardware::token::rom_code_is_valid;
use doorkey_network::{DEFAULT_BRIDGE_PORT, DEFAULT_TIMEOUT};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "doorkey",
    author,
    version,
    about = "Door-access node and bus master for a half-duplex serial bus",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a door node on a serial port
    Run(RunArgs),

    /// Ping a node and print the echoed bytes
    Ping {
        #[command(flatten)]
        target: TargetArgs,

        /// Two bytes to echo, as hex
        #[arg(long, default_value = "a55a", value_parser = parse_ping_data)]
        data: [u8; 2],
    },

    /// Print the key token a node currently sees
    Status(TargetArgs),

    /// Unlock a node's door
    Unlock(TargetArgs),

    /// Show the reject indicator on a node
    Reject(TargetArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Serial device of the bus transceiver
    #[arg(long, env = "DOORKEY_PORT")]
    pub port: Option<String>,

    /// Baud rate, overrides the configuration file
    #[arg(long)]
    pub baud: Option<u32>,

    /// Device address, overrides the configuration file
    #[arg(long)]
    pub address: Option<u8>,

    /// TOML configuration file
    #[arg(short, long, env = "DOORKEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// ROM code (16 hex digits) of a token to report as permanently present
    #[arg(long, value_parser = parse_rom_code)]
    pub token: Option<[u8; ROM_CODE_LENGTH]>,
}

#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// TCP serial bridge in front of the bus
    #[arg(long, env = "DOORKEY_BRIDGE", default_value_t = default_bridge())]
    pub bridge: SocketAddr,

    /// Address of the node to talk to
    #[arg(short, long)]
    pub address: u8,

    /// Response timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    pub timeout_ms: u64,
}

impl TargetArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_bridge() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_BRIDGE_PORT))
}

fn parse_ping_data(s: &str) -> Result<[u8; 2], String> {
    let bytes = hex::decode(s).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|_| "expected exactly 2 bytes (4 hex digits)".to_string())
}

fn parse_rom_code(s: &str) -> Result<[u8; ROM_CODE_LENGTH], String> {
    let bytes = hex::decode(s).map_err(|e| e.to_string())?;
    let rom: [u8; ROM_CODE_LENGTH] = bytes
        .try_into()
        .map_err(|_| format!("expected {ROM_CODE_LENGTH} bytes ({} hex digits)", ROM_CODE_LENGTH * 2))?;
    if !rom_code_is_valid(&rom) {
        return Err("ROM code CRC does not match".to_string());
    }
    Ok(rom)
}
