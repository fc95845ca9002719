//! Host-side access to the door node bus.
//!
//! This crate provides the bus master: an async client that frames requests
//! with [`doorkey_protocol::BusCodec`], sends them through a serial bridge and
//! matches the responding node's reply.
//!
//! # Example
//!
//! ```no_run
//! use doorkey_core::DeviceAddress;
//! use doorkey_network::{BusClient, BusClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = BusClient::connect_tcp(&BusClientConfig::default()).await?;
//! client.unlock(DeviceAddress::new(2)).await?;
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::{
    BusClient, BusClientConfig, BusClientError, DEFAULT_BRIDGE_PORT, DEFAULT_TIMEOUT, Result,
};
