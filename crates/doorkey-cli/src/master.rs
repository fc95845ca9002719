//! Bus master one-shot commands.

use crate::args::TargetArgs;
use anyhow::{Context, Result};
use doorkey_core::DeviceAddress;
use doorkey_network::{BusClient, BusClientConfig};
use tokio::net::TcpStream;

/// One request to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Ping([u8; 2]),
    Status,
    Unlock,
    Reject,
}

pub async fn execute(target: &TargetArgs, request: Request) -> Result<()> {
    let config = BusClientConfig {
        bridge_addr: target.bridge,
        timeout: target.timeout(),
    };
    let mut client = BusClient::connect_tcp(&config)
        .await
        .with_context(|| format!("connecting to bridge {}", target.bridge))?;

    let address = DeviceAddress::new(target.address);
    let result = send(&mut client, address, request).await;
    client.close().await?;

    println!("{}", result.with_context(|| format!("node {address}"))?);
    Ok(())
}

async fn send(client: &mut BusClient<TcpStream>, address: DeviceAddress, request: Request) -> Result<String> {
    let line = match request {
        Request::Ping(data) => {
            let echoed = client.ping(address, data).await?;
            format!("pong {}", hex::encode(echoed))
        }
        Request::Status => client.status(address).await?.to_string(),
        Request::Unlock => {
            client.unlock(address).await?;
            "door unlocked".to_string()
        }
        Request::Reject => {
            client.reject(address).await?;
            "key rejected".to_string()
        }
    };
    Ok(line)
}
