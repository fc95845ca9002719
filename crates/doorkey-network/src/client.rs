//! Bus master client.
//!
//! A host reaches the door nodes through a serial bridge: either a TCP
//! server relaying bytes to and from the bus, or any other byte stream. The
//! [`BusClient`] frames requests with [`BusCodec`], then waits for the
//! matching response.
//!
//! # Architecture
//!
//! ```text
//! doorkey CLI
//!     │
//!     └─> BusClient ───(TCP)───> serial bridge ───(bus)───> door nodes
//!            │
//!            └─> BusCodec (HDLC framing + CRC)
//! ```
//!
//! # Matching responses
//!
//! The bus is shared and half-duplex, so the stream may carry more than the
//! awaited response. While waiting, the client skips:
//!
//! - a frame identical to the request just sent (bridge local echo)
//! - frames too short for a response header
//! - frames whose version or address differ from the request
//! - frames from the addressed node that do not fit the command (stale
//!   replies to an earlier request)
//!
//! A node never answers an invalid request, so a missing response surfaces as
//! [`BusClientError::ReadTimeout`].
//!
//! # Example Usage
//!
//! ```no_run
//! use doorkey_core::DeviceAddress;
//! use doorkey_network::{BusClient, BusClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BusClientConfig {
//!     bridge_addr: "192.168.0.50:4000".parse()?,
//!     ..BusClientConfig::default()
//! };
//!
//! let mut client = BusClient::connect_tcp(&config).await?;
//! let token = client.status(DeviceAddress::new(3)).await?;
//! println!("{token}");
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

use doorkey_core::{
    DeviceAddress, TokenSnapshot,
    constants::{PING_PAYLOAD_LENGTH, PROTOCOL_VERSION},
};
use doorkey_protocol::{BusCodec, Command, PingRequest, Response, ResponseHeader};
use futures::{SinkExt, StreamExt};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, trace, warn};

/// Default TCP port of a serial bridge.
pub const DEFAULT_BRIDGE_PORT: u16 = 4000;

/// Default response timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Configuration for a bus client.
///
/// # Example
///
/// ```
/// use doorkey_network::BusClientConfig;
/// use std::time::Duration;
///
/// let config = BusClientConfig {
///     bridge_addr: "127.0.0.1:4000".parse().unwrap(),
///     timeout: Duration::from_millis(200),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct BusClientConfig {
    /// Address of the TCP serial bridge
    pub bridge_addr: SocketAddr,

    /// Timeout for connecting, sending and waiting for a response
    pub timeout: Duration,
}

impl Default for BusClientConfig {
    fn default() -> Self {
        Self {
            bridge_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_BRIDGE_PORT)),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Errors that can occur while talking to nodes.
#[derive(Debug, Error)]
pub enum BusClientError {
    /// The client was closed
    #[error("Not connected to bridge")]
    NotConnected,

    /// Connection attempt timed out
    #[error("Connection timeout after {0}ms")]
    ConnectionTimeout(u64),

    /// No matching response arrived in time
    #[error("Read timeout after {0}ms")]
    ReadTimeout(u64),

    /// Write operation timed out
    #[error("Write timeout after {0}ms")]
    WriteTimeout(u64),

    /// The bridge closed the stream
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// Framing error or malformed response from the addressed node
    #[error("Protocol error: {0}")]
    Protocol(#[from] doorkey_core::Error),

    /// A well-formed response of the wrong kind
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bus client operations.
pub type Result<T> = std::result::Result<T, BusClientError>;

/// Bus master over any byte stream.
///
/// One request is in flight at a time; the bus protocol has no request ids.
pub struct BusClient<S> {
    framed: Option<Framed<S, BusCodec>>,
    timeout: Duration,
    version: u8,
}

impl BusClient<TcpStream> {
    /// Connect to a TCP serial bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is refused or times out.
    pub async fn connect_tcp(config: &BusClientConfig) -> Result<Self> {
        info!("Connecting to bridge at {}", config.bridge_addr);

        let stream = match tokio::time::timeout(config.timeout, TcpStream::connect(config.bridge_addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                error!("Connection failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("Connection timeout after {}ms", config.timeout.as_millis());
                return Err(BusClientError::ConnectionTimeout(config.timeout.as_millis() as u64));
            }
        };

        // Requests are a handful of bytes; do not let Nagle hold them back
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        Ok(Self::new(stream, config.timeout))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> BusClient<S> {
    /// Wrap an already open stream.
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self {
            framed: Some(Framed::new(stream, BusCodec::new())),
            timeout,
            version: PROTOCOL_VERSION,
        }
    }

    /// Send `command` to the node at `address` and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns [`BusClientError::ReadTimeout`] if no matching response arrives
    /// within the timeout.
    pub async fn request(&mut self, address: DeviceAddress, command: &Command) -> Result<Response> {
        let timeout = self.timeout;
        let version = self.version;
        let framed = self.framed.as_mut().ok_or(BusClientError::NotConnected)?;

        let request = command.encode_request(version, address);
        trace!(%address, command = %command.id(), "Sending request");

        match tokio::time::timeout(timeout, framed.send(request.clone())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Failed to send request: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("Send timeout after {}ms", timeout.as_millis());
                return Err(BusClientError::WriteTimeout(timeout.as_millis() as u64));
            }
        }

        let deadline = Instant::now() + timeout;
        loop {
            let frame = match tokio::time::timeout_at(deadline, framed.next()).await {
                Ok(Some(Ok(frame))) => frame,
                Ok(Some(Err(e))) => {
                    error!("Failed to decode frame: {}", e);
                    return Err(e.into());
                }
                Ok(None) => {
                    warn!("Connection closed by bridge");
                    return Err(BusClientError::ConnectionLost(
                        "Bridge closed connection".to_string(),
                    ));
                }
                Err(_) => {
                    debug!(%address, "No response within {}ms", timeout.as_millis());
                    return Err(BusClientError::ReadTimeout(timeout.as_millis() as u64));
                }
            };

            if frame.payload() == request.as_slice() {
                trace!("Skipping local echo");
                continue;
            }

            let Ok((header, payload)) = ResponseHeader::split(frame.payload()) else {
                trace!(len = frame.len(), "Skipping short frame");
                continue;
            };
            if header.version != version || header.address != address {
                trace!(version = header.version, address = %header.address, "Skipping foreign frame");
                continue;
            }

            // A late reply to an earlier, timed-out request does not fit
            match Response::decode(command.id(), payload) {
                Ok(response) => {
                    trace!(%address, ?response, "Received response");
                    return Ok(response);
                }
                Err(e) => {
                    trace!(error = %e, "Skipping stale frame");
                    continue;
                }
            }
        }
    }

    /// Ping a node; returns the echoed bytes.
    pub async fn ping(&mut self, address: DeviceAddress, data: [u8; PING_PAYLOAD_LENGTH]) -> Result<[u8; PING_PAYLOAD_LENGTH]> {
        match self.request(address, &Command::Ping(PingRequest::new(data))).await? {
            Response::Pong { data } => Ok(data),
            other => Err(unexpected(&other)),
        }
    }

    /// Read the token snapshot of a node.
    pub async fn status(&mut self, address: DeviceAddress) -> Result<TokenSnapshot> {
        match self.request(address, &Command::GetStatus).await? {
            Response::Status(token) => Ok(token),
            other => Err(unexpected(&other)),
        }
    }

    /// Open a door.
    pub async fn unlock(&mut self, address: DeviceAddress) -> Result<()> {
        self.request(address, &Command::UnlockDoor).await.map(drop)
    }

    /// Signal a rejected key.
    pub async fn reject(&mut self, address: DeviceAddress) -> Result<()> {
        self.request(address, &Command::RejectKey).await.map(drop)
    }

    /// Returns `true` until [`BusClient::close`] is called.
    pub fn is_connected(&self) -> bool {
        self.framed.is_some()
    }

    /// Flush and shut down the stream. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut framed) = self.framed.take() {
            debug!("Closing bus client");

            let close_timeout = Duration::from_millis(500);
            match tokio::time::timeout(close_timeout, framed.flush()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Error flushing during close: {}", e),
                Err(_) => warn!("Flush timeout during close"),
            }

            let mut stream = framed.into_inner();
            match tokio::time::timeout(close_timeout, stream.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Error during shutdown: {}", e),
                Err(_) => warn!("Shutdown timeout during close"),
            }
        }
        Ok(())
    }
}

fn unexpected(response: &Response) -> BusClientError {
    BusClientError::UnexpectedResponse(format!("{response:?}"))
}
