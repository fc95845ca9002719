//! Tokio codec for door bus framing.
//!
//! [`BusCodec`] wraps the [`StreamParser`] so that a bus master (or a test
//! harness standing in for the serial line) can use Tokio's `Framed` streams:
//!
//! ```text
//! byte stream -> Decoder -> Frame (verified payload)
//! Vec<u8>     -> Encoder -> byte stream (flag, stuffed payload, CRC, flag)
//! ```
//!
//! Frames with a bad checksum never reach the caller; the decoder keeps
//! reading until a valid frame completes.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use doorkey_core::DeviceAddress;
//! use doorkey_protocol::{BusCodec, Command};
//! use futures::{SinkExt, StreamExt};
//!
//! # async fn example() -> doorkey_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:4000").await?;
//! let mut framed = Framed::new(stream, BusCodec::new());
//!
//! framed.send(Command::GetStatus.encode_request(1, DeviceAddress::new(0))).await?;
//!
//! if let Some(Ok(frame)) = framed.next().await {
//!     println!("Received: {frame}");
//! }
//! # Ok(())
//! # }
//! ```

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{Frame, StreamParser, encode_frame};
use doorkey_core::{Error, Result, constants::MAX_FRAME_PAYLOAD};

/// Tokio codec for door bus frames.
#[derive(Debug)]
pub struct BusCodec {
    /// Stream parser handling partial frames and checksum verification.
    parser: StreamParser,

    /// Maximum payload size accepted on either direction.
    max_payload: usize,
}

impl BusCodec {
    /// Create a codec with the node receive buffer limit.
    ///
    /// # Example
    ///
    /// ```
    /// use doorkey_protocol::BusCodec;
    ///
    /// let codec = BusCodec::new();
    /// assert_eq!(codec.max_payload(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_max_payload(MAX_FRAME_PAYLOAD)
    }

    /// Create a codec with a custom payload limit.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            parser: StreamParser::with_max_payload(max_payload),
            max_payload,
        }
    }

    /// Get the current payload limit.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Number of inbound frames dropped by the parser so far.
    pub fn dropped_frames(&self) -> u64 {
        self.parser.dropped_frames()
    }
}

impl Default for BusCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for BusCodec {
    type Item = Frame;
    type Error = Error;

    /// Decode the next verified frame from the byte stream.
    ///
    /// Returns `Ok(None)` until a complete frame with a valid checksum is
    /// available. Corrupted frames are skipped, not reported.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Decoder;
    /// use doorkey_protocol::{BusCodec, encode_frame};
    ///
    /// let mut codec = BusCodec::new();
    /// let mut buffer = BytesMut::from(&encode_frame(&[1, 0, 2])[..]);
    ///
    /// let frame = codec.decode(&mut buffer).unwrap().unwrap();
    /// assert_eq!(frame.payload(), &[1, 0, 2]);
    /// ```
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if !src.is_empty() {
            // All bytes now live in the parser's frame state
            self.parser.feed(src);
            src.clear();
        }

        Ok(self.parser.next_frame())
    }
}

impl Encoder<Vec<u8>> for BusCodec {
    type Error = Error;

    /// Frame `item` and append the wire bytes to `dst`.
    ///
    /// # Errors
    ///
    /// Returns `Error::FrameTooLarge` if the payload exceeds the limit; the
    /// receiving node would drop such a frame anyway.
    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_payload {
            return Err(Error::FrameTooLarge {
                size: item.len(),
                max_size: self.max_payload,
            });
        }

        dst.extend_from_slice(&encode_frame(&item));
        Ok(())
    }
}
