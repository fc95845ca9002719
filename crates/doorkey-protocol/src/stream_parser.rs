//! Stream deframer for the door bus.
//!
//! This module provides a stateful parser that turns a raw byte stream from
//! the serial line into verified [`Frame`]s. It removes byte stuffing,
//! checks the CRC-16 frame check sequence and enforces the receive buffer
//! limit. Frames failing any check are dropped silently: they never surface
//! as received messages.
//!
//! # Usage
//!
//! ```
//! use doorkey_protocol::{StreamParser, encode_frame};
//!
//! let wire = encode_frame(&[0x01, 0x00, 0x02]);
//! let mut parser = StreamParser::new();
//!
//! // Bytes may arrive in arbitrary chunks
//! parser.feed(&wire[..3]);
//! assert!(parser.next_frame().is_none());
//! parser.feed(&wire[3..]);
//!
//! let frame = parser.next_frame().unwrap();
//! assert_eq!(frame.payload(), &[0x01, 0x00, 0x02]);
//! ```

use std::collections::VecDeque;

use doorkey_core::constants::{
    FRAME_CRC_LEN, FRAME_ESCAPE, FRAME_ESCAPE_XOR, FRAME_FLAG, MAX_FRAME_PAYLOAD,
};
use doorkey_core::Error;
use tracing::trace;

use crate::frame::{Frame, verify_body};

/// Recommended initial capacity for frame queue.
///
/// The node consumes one frame per loop iteration; a short burst from the
/// master can still complete several frames in one read.
const INITIAL_FRAME_QUEUE_CAPACITY: usize = 4;

/// State machine states for parsing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the first flag byte. Anything else is line noise.
    WaitingFlag,

    /// Accumulating unstuffed body bytes until the closing flag.
    ReadingFrame,

    /// The previous byte was an escape; the next one is XOR-decoded.
    Escaping,

    /// The current frame is already invalid (too long); skip to the next flag.
    Discarding,
}

/// Stateful stream parser for bus frames.
///
/// # State Machine
///
/// ```text
///                 flag                     flag (frame checked)
/// ┌───────────┐ ───────> ┌──────────────┐ ─────────┐
/// │WaitingFlag│          │ ReadingFrame │ <────────┘
/// └───────────┘          └──────────────┘
///                          │  ^      │ body > limit
///                   escape │  │ byte v
///                          v  │   ┌────────────┐  flag
///                       ┌─────────┐ │ Discarding │ ──────> ReadingFrame
///                       │Escaping │ └────────────┘
///                       └─────────┘
///                          │ flag (invalid escape: frame dropped)
///                          └──────────────────────────────> ReadingFrame
/// ```
///
/// A closing flag doubles as the opening flag of the next frame, and
/// consecutive flags are idle fill.
#[derive(Debug)]
pub struct StreamParser {
    /// Current state of the parser state machine.
    state: ParserState,

    /// Unstuffed body (payload and CRC) of the frame being received.
    body: Vec<u8>,

    /// Queue of verified frames ready for extraction.
    frames: VecDeque<Frame>,

    /// Maximum payload bytes accepted in one frame.
    max_payload: usize,

    /// Number of frames dropped for checksum, escape or size violations.
    dropped: u64,
}

impl StreamParser {
    /// Create a parser with the node's receive buffer limit
    /// ([`MAX_FRAME_PAYLOAD`]).
    pub fn new() -> Self {
        Self::with_max_payload(MAX_FRAME_PAYLOAD)
    }

    /// Create a parser accepting payloads up to `max_payload` bytes.
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            state: ParserState::WaitingFlag,
            body: Vec::with_capacity(max_payload + FRAME_CRC_LEN),
            frames: VecDeque::with_capacity(INITIAL_FRAME_QUEUE_CAPACITY),
            max_payload,
            dropped: 0,
        }
    }

    /// Feed bytes from the serial line into the parser.
    ///
    /// Multiple frames may complete during a single call; they are queued
    /// in arrival order.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.feed_byte(b);
        }
    }

    /// Feed a single byte.
    ///
    /// Returns `true` if this byte completed a verified frame.
    pub fn feed_byte(&mut self, byte: u8) -> bool {
        match self.state {
            ParserState::WaitingFlag => {
                if byte == FRAME_FLAG {
                    self.begin_frame();
                }
                false
            }
            ParserState::ReadingFrame => match byte {
                FRAME_FLAG => {
                    let completed = self.finish_frame();
                    self.begin_frame();
                    completed
                }
                FRAME_ESCAPE => {
                    self.state = ParserState::Escaping;
                    false
                }
                _ => {
                    self.push_body_byte(byte);
                    false
                }
            },
            ParserState::Escaping => {
                if byte == FRAME_FLAG {
                    self.drop_frame(&Error::InvalidEscape(byte));
                    self.begin_frame();
                } else {
                    self.state = ParserState::ReadingFrame;
                    self.push_body_byte(byte ^ FRAME_ESCAPE_XOR);
                }
                false
            }
            ParserState::Discarding => {
                if byte == FRAME_FLAG {
                    self.begin_frame();
                }
                false
            }
        }
    }

    /// Extract the next verified frame, if any.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Returns current parser state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Returns number of frames ready for extraction.
    pub fn frames_available(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames dropped since creation.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Maximum payload size accepted per frame.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Discard any partial frame and queued frames and wait for a new flag.
    pub fn clear(&mut self) {
        self.body.clear();
        self.frames.clear();
        self.state = ParserState::WaitingFlag;
    }

    /// Returns an iterator that drains all currently queued frames.
    pub fn drain_frames(&mut self) -> DrainFrames<'_> {
        DrainFrames { parser: self }
    }

    fn begin_frame(&mut self) {
        self.body.clear();
        self.state = ParserState::ReadingFrame;
    }

    fn push_body_byte(&mut self, byte: u8) {
        if self.body.len() >= self.max_payload + FRAME_CRC_LEN {
            self.drop_frame(&Error::FrameTooLarge {
                size: self.body.len() + 1 - FRAME_CRC_LEN,
                max_size: self.max_payload,
            });
            self.body.clear();
            self.state = ParserState::Discarding;
            return;
        }
        self.body.push(byte);
    }

    /// Verify the accumulated body and enqueue its payload.
    ///
    /// An empty body (back-to-back flags) is idle fill, not a dropped frame.
    fn finish_frame(&mut self) -> bool {
        if self.body.is_empty() {
            return false;
        }
        match verify_body(&self.body).map(Frame::from_bytes) {
            Ok(frame) => {
                self.frames.push_back(frame);
                true
            }
            Err(e) => {
                self.drop_frame(&e);
                false
            }
        }
    }

    fn drop_frame(&mut self, reason: &Error) {
        trace!(%reason, "frame dropped");
        self.dropped += 1;
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that drains frames from a [`StreamParser`].
pub struct DrainFrames<'a> {
    parser: &'a mut StreamParser,
}

impl Iterator for DrainFrames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.next_frame()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.parser.frames_available();
        (len, Some(len))
    }
}

impl ExactSizeIterator for DrainFrames<'_> {}
