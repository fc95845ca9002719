pub mod codec;
pub mod commands;
pub mod frame;
pub mod message;
pub mod response;
pub mod stream_parser;

pub use codec::BusCodec;
pub use commands::CommandId;
pub use frame::{Frame, FrameWriter, crc16_ccitt, encode_frame};
pub use message::{Command, PingRequest, RawRequest};
pub use response::{Response, ResponseHeader, encode_response};
pub use stream_parser::{DrainFrames, ParserState, StreamParser};
