//! Common test utilities for protocol integration tests.
//!
//! Helpers build complete request/response messages with the current
//! protocol version so individual tests only state what they vary.

#![allow(dead_code)]

use doorkey_core::{DeviceAddress, constants::PROTOCOL_VERSION};
use doorkey_protocol::{Command, Response, ResponseHeader, StreamParser, encode_frame, encode_response};

/// Standard node address used across tests.
pub const TEST_ADDRESS: u8 = 7;

/// Build a framed request for `command` addressed to `address`.
pub fn framed_request(address: u8, command: Command) -> Vec<u8> {
    encode_frame(&command.encode_request(PROTOCOL_VERSION, DeviceAddress::new(address)))
}

/// Build a framed response from `address`.
pub fn framed_response(address: u8, response: &Response) -> Vec<u8> {
    encode_frame(&encode_response(
        PROTOCOL_VERSION,
        DeviceAddress::new(address),
        response,
    ))
}

/// Feed `wire` into a fresh parser and collect every verified payload.
pub fn parse_all(wire: &[u8]) -> Vec<Vec<u8>> {
    let mut parser = StreamParser::new();
    parser.feed(wire);
    parser.drain_frames().map(|f| f.payload().to_vec()).collect()
}

/// Assert that `bytes` is a response from `address` and return its payload.
pub fn assert_response_from(bytes: &[u8], address: u8) -> Vec<u8> {
    let (header, payload) = ResponseHeader::split(bytes).expect("response header");
    assert_eq!(header.version, PROTOCOL_VERSION, "protocol version");
    assert_eq!(header.address.as_u8(), address, "responder address");
    payload.to_vec()
}
