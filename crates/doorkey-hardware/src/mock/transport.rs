//! Mock serial transport.

use super::{EventLog, HardwareEvent, lock};
use crate::{HardwareError, Result, traits::SerialTransport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct TransportShared {
    rx: VecDeque<u8>,
    written: Vec<u8>,
    unflushed: usize,
    flushes: usize,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory serial transport.
///
/// Bytes injected through the handle are returned by
/// [`SerialTransport::read_byte`]; bytes written by the device are collected
/// for inspection. A flush marks every written byte as drained.
///
/// # Examples
///
/// ```
/// use doorkey_hardware::SerialTransport;
/// use doorkey_hardware::mock::MockTransport;
///
/// let (mut transport, handle) = MockTransport::new();
/// handle.inject(&[0x7E, 0x01]);
///
/// assert_eq!(transport.read_byte().unwrap(), Some(0x7E));
/// assert_eq!(transport.read_byte().unwrap(), Some(0x01));
/// assert_eq!(transport.read_byte().unwrap(), None);
///
/// transport.write(&[0xAA]).unwrap();
/// transport.flush().unwrap();
/// assert_eq!(handle.written(), vec![0xAA]);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    shared: Arc<Mutex<TransportShared>>,
    log: Option<EventLog>,
}

impl MockTransport {
    pub fn new() -> (Self, MockTransportHandle) {
        Self::build(None)
    }

    /// Create a transport that also records writes and flushes into `log`.
    pub fn with_log(log: EventLog) -> (Self, MockTransportHandle) {
        Self::build(Some(log))
    }

    fn build(log: Option<EventLog>) -> (Self, MockTransportHandle) {
        let shared = Arc::new(Mutex::new(TransportShared::default()));
        let handle = MockTransportHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared, log }, handle)
    }
}

impl SerialTransport for MockTransport {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut shared = lock(&self.shared);
        if shared.fail_reads {
            return Err(HardwareError::disconnected("mock transport"));
        }
        Ok(shared.rx.pop_front())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut shared = lock(&self.shared);
        if shared.fail_writes {
            return Err(HardwareError::transport("injected write failure"));
        }
        shared.written.extend_from_slice(bytes);
        shared.unflushed += bytes.len();
        if let Some(log) = &self.log {
            log.record(HardwareEvent::Write(bytes.to_vec()));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let mut shared = lock(&self.shared);
        shared.unflushed = 0;
        shared.flushes += 1;
        if let Some(log) = &self.log {
            log.record(HardwareEvent::Flush);
        }
        Ok(())
    }
}

/// Handle for driving and inspecting a mock transport.
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    shared: Arc<Mutex<TransportShared>>,
}

impl MockTransportHandle {
    /// Queue bytes as if they arrived from the bus.
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.shared).rx.extend(bytes.iter().copied());
    }

    /// Number of injected bytes not yet read.
    pub fn pending_rx(&self) -> usize {
        lock(&self.shared).rx.len()
    }

    /// Every byte written so far.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.shared).written.clone()
    }

    /// Take and clear the written bytes.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.shared).written)
    }

    /// Bytes written since the last flush.
    pub fn unflushed(&self) -> usize {
        lock(&self.shared).unflushed
    }

    /// Number of flush calls.
    pub fn flush_count(&self) -> usize {
        lock(&self.shared).flushes
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        lock(&self.shared).fail_writes = fail;
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        lock(&self.shared).fail_reads = fail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unflushed_tracking() {
        let (mut transport, handle) = MockTransport::new();
        transport.write(&[1, 2, 3]).unwrap();
        assert_eq!(handle.unflushed(), 3);

        transport.flush().unwrap();
        assert_eq!(handle.unflushed(), 0);
        assert_eq!(handle.flush_count(), 1);
    }

    #[test]
    fn test_take_written_clears() {
        let (mut transport, handle) = MockTransport::new();
        transport.write(&[9]).unwrap();
        assert_eq!(handle.take_written(), vec![9]);
        assert!(handle.written().is_empty());
    }

    #[test]
    fn test_injected_write_failure() {
        let (mut transport, handle) = MockTransport::new();
        handle.fail_writes(true);
        assert!(transport.write(&[1]).is_err());
        assert!(handle.written().is_empty());
    }

    #[test]
    fn test_log_records_order() {
        let log = EventLog::new();
        let (mut transport, _handle) = MockTransport::with_log(log.clone());
        transport.write(&[0x7E]).unwrap();
        transport.flush().unwrap();

        assert_eq!(
            log.events(),
            vec![HardwareEvent::Write(vec![0x7E]), HardwareEvent::Flush]
        );
    }

    #[test]
    fn test_injected_read_failure() {
        let (mut transport, handle) = MockTransport::new();
        handle.inject(&[1]);
        handle.fail_reads(true);
        assert!(transport.read_byte().is_err());

        handle.fail_reads(false);
        assert_eq!(transport.read_byte().unwrap(), Some(1));
    }

    #[test]
    fn test_pending_rx() {
        let (mut transport, handle) = MockTransport::new();
        handle.inject(&[1, 2]);
        assert_eq!(handle.pending_rx(), 2);
        transport.read_byte().unwrap();
        assert_eq!(handle.pending_rx(), 1);
    }
}
