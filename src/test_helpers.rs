use core::cell::Cell;
use core::convert::Infallible;
use std::{collections::VecDeque, rc::Rc, vec::Vec};

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;
use embedded_io::{ErrorType, Read, ReadReady, Write};

use crate::{
    diagnostics::{Diagnostic, DiagnosticSink},
    Client, Clock, Config,
};

/// What the modem does after a command has been flushed to it.
#[derive(Debug, Clone)]
enum Reply {
    Bytes(Vec<u8>),
    Silence,
}

/// Scripted modem: every flushed command pops the next scripted reply and
/// makes it readable. Without a script the modem stays silent.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: VecDeque<Reply>,
    forever: Option<Vec<u8>>,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    sent: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next command.
    pub fn reply(&mut self, bytes: &[u8]) {
        self.replies.push_back(Reply::Bytes(bytes.to_vec()));
    }

    /// The next command gets no answer.
    pub fn silence(&mut self) {
        self.replies.push_back(Reply::Silence);
    }

    /// Answer every command after the scripted ones with `bytes`.
    pub fn reply_forever(&mut self, bytes: &[u8]) {
        self.forever = Some(bytes.to_vec());
    }

    /// Bytes already waiting before the next command.
    pub fn pending(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Everything written, one entry per flush.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

impl ErrorType for MockTransport {
    type Error = Infallible;
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        for (dst, src) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

impl ReadReady for MockTransport {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.rx.is_empty())
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.sent.push(core::mem::take(&mut self.tx));

        let reply = self
            .replies
            .pop_front()
            .or_else(|| self.forever.clone().map(Reply::Bytes));
        if let Some(Reply::Bytes(bytes)) = reply {
            self.rx.extend(bytes);
        }
        Ok(())
    }
}

/// Time only moves when somebody waits. Clones share the same time line.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    micros: Rc<Cell<u64>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        self.micros.set(self.micros.get() + u64::from(ns).div_ceil(1000));
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.micros.get())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Diagnostic>,
}

impl DiagnosticSink for RecordingSink {
    fn record(&mut self, event: Diagnostic) {
        self.events.push(event);
    }
}

/// Client with a short byte timeout, so a test does not spin through a full
/// second of mock time after every response.
pub fn client_with(
    transport: MockTransport,
    clock: MockClock,
) -> Client<MockTransport, MockClock, RecordingSink> {
    let config = Config::new().with_byte_timeout(Duration::from_millis(10));
    Client::with_sink(transport, clock, config, RecordingSink::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_advances_on_delay() {
        let mut clock = MockClock::new();
        let shared = clock.clone();

        clock.delay_ms(1500);
        clock.delay_us(10);

        assert_eq!(shared.now(), Instant::from_micros(1_500_010));
    }

    #[test]
    fn mock_transport_replies_per_flush() {
        let mut transport = MockTransport::new();
        transport.reply(b"OK\r\n");
        transport.silence();

        transport.write_all(b"AT\r\n").unwrap();
        assert!(!transport.read_ready().unwrap());
        transport.flush().unwrap();
        assert!(transport.read_ready().unwrap());

        let mut buf = [0u8; 8];
        assert_eq!(transport.read(&mut buf).unwrap(), 4);

        transport.write_all(b"AT\r\n").unwrap();
        transport.flush().unwrap();
        assert!(!transport.read_ready().unwrap());
        assert_eq!(transport.sent(), [b"AT\r\n", b"AT\r\n"]);
    }
}
