use atat::AtatCmd;
use embassy_time::{Duration, Instant};
use embedded_io::{Read, ReadReady, Write};
use heapless::{String, Vec};

use crate::{
    config::Config,
    diagnostics::{Diagnostic, DiagnosticSink, LogSink},
    error::Error,
    fmt::LossyStr,
    module_timing::poll_interval,
    Clock,
};

/// Capacity of the raw response buffer. One byte is always left unused, so
/// a full read holds `RESPONSE_BUF_SIZE - 1` bytes.
pub const RESPONSE_BUF_SIZE: usize = 256;

/// Capacity of the buffer commands are serialized into
pub const CMD_BUF_SIZE: usize = 256;

/// Blocking AT client for a SIMCom module on a serial transport.
///
/// Only one command is ever outstanding: every operation takes `&mut self`
/// and the response buffer is overwritten by the next command.
pub struct Client<T, C, S = LogSink> {
    transport: T,
    clock: C,
    sink: S,
    config: Config,
    cmd_buf: [u8; CMD_BUF_SIZE],
    response: Vec<u8, RESPONSE_BUF_SIZE>,
}

impl<T, C> Client<T, C, LogSink>
where
    T: Read + ReadReady + Write,
    C: Clock,
{
    pub fn new(transport: T, clock: C, config: Config) -> Self {
        Self::with_sink(transport, clock, config, LogSink)
    }
}

impl<T, C, S> Client<T, C, S>
where
    T: Read + ReadReady + Write,
    C: Clock,
    S: DiagnosticSink,
{
    pub fn with_sink(transport: T, clock: C, config: Config, sink: S) -> Self {
        Self {
            transport,
            clock,
            sink,
            config,
            cmd_buf: [0; CMD_BUF_SIZE],
            response: Vec::new(),
        }
    }

    /// Give the transport back. The driver never closes it.
    pub fn release(self) -> T {
        self.transport
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Text captured by the last command, empty if it got no response.
    ///
    /// Stops at the first byte that is not valid UTF-8.
    pub fn response(&self) -> &str {
        match core::str::from_utf8(&self.response) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&self.response[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    pub(crate) fn response_bytes(&self) -> &[u8] {
        &self.response
    }

    /// Discard everything the module sent that nobody asked for yet.
    pub fn drain_input(&mut self) -> Result<(), Error> {
        let mut scratch = [0u8; 64];
        while self.transport.read_ready().map_err(Error::io)? {
            let n = self.transport.read(&mut scratch).map_err(Error::io)?;
            if n == 0 {
                break;
            }
            trace!("Discarded {:?}", LossyStr(&scratch[..n]));
        }
        Ok(())
    }

    /// Read whatever the module has sent into `buf`.
    ///
    /// Returns 0 right away if no byte is ready. Otherwise keeps reading
    /// until `buf` holds `N - 1` bytes or the line has been quiet for the
    /// configured byte timeout, and returns the number of bytes read.
    pub fn read_line<const N: usize>(&mut self, buf: &mut Vec<u8, N>) -> Result<usize, Error> {
        read_available(
            &mut self.transport,
            &mut self.clock,
            self.config.byte_timeout,
            buf,
        )
    }

    /// Write a command without waiting for, or buffering, any response.
    pub fn send_immediate<Cmd: AtatCmd>(&mut self, cmd: &Cmd) -> Result<(), Error> {
        self.write_command(cmd)
    }

    /// Write raw bytes to the module, without line ending.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        trace!("TX raw {:?}", LossyStr(bytes));
        self.transport.write_all(bytes).map_err(Error::io)?;
        self.transport.flush().map_err(Error::io)
    }

    /// Send `cmd` and capture the first non-empty response within `timeout`.
    ///
    /// Stale input is discarded before the command is written. The response
    /// is not interpreted: echo, chatter and result codes all count.
    pub fn send_command<Cmd: AtatCmd>(
        &mut self,
        cmd: &Cmd,
        timeout: Duration,
    ) -> Result<(), Error> {
        self.response.clear();
        self.drain_input()?;
        self.write_command(cmd)?;

        let started = self.clock.now();
        loop {
            let n = read_available(
                &mut self.transport,
                &mut self.clock,
                self.config.byte_timeout,
                &mut self.response,
            )?;
            if n != 0 {
                trace!("RX {:?}", LossyStr(&self.response));
                return Ok(());
            }
            if self.elapsed_since(started) >= timeout {
                debug!("No response within {} ms", timeout.as_millis());
                self.response.clear();
                return Err(Error::NoResponse);
            }
            self.sleep(poll_interval());
        }
    }

    /// Send `cmd` and classify its response.
    ///
    /// Returns the 1-based index of the first of `candidates`, in the given
    /// order, that occurs anywhere in the response. Callers list the success
    /// token first.
    pub fn compare<Cmd: AtatCmd>(
        &mut self,
        cmd: &Cmd,
        timeout: Duration,
        candidates: &[&str],
    ) -> Result<usize, Error> {
        self.send_command(cmd, timeout)?;

        candidates
            .iter()
            .position(|candidate| find(&self.response, candidate.as_bytes()).is_some())
            .map(|i| i + 1)
            .ok_or(Error::NoMatch)
    }

    /// Outcome of a step nobody acts on: only transport errors count.
    pub(crate) fn best_effort(res: Result<usize, Error>) -> Result<(), Error> {
        match res {
            Err(e) if !e.is_unanswered() => Err(e),
            _ => Ok(()),
        }
    }

    pub(crate) fn diagnostic(&mut self, event: Diagnostic) {
        self.sink.record(event);
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    pub(crate) fn elapsed_since(&self, started: Instant) -> Duration {
        self.clock
            .now()
            .checked_duration_since(started)
            .unwrap_or_else(|| Duration::from_millis(0))
    }

    pub(crate) fn sleep(&mut self, duration: Duration) {
        let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        self.clock.delay_ms(ms);
    }

    fn write_command<Cmd: AtatCmd>(&mut self, cmd: &Cmd) -> Result<(), Error> {
        if Cmd::MAX_LEN > CMD_BUF_SIZE {
            return Err(Error::Overflow);
        }
        let len = cmd.write(&mut self.cmd_buf);
        trace!("TX {:?}", LossyStr(&self.cmd_buf[..len]));
        self.transport
            .write_all(&self.cmd_buf[..len])
            .map_err(Error::io)?;
        self.transport.flush().map_err(Error::io)
    }
}

fn read_available<T, C, const N: usize>(
    transport: &mut T,
    clock: &mut C,
    byte_timeout: Duration,
    buf: &mut Vec<u8, N>,
) -> Result<usize, Error>
where
    T: Read + ReadReady,
    C: Clock,
{
    buf.clear();
    if !transport.read_ready().map_err(Error::io)? {
        return Ok(0);
    }

    let limit = N.saturating_sub(1);
    let mut chunk = [0u8; 64];
    let mut last_byte = clock.now();
    while buf.len() < limit {
        if transport.read_ready().map_err(Error::io)? {
            let want = (limit - buf.len()).min(chunk.len());
            let n = transport.read(&mut chunk[..want]).map_err(Error::io)?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n])
                .map_err(|_| Error::Overflow)?;
            last_byte = clock.now();
        } else if clock
            .now()
            .checked_duration_since(last_byte)
            .map_or(false, |quiet| quiet >= byte_timeout)
        {
            break;
        } else {
            clock.delay_ms(u32::try_from(poll_interval().as_millis()).unwrap_or(u32::MAX));
        }
    }

    Ok(buf.len())
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Copy as much of `src` as fits into `dst`, dropping byte sequences that
/// are not UTF-8. Returns false once `dst` is full.
pub(crate) fn push_lossy<const N: usize>(dst: &mut String<N>, mut src: &[u8]) -> bool {
    loop {
        match core::str::from_utf8(src) {
            Ok(text) => return push_truncated(dst, text),
            Err(e) => {
                let (valid, rest) = src.split_at(e.valid_up_to());
                if !push_truncated(dst, core::str::from_utf8(valid).unwrap_or("")) {
                    return false;
                }
                match e.error_len() {
                    Some(invalid) => src = &rest[invalid..],
                    // Cut off in the middle of a character
                    None => return true,
                }
            }
        }
    }
}

/// Copy as much of `src` as fits, never splitting a character. Returns false
/// once `dst` is full.
pub(crate) fn push_truncated<const N: usize>(dst: &mut String<N>, src: &str) -> bool {
    src.chars().all(|c| dst.push(c).is_ok())
}
