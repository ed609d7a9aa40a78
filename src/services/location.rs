use embedded_io::{Read, ReadReady, Write};
use heapless::String;
use serde::{Deserialize, Serialize};

use crate::{
    client::{find, push_lossy, Client, RESPONSE_BUF_SIZE},
    command::{
        gnss::{
            types::{GnssMode, GnssSession},
            GetGnssInfo, StartGnssSession, StopGnssSession, INFO_LABEL, NO_FIX,
        },
        OK,
    },
    config::RetryPolicy,
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Error,
    module_timing::command_timeout,
    Clock,
};

/// Position in signed decimal degrees, north and east positive.
///
/// When `valid` is false both coordinates are 0.0 and mean nothing, use
/// [`GpsFix::coordinates`] to not trip over that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub valid: bool,
}

impl GpsFix {
    pub const INVALID: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
        valid: false,
    };

    /// `(latitude, longitude)` of a valid fix.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.valid.then_some((self.latitude, self.longitude))
    }
}

impl Default for GpsFix {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<T, C, S> Client<T, C, S>
where
    T: Read + ReadReady + Write,
    C: Clock,
    S: DiagnosticSink,
{
    /// Power up the GNSS receiver and poll it until it reports a position.
    ///
    /// Polls every `policy.interval` for as long as `policy` allows, see
    /// [`RetryPolicy::gps`]. The receiver is switched off again once a
    /// position came in. A query that gets no answer at all ends the call
    /// right away. In both failure cases the returned fix is
    /// [`GpsFix::INVALID`]; only transport errors are returned as `Err`.
    pub fn get_fix(&mut self, policy: RetryPolicy) -> Result<GpsFix, Error> {
        let start = StartGnssSession {
            session: GnssSession::On,
            mode: GnssMode::Standalone,
        };
        let res = self.compare(&start, command_timeout(&start), &[OK]);
        Self::best_effort(res)?;

        let started = self.now();
        let mut attempts = 0;
        while policy.allows(attempts, self.elapsed_since(started)) {
            attempts += 1;
            match self.send_command(&GetGnssInfo, command_timeout(&GetGnssInfo)) {
                Ok(()) => {}
                Err(Error::NoResponse) => {
                    self.diagnostic(Diagnostic::GpsNoResponse);
                    return Ok(GpsFix::INVALID);
                }
                Err(e) => return Err(e),
            }

            let mut payload: String<RESPONSE_BUF_SIZE> = String::new();
            // Cannot overflow, the response buffer has the same capacity
            push_lossy(&mut payload, strip_label(self.response_bytes()));

            if payload.contains(NO_FIX) {
                self.diagnostic(Diagnostic::WaitingForFix);
                self.sleep(policy.interval);
                continue;
            }

            let stop = StopGnssSession {
                session: GnssSession::Off,
            };
            let res = self.compare(&stop, command_timeout(&stop), &[OK]);
            Self::best_effort(res)?;

            return Ok(parse_fix(&payload));
        }

        self.diagnostic(Diagnostic::GpsTimeout);
        Ok(GpsFix::INVALID)
    }
}

/// Everything after the `+CGPSINFO: ` label, or all of `response` if the
/// label is missing.
fn strip_label(response: &[u8]) -> &[u8] {
    match find(response, INFO_LABEL.as_bytes()) {
        Some(at) => &response[at + INFO_LABEL.len()..],
        None => response,
    }
}

/// `<lat>,<N/S>,<log>,<E/W>,...` into signed decimal degrees.
///
/// Only the first four fields are looked at. Magnitudes are packed as
/// `ddmm.mmmm`: whole degrees times 100 plus minutes.
pub fn parse_fix(payload: &str) -> GpsFix {
    try_parse_fix(payload).unwrap_or(GpsFix::INVALID)
}

fn try_parse_fix(payload: &str) -> Option<GpsFix> {
    let mut fields = payload.split(',').map(str::trim);

    let latitude = degrees(fields.next()?)?;
    let north_south = fields.next()?;
    let longitude = degrees(fields.next()?)?;
    let east_west = fields.next()?;

    Some(GpsFix {
        latitude: if north_south == "S" { -latitude } else { latitude },
        longitude: if east_west == "W" { -longitude } else { longitude },
        valid: true,
    })
}

fn degrees(packed: &str) -> Option<f64> {
    // Also rejects "nan" and "inf", which `parse` accepts
    let value = packed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    // `as` truncates toward zero, which keeps this usable without libm
    let whole = (value as i64 / 100) as f64;
    let minutes = value % 100.0;
    Some(whole + minutes / 60.0)
}
