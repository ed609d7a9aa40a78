//! ### 17 - GPS commands
pub mod types;

use atat::atat_derive::AtatCmd;
use types::{GnssMode, GnssSession};

use super::NoResponse;

/// Label in front of the `AT+CGPSINFO` payload
pub const INFO_LABEL: &str = "+CGPSINFO: ";

/// Payload of `AT+CGPSINFO` while the receiver has no fix yet
pub const NO_FIX: &str = ",,,,,,,,";

/// 17.2.1 Start GPS session +CGPS
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGPS", NoResponse, timeout_ms = 1000)]
pub struct StartGnssSession {
    #[at_arg(position = 0)]
    pub session: GnssSession,
    #[at_arg(position = 1)]
    pub mode: GnssMode,
}

/// 17.2.1 Stop GPS session +CGPS
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGPS", NoResponse, timeout_ms = 1000)]
pub struct StopGnssSession {
    #[at_arg(position = 0)]
    pub session: GnssSession,
}

/// 17.2.3 Get GPS fixed position information +CGPSINFO
///
/// Answers `+CGPSINFO: <lat>,<N/S>,<log>,<E/W>,<date>,<UTC time>,<alt>,<speed>,<course>`
/// with `<lat>` as ddmm.mmmmmm and `<log>` as dddmm.mmmmmm. Every field is
/// empty while there is no fix.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGPSINFO", NoResponse, timeout_ms = 1000)]
pub struct GetGnssInfo;
