//! ### 6 - Network commands
use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// Prefix of the `+CREG` read response
pub const REGISTRATION_PREFIX: &str = "+CREG: ";

/// Registered to the home network, URCs disabled
pub const REGISTERED_HOME: &str = "+CREG: 0,1";

/// Registered while roaming, URCs disabled
pub const REGISTERED_ROAMING: &str = "+CREG: 0,5";

/// 6.2.2 Network registration +CREG
///
/// The read command answers `+CREG: <n>,<stat>[,<lac>,<ci>]`. `<stat>` is 1
/// when registered to the home network and 5 when roaming.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG?", NoResponse, timeout_ms = 2000)]
pub struct GetNetworkRegistrationStatus;
