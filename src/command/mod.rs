//! AT Commands for SIMCom SIM7600 series modules\
//! Following the SIM7500_SIM7600 Series AT Command Manual

pub mod gnss;
pub mod network_service;
pub mod sms;
pub mod tts;

use atat::atat_derive::{AtatCmd, AtatResp};

/// Final result code of a successful command
pub const OK: &str = "OK";

#[derive(Clone, AtatResp)]
pub struct NoResponse;

/// Liveness probe, answered with `OK` as soon as the module accepts commands.
#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse, timeout_ms = 2000)]
pub struct AT;
