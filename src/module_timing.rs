use atat::AtatCmd;
use embassy_time::Duration;

/// Serial stream read timeout: a read that has started keeps collecting
/// bytes until the line has been quiet this long
pub fn byte_timeout() -> Duration {
    Duration::from_millis(1000)
}

/// Pause between two reads while waiting for a response
pub fn poll_interval() -> Duration {
    Duration::from_millis(1)
}

/// Pause after every `AT` liveness probe during bring-up
pub fn probe_interval() -> Duration {
    Duration::from_millis(500)
}

/// Pause between two `AT+CREG?` polls
pub fn registration_interval() -> Duration {
    Duration::from_millis(500)
}

/// Pause between two `AT+CGPSINFO` polls while there is no fix yet
pub fn gps_poll_interval() -> Duration {
    Duration::from_secs(1)
}

/// Response timeout declared on the command itself with `timeout_ms`
pub fn command_timeout<Cmd: AtatCmd>(_cmd: &Cmd) -> Duration {
    Duration::from_millis(Cmd::MAX_TIMEOUT_MS.into())
}
