use embassy_time::Duration;

use crate::module_timing::{byte_timeout, gps_poll_interval, probe_interval, registration_interval};

/// Upper bound of a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Limit {
    /// Keep retrying until the modem answers
    Unbounded,
    /// Give up after this many attempts
    Attempts(u32),
    /// Give up once this much time has passed since the first attempt
    Deadline(Duration),
}

/// Fixed-interval retry, composed around single-shot commands by the
/// polling operations (`init`, `get_fix`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    pub interval: Duration,
    pub limit: Limit,
}

impl RetryPolicy {
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            limit: Limit::Unbounded,
        }
    }

    pub const fn attempts(interval: Duration, attempts: u32) -> Self {
        Self {
            interval,
            limit: Limit::Attempts(attempts),
        }
    }

    pub const fn deadline(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            limit: Limit::Deadline(timeout),
        }
    }

    /// Network registration polling, `AT+CREG?` every 500 ms until `timeout`.
    pub fn registration(timeout: Duration) -> Self {
        Self::deadline(registration_interval(), timeout)
    }

    /// GNSS fix polling, `AT+CGPSINFO` every second until `timeout`.
    pub fn gps(timeout: Duration) -> Self {
        Self::deadline(gps_poll_interval(), timeout)
    }

    /// Whether another attempt may start after `attempts` attempts spanning
    /// `elapsed`.
    pub fn allows(&self, attempts: u32, elapsed: Duration) -> bool {
        match self.limit {
            Limit::Unbounded => true,
            Limit::Attempts(max) => attempts < max,
            Limit::Deadline(timeout) => elapsed < timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) byte_timeout: Duration,
    pub(crate) probe_policy: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            byte_timeout: byte_timeout(),
            probe_policy: RetryPolicy::unbounded(probe_interval()),
        }
    }

    /// How long a read keeps collecting once the modem went quiet.
    pub fn with_byte_timeout(self, byte_timeout: Duration) -> Self {
        Config {
            byte_timeout,
            ..self
        }
    }

    /// Retry policy of the `AT` liveness probe at the start of `init`.
    ///
    /// Unbounded by default: without a live modem there is nothing to
    /// initialize.
    pub fn with_probe_policy(self, probe_policy: RetryPolicy) -> Self {
        Config {
            probe_policy,
            ..self
        }
    }

    pub fn byte_timeout(&self) -> Duration {
        self.byte_timeout
    }

    pub fn probe_policy(&self) -> RetryPolicy {
        self.probe_policy
    }
}
