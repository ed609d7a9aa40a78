#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # SIMCom cellular
//!
//! Blocking driver for SIMCom SIM7600 series modules on a serial AT
//! interface. It can be used both on `no_std` and `std` platforms.
//!
//! On top of a small command engine it provides:
//! - module bring-up and network registration ([`Client::init`])
//! - SMS send, read and delete ([`Client::send_sms`], [`Client::read_sms`])
//! - GNSS fixes ([`Client::get_fix`])
//! - text-to-speech ([`Client::speak`], [`Client::stop_speaking`])
//!
//! ### Transport and clock
//!
//! The transport is anything implementing the blocking
//! [`embedded_io`] `Read + ReadReady + Write` traits, typically a UART.
//! Waiting is done through a [`Clock`], which is an
//! [`embedded_hal::delay::DelayNs`] that can also tell the time. With the
//! `std` feature enabled, [`StdClock`] does that with `std::time`.
//!
//! ### Logging
//!
//! Enable either the `log` or the `defmt` feature. Lifecycle events are
//! additionally reported to the [`DiagnosticSink`](diagnostics::DiagnosticSink)
//! given to [`Client::with_sink`]; [`Client::new`] uses
//! [`LogSink`](diagnostics::LogSink).

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod client;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod error;
mod module_timing;
pub mod registration;
pub mod services;

#[cfg(test)]
mod test_helpers;

use embassy_time::Instant;
use embedded_hal::delay::DelayNs;

pub use client::{Client, CMD_BUF_SIZE, RESPONSE_BUF_SIZE};
pub use config::{Config, Limit, RetryPolicy};
pub use error::Error;
pub use services::location::GpsFix;
pub use services::sms::Sms;

// Re-export atat and embassy-time
pub use atat;
pub use embassy_time;

/// Monotonic time source that can also block for a while.
pub trait Clock: DelayNs {
    fn now(&self) -> Instant;
}

#[cfg(feature = "std")]
pub struct StdClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl DelayNs for StdClock {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(ns.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms.into()));
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Instant {
        let micros = self.start.elapsed().as_micros();
        Instant::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}
