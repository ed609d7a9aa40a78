//! Lifecycle events of the driver, reported to a [`DiagnosticSink`] owned by
//! the [`Client`](crate::Client).

use crate::registration::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// `init` started
    Initiating,
    /// Liveness probe sent
    Probing,
    /// Liveness probe policy exhausted without an `OK`
    ProbeFailed,
    /// Selecting text mode, storage and purging read messages
    ConfiguringSms,
    /// Not registered yet, polling again
    CheckingRegistration,
    Registered(Status),
    /// Registration polling gave up, `init` returned on a best-effort basis
    RegistrationTimeout,
    /// `AT+CMGS` did not answer with the prompt, the body was not sent
    SmsPromptMissing,
    /// Receiver on, no fix yet
    WaitingForFix,
    /// `AT+CGPSINFO` got no answer at all
    GpsNoResponse,
    /// No fix within the retry policy
    GpsTimeout,
}

pub trait DiagnosticSink {
    fn record(&mut self, event: Diagnostic);
}

/// Discards every event.
impl DiagnosticSink for () {
    fn record(&mut self, _event: Diagnostic) {}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn record(&mut self, event: Diagnostic) {
        (**self).record(event)
    }
}

/// Default sink, forwards every event to `log`/`defmt`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, event: Diagnostic) {
        match event {
            Diagnostic::Initiating => info!("Initiating SIM module"),
            Diagnostic::Probing => debug!("Sending AT"),
            Diagnostic::ProbeFailed => error!("Module did not answer AT"),
            Diagnostic::ConfiguringSms => info!("Setting SMS mode to text"),
            Diagnostic::CheckingRegistration => debug!("Checking network registration"),
            Diagnostic::Registered(status) => info!("Registered to network: {:?}", status),
            Diagnostic::RegistrationTimeout => warn!("Network registration timed out"),
            Diagnostic::SmsPromptMissing => error!("No SMS prompt, message not sent"),
            Diagnostic::WaitingForFix => trace!("Waiting for GPS fix"),
            Diagnostic::GpsNoResponse => error!("GPS info request got no response"),
            Diagnostic::GpsTimeout => warn!("No GPS fix before timeout"),
        }
    }
}
