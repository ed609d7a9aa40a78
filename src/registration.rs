use embedded_io::{Read, ReadReady, Write};

use crate::{
    client::{find, Client},
    command::{
        network_service::{
            GetNetworkRegistrationStatus, REGISTERED_HOME, REGISTERED_ROAMING,
            REGISTRATION_PREFIX,
        },
        sms::{
            types::{DeleteFlag, MessageFormat},
            DeleteMessages, SetMessageFormat, SetPreferredMessageStorage,
        },
        AT, OK,
    },
    config::RetryPolicy,
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Error,
    module_timing::command_timeout,
    Clock,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    #[default]
    None,
    NotRegistering,
    Home,
    Searching,
    Denied,
    Unknown,
    Roaming,
}

impl Status {
    pub fn registered(&self) -> bool {
        matches!(self, Self::Home | Self::Roaming)
    }
}

impl From<u8> for Status {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::NotRegistering,
            1 => Self::Home,
            2 => Self::Searching,
            3 => Self::Denied,
            4 => Self::Unknown,
            5 => Self::Roaming,
            _ => Self::None,
        }
    }
}

impl<T, C, S> Client<T, C, S>
where
    T: Read + ReadReady + Write,
    C: Clock,
    S: DiagnosticSink,
{
    /// Bring the module to a known state: wait for it to answer, configure
    /// SMS text mode and storage, purge read messages and wait for network
    /// registration.
    ///
    /// The liveness probe is retried according to
    /// [`Config::with_probe_policy`](crate::Config::with_probe_policy),
    /// forever by default. Registration is polled according to
    /// `registration`; running out of it is not an error, the returned
    /// [`Status`] is [`Status::None`] and the caller has to check readiness
    /// before relying on the network.
    pub fn init(&mut self, registration: RetryPolicy) -> Result<Status, Error> {
        self.diagnostic(Diagnostic::Initiating);

        let probe = self.config().probe_policy();
        let started = self.now();
        let mut attempts = 0;
        loop {
            self.diagnostic(Diagnostic::Probing);
            attempts += 1;
            let answer = self.compare(&AT, command_timeout(&AT), &[OK]);
            self.sleep(probe.interval);
            match answer {
                Ok(_) => break,
                Err(e) if e.is_unanswered() => {}
                Err(e) => return Err(e),
            }
            if !probe.allows(attempts, self.elapsed_since(started)) {
                self.diagnostic(Diagnostic::ProbeFailed);
                return Err(Error::NoResponse);
            }
        }

        self.diagnostic(Diagnostic::ConfiguringSms);
        let text_mode = SetMessageFormat {
            format: MessageFormat::Text,
        };
        let res = self.compare(&text_mode, command_timeout(&text_mode), &[OK]);
        Self::best_effort(res)?;

        // Read and delete from MT, write to SIM, receive into flash
        let storage = SetPreferredMessageStorage {
            mem1: "MT",
            mem2: "SM",
            mem3: "ME",
        };
        let res = self.compare(&storage, command_timeout(&storage), &[OK]);
        Self::best_effort(res)?;

        let purge = DeleteMessages {
            index: 0,
            flag: DeleteFlag::ReadAndSent,
        };
        let res = self.compare(&purge, command_timeout(&purge), &[OK]);
        Self::best_effort(res)?;

        self.wait_for_registration(registration)
    }

    /// Poll `AT+CREG?` until the module reports home or roaming
    /// registration, or `policy` runs out.
    pub fn wait_for_registration(&mut self, policy: RetryPolicy) -> Result<Status, Error> {
        let started = self.now();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let status = match self.compare(
                &GetNetworkRegistrationStatus,
                command_timeout(&GetNetworkRegistrationStatus),
                &[REGISTERED_HOME, REGISTERED_ROAMING],
            ) {
                Ok(1) => Some(Status::Home),
                Ok(_) => Some(Status::Roaming),
                Err(e) if e.is_unanswered() => None,
                Err(e) => return Err(e),
            };

            if let Some(status) = status {
                self.diagnostic(Diagnostic::Registered(status));
                return Ok(status);
            }

            if !policy.allows(attempts, self.elapsed_since(started)) {
                self.diagnostic(Diagnostic::RegistrationTimeout);
                return Ok(Status::None);
            }

            self.diagnostic(Diagnostic::CheckingRegistration);
            self.sleep(policy.interval);
        }
    }

    /// Single `AT` probe.
    pub fn is_alive(&mut self) -> Result<bool, Error> {
        match self.compare(&AT, command_timeout(&AT), &[OK]) {
            Ok(_) => Ok(true),
            Err(e) if e.is_unanswered() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Single `AT+CREG?` query, decoding the `<stat>` field.
    pub fn registration_status(&mut self) -> Result<Status, Error> {
        self.send_command(
            &GetNetworkRegistrationStatus,
            command_timeout(&GetNetworkRegistrationStatus),
        )?;
        parse_registration(self.response_bytes())
    }
}

/// `+CREG: <n>,<stat>[,<lac>,<ci>]` to the `<stat>` it carries.
fn parse_registration(response: &[u8]) -> Result<Status, Error> {
    let start = find(response, REGISTRATION_PREFIX.as_bytes())
        .ok_or(Error::MalformedResponse)?
        + REGISTRATION_PREFIX.len();

    let line = response[start..]
        .split(|b| *b == b'\r' || *b == b'\n')
        .next()
        .unwrap_or(&[]);

    let stat = line
        .split(|b| *b == b',')
        .nth(1)
        .and_then(|field| core::str::from_utf8(field).ok())
        .and_then(|field| field.trim().parse::<u8>().ok())
        .ok_or(Error::MalformedResponse)?;

    Ok(Status::from(stat))
}
