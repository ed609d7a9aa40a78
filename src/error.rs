#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The modem produced nothing within the command timeout
    NoResponse,
    /// A response arrived, but none of the expected tokens were in it
    NoMatch,
    /// `AT+CMGS` never answered with the `"> "` prompt, so no body was sent
    NoPrompt,
    /// The response did not have the field layout the parser expects
    MalformedResponse,
    /// Argument or command does not fit the bounded command buffer
    Overflow,
    /// Argument contains characters that would break the command framing
    InvalidArgument,

    Io(embedded_io::ErrorKind),
}

impl Error {
    pub(crate) fn io<E: embedded_io::Error>(e: E) -> Self {
        Self::Io(e.kind())
    }

    /// Both "nothing came back" and "something unexpected came back".
    ///
    /// Steps whose outcome the caller does not act on only abort on the
    /// remaining (transport) errors.
    pub fn is_unanswered(&self) -> bool {
        matches!(self, Self::NoResponse | Self::NoMatch)
    }
}
