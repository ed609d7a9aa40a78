//! Argument and parameter types used by SMS Commands and Responses
use atat::atat_derive::AtatEnum;

/// Input and output format of messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageFormat {
    /// 0 (default): PDU mode
    Pdu = 0,
    /// 1: text mode
    Text = 1,
}

/// Which stored messages `+CMGD` deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeleteFlag {
    /// 0: only the message at the given index
    Index = 0,
    /// 1: all read messages
    Read = 1,
    /// 2: all read and sent messages
    ReadAndSent = 2,
    /// 3: all read, sent and unsent messages
    ReadSentAndUnsent = 3,
    /// 4: every message in the storage
    All = 4,
}
