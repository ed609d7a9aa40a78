//! Argument and parameter types used by GPS Commands
use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssSession {
    Off = 0,
    On = 1,
}

/// Positioning mode of a GPS session
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GnssMode {
    /// 1: standalone mode
    Standalone = 1,
    /// 2: UE-based mode
    UeBased = 2,
    /// 3: UE-assisted mode
    UeAssisted = 3,
}
