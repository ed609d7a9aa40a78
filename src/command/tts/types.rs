//! Argument and parameter types used by TTS Commands
use atat::atat_derive::AtatEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TtsMode {
    /// 0: stop playing
    Stop = 0,
    /// 1: text is UCS2 coded
    Ucs2 = 1,
    /// 2: text is ASCII coded for English, GBK for Chinese
    Ascii = 2,
}
