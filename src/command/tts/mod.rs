//! ### 24 - TTS commands
pub mod types;

use atat::{atat_derive::AtatCmd, AtatCmd};
use types::TtsMode;

use super::NoResponse;

/// Longest text accepted by [`Speak`]
pub const MAX_TEXT_LEN: usize = 200;

/// 24.2.1 Text to speech +CTTS
///
/// The text is written between quotes as is. Embedded quote characters are
/// not escaped, so they end the argument early on the module's side.
#[derive(Clone)]
pub struct Speak<'a> {
    pub mode: TtsMode,
    pub text: &'a str,
}

impl AtatCmd for Speak<'_> {
    type Response = NoResponse;

    // AT+CTTS=<mode>,"<text>"\r\n
    const MAX_LEN: usize = 12 + MAX_TEXT_LEN + 3;

    fn write(&self, buf: &mut [u8]) -> usize {
        let mode = [b'0' + self.mode as u8];
        let parts: [&[u8]; 5] = [b"AT+CTTS=", &mode, b",\"", self.text.as_bytes(), b"\"\r\n"];

        let len: usize = parts.iter().map(|part| part.len()).sum();
        if len > buf.len() {
            return 0;
        }
        let mut at = 0;
        for part in parts {
            buf[at..at + part.len()].copy_from_slice(part);
            at += part.len();
        }
        len
    }

    fn parse(
        &self,
        resp: Result<&[u8], atat::InternalError>,
    ) -> Result<Self::Response, atat::Error> {
        match resp {
            Ok(_) => Ok(NoResponse),
            Err(_) => Err(atat::Error::Parse),
        }
    }
}

/// 24.2.1 Text to speech +CTTS
///
/// Stops the speech that is playing.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CTTS", NoResponse)]
pub struct StopSpeech {
    #[at_arg(position = 0)]
    pub mode: TtsMode,
}
