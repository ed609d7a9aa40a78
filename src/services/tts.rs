use embedded_io::{Read, ReadReady, Write};

use crate::{
    client::Client,
    command::tts::{types::TtsMode, Speak, StopSpeech, MAX_TEXT_LEN},
    diagnostics::DiagnosticSink,
    error::Error,
    Clock,
};

impl<T, C, S> Client<T, C, S>
where
    T: Read + ReadReady + Write,
    C: Clock,
    S: DiagnosticSink,
{
    /// Start reading `text` out loud. Does not wait for the module.
    ///
    /// `text` goes out verbatim inside quotes; a `"` in it ends the argument
    /// early on the module's side.
    pub fn speak(&mut self, text: &str) -> Result<(), Error> {
        if text.len() > MAX_TEXT_LEN {
            return Err(Error::Overflow);
        }
        self.send_immediate(&Speak {
            mode: TtsMode::Ascii,
            text,
        })
    }

    /// Stop the speech that is playing. Does not wait for the module.
    pub fn stop_speaking(&mut self) -> Result<(), Error> {
        self.send_immediate(&StopSpeech {
            mode: TtsMode::Stop,
        })
    }
}
