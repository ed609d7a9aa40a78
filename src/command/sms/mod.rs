//! ### 4 - SMS commands
pub mod types;

use atat::{atat_derive::AtatCmd, AtatCmd};
use types::{DeleteFlag, MessageFormat};

use super::NoResponse;

/// Written by the module when it is ready to receive the message body
pub const PROMPT: &str = "> ";

/// Ctrl-Z, terminates the message body of `AT+CMGS`
pub const CTRL_Z: u8 = 0x1A;

/// Longest phone number accepted by [`SendMessage`]
pub const MAX_NUMBER_LEN: usize = 20;

/// Longest body accepted by [`SubmitMessage`], one single-part text message
pub const MAX_BODY_LEN: usize = 160;

/// 4.2.2 Select SMS message format +CMGF
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGF", NoResponse, timeout_ms = 1000)]
pub struct SetMessageFormat {
    #[at_arg(position = 0)]
    pub format: MessageFormat,
}

/// 4.2.5 Preferred message storage +CPMS
///
/// `mem1` is read from and deleted in, `mem2` is written to and sent from,
/// `mem3` receives new messages.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPMS", NoResponse, timeout_ms = 1000)]
pub struct SetPreferredMessageStorage<'a> {
    #[at_arg(position = 0, len = 2)]
    pub mem1: &'a str,
    #[at_arg(position = 1, len = 2)]
    pub mem2: &'a str,
    #[at_arg(position = 2, len = 2)]
    pub mem3: &'a str,
}

/// 4.2.3 Delete message +CMGD
///
/// Deletes the single message stored at `index`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGD", NoResponse, timeout_ms = 1000)]
pub struct DeleteMessage {
    #[at_arg(position = 0)]
    pub index: u16,
}

/// 4.2.3 Delete message +CMGD
///
/// `index` is ignored by the module; every message matching `flag` goes.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGD", NoResponse, timeout_ms = 1000)]
pub struct DeleteMessages {
    #[at_arg(position = 0)]
    pub index: u16,
    #[at_arg(position = 1)]
    pub flag: DeleteFlag,
}

/// 4.2.8 Read message +CMGR
///
/// In text mode the module answers with
/// `+CMGR: <stat>,<oa>,[<alpha>],<scts>` followed by the body on its own
/// line.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGR", NoResponse, timeout_ms = 1000)]
pub struct ReadMessage {
    #[at_arg(position = 0)]
    pub index: u16,
}

/// 4.2.9 Send message +CMGS
///
/// The module answers with [`PROMPT`], after which the body has to follow as
/// [`SubmitMessage`].
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGS", NoResponse, timeout_ms = 3000)]
pub struct SendMessage<'a> {
    #[at_arg(position = 0, len = 20)]
    pub number: &'a str,
}

/// Message body of `AT+CMGS`, terminated by [`CTRL_Z`] instead of a line
/// ending. Sending over the network can take a while.
#[derive(Clone)]
pub struct SubmitMessage<'a> {
    pub text: &'a str,
}

impl AtatCmd for SubmitMessage<'_> {
    type Response = NoResponse;

    const MAX_LEN: usize = MAX_BODY_LEN + 1;
    const MAX_TIMEOUT_MS: u32 = 20_000;

    fn write(&self, buf: &mut [u8]) -> usize {
        let text = self.text.as_bytes();
        let Some((terminator, body)) = buf
            .get_mut(..text.len() + 1)
            .and_then(|b| b.split_last_mut())
        else {
            return 0;
        };
        body.copy_from_slice(text);
        *terminator = CTRL_Z;
        text.len() + 1
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

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize<Cmd: AtatCmd>(cmd: &Cmd) -> std::vec::Vec<u8> {
        let mut buf = [0u8; 256];
        let len = cmd.write(&mut buf);
        buf[..len].to_vec()
    }

    #[test]
    fn serialize_text_mode() {
        let cmd = SetMessageFormat {
            format: MessageFormat::Text,
        };
        assert_eq!(serialize(&cmd), b"AT+CMGF=1\r\n");
    }

    #[test]
    fn serialize_storage() {
        let cmd = SetPreferredMessageStorage {
            mem1: "MT",
            mem2: "SM",
            mem3: "ME",
        };
        assert_eq!(serialize(&cmd), b"AT+CPMS=\"MT\",\"SM\",\"ME\"\r\n");
    }

    #[test]
    fn serialize_delete() {
        let purge = DeleteMessages {
            index: 0,
            flag: DeleteFlag::ReadAndSent,
        };
        assert_eq!(serialize(&purge), b"AT+CMGD=0,2\r\n");

        let single = DeleteMessage { index: 7 };
        assert_eq!(serialize(&single), b"AT+CMGD=7\r\n");
    }

    #[test]
    fn serialize_read_and_send() {
        assert_eq!(serialize(&ReadMessage { index: 3 }), b"AT+CMGR=3\r\n");
        assert_eq!(
            serialize(&SendMessage {
                number: "+15551234567"
            }),
            b"AT+CMGS=\"+15551234567\"\r\n"
        );
    }

    #[test]
    fn submit_is_terminated_by_ctrl_z() {
        assert_eq!(
            serialize(&SubmitMessage { text: "Dinner in 5" }),
            b"Dinner in 5\x1A"
        );
    }

    #[test]
    fn submit_does_not_overrun_short_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(SubmitMessage { text: "too long" }.write(&mut buf), 0);
    }
}
