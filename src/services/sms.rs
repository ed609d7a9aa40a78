use embedded_io::{Read, ReadReady, Write};
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::{
    client::{push_lossy, push_truncated, Client},
    command::{
        sms::{
            types::MessageFormat, DeleteMessage, ReadMessage, SendMessage, SetMessageFormat,
            SubmitMessage, MAX_BODY_LEN, MAX_NUMBER_LEN, PROMPT,
        },
        OK,
    },
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Error,
    fmt::LossyStr,
    module_timing::command_timeout,
    Clock,
};

/// Label of the metadata line in the `AT+CMGR` response
const READ_LABEL: &str = "+CMGR: ";

/// Text message as read from modem storage.
///
/// Construct it empty and let [`Client::read_sms`] fill it in. The timestamp
/// is kept in the modem's own `yy/MM/dd,hh:mm:ss±zz` format.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sms {
    pub number: String<30>,
    pub message: String<200>,
    pub timestamp: String<32>,
}

impl Sms {
    pub fn clear(&mut self) {
        self.number.clear();
        self.message.clear();
        self.timestamp.clear();
    }
}

impl<T, C, S> Client<T, C, S>
where
    T: Read + ReadReady + Write,
    C: Clock,
    S: DiagnosticSink,
{
    /// Send `message` to `number` in text mode.
    ///
    /// The body is only written once the module answered `AT+CMGS` with its
    /// `"> "` prompt. Without the prompt this returns [`Error::NoPrompt`] and
    /// nothing but the `AT+CMGS` line has gone out.
    pub fn send_sms(&mut self, number: &str, message: &str) -> Result<(), Error> {
        if number.len() > MAX_NUMBER_LEN || message.len() > MAX_BODY_LEN {
            return Err(Error::Overflow);
        }
        if number.contains('"') || message.as_bytes().contains(&0x1A) {
            return Err(Error::InvalidArgument);
        }

        let text_mode = SetMessageFormat {
            format: MessageFormat::Text,
        };
        let res = self.compare(&text_mode, command_timeout(&text_mode), &[OK]);
        Self::best_effort(res)?;

        let send = SendMessage { number };
        match self.compare(&send, command_timeout(&send), &[PROMPT]) {
            Ok(_) => {}
            Err(e) if e.is_unanswered() => {
                self.diagnostic(Diagnostic::SmsPromptMissing);
                return Err(Error::NoPrompt);
            }
            Err(e) => return Err(e),
        }

        let submit = SubmitMessage { text: message };
        self.send_command(&submit, command_timeout(&submit))
    }

    /// Read the message stored at `index` into `sms`.
    ///
    /// The message stays in storage, see [`Client::delete_sms`]. On error
    /// `sms` is left empty.
    pub fn read_sms(&mut self, index: u16, sms: &mut Sms) -> Result<(), Error> {
        sms.clear();

        let read = ReadMessage { index };
        self.send_command(&read, command_timeout(&read))?;

        let parsed = parse_message(self.response_bytes(), sms);
        if parsed.is_err() {
            warn!("Unexpected +CMGR response: {:?}", LossyStr(self.response_bytes()));
            sms.clear();
        }
        parsed
    }

    /// Delete the message stored at `index`.
    pub fn delete_sms(&mut self, index: u16) -> Result<(), Error> {
        let delete = DeleteMessage { index };
        self.compare(&delete, command_timeout(&delete), &[OK])
            .map(|_| ())
    }
}

/// Text mode `AT+CMGR` response into `sms`:
///
/// ```text
/// AT+CMGR=3
/// +CMGR: "REC UNREAD","+15551234567","","23/05/01,12:00:00-04"
/// Dinner is ready
///
/// OK
/// ```
///
/// The alpha field is optional, the timestamp is always the last field.
fn parse_message(response: &[u8], sms: &mut Sms) -> Result<(), Error> {
    let mut lines = response.split(|b| *b == b'\n').map(trim_cr);

    let metadata = lines
        .by_ref()
        .find_map(|line| line.strip_prefix(READ_LABEL.as_bytes()))
        .ok_or(Error::MalformedResponse)?;
    let body = lines.next().ok_or(Error::MalformedResponse)?;

    let metadata = core::str::from_utf8(metadata).map_err(|_| Error::MalformedResponse)?;
    let fields = split_fields(metadata)?;
    let (number, timestamp) = match fields.as_slice() {
        [_status, number, timestamp] => (number, timestamp),
        [_status, number, _alpha, timestamp, ..] => (number, timestamp),
        _ => return Err(Error::MalformedResponse),
    };

    push_truncated(&mut sms.number, unquote(number)?);
    push_truncated(&mut sms.timestamp, unquote(timestamp)?);
    // The body is in the modem's character set, which need not be UTF-8
    push_lossy(&mut sms.message, body);
    Ok(())
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Comma separated fields, commas inside quotes do not split.
fn split_fields(line: &str) -> Result<Vec<&str, 12>, Error> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                fields
                    .push(&line[start..i])
                    .map_err(|_| Error::MalformedResponse)?;
                start = i + 1;
            }
            _ => {}
        }
    }
    if quoted {
        return Err(Error::MalformedResponse);
    }
    fields
        .push(&line[start..])
        .map_err(|_| Error::MalformedResponse)?;
    Ok(fields)
}

fn unquote(field: &str) -> Result<&str, Error> {
    field
        .trim()
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .ok_or(Error::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{client_with, MockClock, MockTransport};

    const CMGR_RESPONSE: &[u8] = b"AT+CMGR=3\r\r\n\
        +CMGR: \"REC UNREAD\",\"+15551234567\",\"\",\"23/05/01,12:00:00-04\"\r\n\
        Dinner is ready\r\n\
        \r\n\
        OK\r\n";

    #[test]
    fn send_waits_for_prompt_before_body() {
        let mut transport = MockTransport::new();
        transport.reply(b"OK\r\n");
        transport.reply(b"AT+CMGS=\"+15551234567\"\r\r\n> ");
        transport.reply(b"\r\n+CMGS: 12\r\n\r\nOK\r\n");

        let mut client = client_with(transport, MockClock::new());
        assert_eq!(client.send_sms("+15551234567", "Dinner is ready"), Ok(()));

        let transport = client.release();
        assert_eq!(
            transport.sent(),
            [
                &b"AT+CMGF=1\r\n"[..],
                b"AT+CMGS=\"+15551234567\"\r\n",
                b"Dinner is ready\x1A",
            ]
        );
    }

    #[test]
    fn send_without_prompt_never_writes_body() {
        let mut transport = MockTransport::new();
        transport.reply(b"OK\r\n");
        transport.reply(b"\r\nERROR\r\n");

        let mut client = client_with(transport, MockClock::new());
        assert_eq!(
            client.send_sms("+15551234567", "Dinner is ready"),
            Err(Error::NoPrompt)
        );
        assert_eq!(
            client.sink().events.last(),
            Some(&Diagnostic::SmsPromptMissing)
        );

        let transport = client.release();
        assert_eq!(transport.sent().len(), 2);
        assert!(transport
            .sent()
            .iter()
            .all(|line| !line.ends_with(b"Dinner is ready\x1A")));
    }

    #[test]
    fn send_with_silent_module_never_writes_body() {
        let mut client = client_with(MockTransport::new(), MockClock::new());
        assert_eq!(client.send_sms("5551234", "hi"), Err(Error::NoPrompt));
        assert_eq!(client.release().sent().len(), 2);
    }

    #[test]
    fn send_rejects_bad_arguments_without_io() {
        let mut client = client_with(MockTransport::new(), MockClock::new());

        assert_eq!(
            client.send_sms("+155512345678901234567", "hi"),
            Err(Error::Overflow)
        );
        assert_eq!(client.send_sms("555\"", "hi"), Err(Error::InvalidArgument));

        let long = [b'x'; MAX_BODY_LEN + 1];
        let long = core::str::from_utf8(&long).unwrap();
        assert_eq!(client.send_sms("5551234", long), Err(Error::Overflow));

        assert!(client.release().sent().is_empty());
    }

    #[test]
    fn read_splits_metadata_and_body() {
        let mut transport = MockTransport::new();
        transport.reply(CMGR_RESPONSE);

        let mut client = client_with(transport, MockClock::new());
        let mut sms = Sms::default();
        assert_eq!(client.read_sms(3, &mut sms), Ok(()));

        assert_eq!(sms.number, "+15551234567");
        assert_eq!(sms.timestamp, "23/05/01,12:00:00-04");
        assert_eq!(sms.message, "Dinner is ready");
        assert_eq!(client.release().sent(), [b"AT+CMGR=3\r\n"]);
    }

    #[test]
    fn read_keeps_metadata_of_non_utf8_body() {
        let mut transport = MockTransport::new();
        transport.reply(
            b"AT+CMGR=3\r\r\n\
            +CMGR: \"REC UNREAD\",\"+15551234567\",\"\",\"23/05/01,12:00:00-04\"\r\n\
            Caf\xe9 at 5\r\n\
            \r\n\
            OK\r\n",
        );

        let mut client = client_with(transport, MockClock::new());
        let mut sms = Sms::default();
        assert_eq!(client.read_sms(3, &mut sms), Ok(()));

        assert_eq!(sms.number, "+15551234567");
        assert_eq!(sms.timestamp, "23/05/01,12:00:00-04");
        assert_eq!(sms.message, "Caf at 5");
    }

    #[test]
    fn read_without_alpha_field() {
        let mut sms = Sms::default();
        let response = b"AT+CMGR=1\r\r\n\
            +CMGR: \"REC READ\",\"15551234567\",\"23/05/01,12:00:00-04\"\r\n\
            hello\r\n";

        assert_eq!(parse_message(response, &mut sms), Ok(()));
        assert_eq!(sms.number, "15551234567");
        assert_eq!(sms.timestamp, "23/05/01,12:00:00-04");
        assert_eq!(sms.message, "hello");
    }

    #[test]
    fn read_rejects_malformed_metadata() {
        let mut transport = MockTransport::new();
        transport.reply(b"AT+CMGR=4\r\r\n+CMGR: \"REC READ\"\r\nbody\r\n");
        transport.reply(b"AT+CMGR=4\r\r\nOK\r\n");

        let mut client = client_with(transport, MockClock::new());
        let mut sms = Sms::default();
        sms.message.push_str("stale").unwrap();

        assert_eq!(client.read_sms(4, &mut sms), Err(Error::MalformedResponse));
        assert_eq!(sms, Sms::default());

        assert_eq!(client.read_sms(4, &mut sms), Err(Error::MalformedResponse));
    }

    #[test]
    fn read_without_response_fails() {
        let mut client = client_with(MockTransport::new(), MockClock::new());
        let mut sms = Sms::default();

        assert_eq!(client.read_sms(1, &mut sms), Err(Error::NoResponse));
    }

    #[test]
    fn long_body_is_truncated() {
        let mut sms = Sms::default();
        let mut response = std::vec::Vec::from(&b"+CMGR: \"REC READ\",\"1\",\"\",\"t\"\r\n"[..]);
        response.extend_from_slice(&[b'y'; 240]);

        assert_eq!(parse_message(&response, &mut sms), Ok(()));
        assert_eq!(sms.message.len(), 200);
    }

    #[test]
    fn delete_by_index() {
        let mut transport = MockTransport::new();
        transport.reply(b"AT+CMGD=7\r\r\nOK\r\n");
        transport.reply(b"AT+CMGD=8\r\r\n+CMS ERROR: 321\r\n");

        let mut client = client_with(transport, MockClock::new());
        assert_eq!(client.delete_sms(7), Ok(()));
        assert_eq!(client.delete_sms(8), Err(Error::NoMatch));
    }
}
