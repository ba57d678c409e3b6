//! Splits the modem byte stream into response lines for the [`Engine`].
//!
//! Besides plain lines the ingress has to deal with three things that are not
//! line shaped: payload bytes announced by `+SQNSRECV`/`+IPD`, the `> `
//! prompt of commands that take a payload, and the `+COPS=?` result, which
//! can be longer than any line buffer and is streamed byte by byte.

use atat::{DigestResult, Digester};
use heapless::Vec;

use crate::engine::{Engine, Event};
use crate::fmt::LossyStr;

pub struct Ingress<const N: usize> {
    buf: Vec<u8, N>,
    digester: LineDigester,
    /// Dropping an overlong line up to its terminator
    discarding: bool,
    /// Inside a streamed `+COPS:` line
    streaming: bool,
    /// The last line ended on `\r`, a following `\n` belongs to it
    skip_lf: bool,
}

impl<const N: usize> Default for Ingress<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Ingress<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            digester: LineDigester {
                expect_prompt: false,
            },
            discarding: false,
            streaming: false,
            skip_lf: false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Push received bytes through the engine. Events are handed to
    /// `on_event` in the order their lines arrived.
    ///
    /// Returns `true` if the payload prompt of the active command was seen.
    pub fn feed(&mut self, engine: &mut Engine, bytes: &[u8], mut on_event: impl FnMut(Event)) -> bool {
        let mut prompt = false;
        let mut i = 0;

        while i < bytes.len() {
            if core::mem::take(&mut self.skip_lf) && bytes[i] == b'\n' {
                i += 1;
                continue;
            }

            if engine.payload_remaining() > 0 {
                i += engine.process_payload(&bytes[i..]);
                continue;
            }

            let c = bytes[i];
            i += 1;

            if self.streaming {
                if matches!(c, b'\r' | b'\n') {
                    self.streaming = false;
                    self.skip_lf = c == b'\r';
                } else {
                    engine.feed_cops_scan(c);
                }
                continue;
            }

            if self.discarding {
                if c == b'\n' {
                    self.discarding = false;
                }
                continue;
            }

            // Assembled ahead of the digester so a `+COPS:` scan can switch
            // to streaming before the line buffer fills up.
            if self.buf.push(c).is_err() {
                warn!("Line too long, discarding {:?}", LossyStr(&self.buf));
                self.buf.clear();
                self.discarding = c != b'\n';
                continue;
            }
            if c == b':' && &self.buf[..] == b"+COPS:" && engine.is_scanning() {
                self.buf.clear();
                self.streaming = true;
                continue;
            }

            self.digester.expect_prompt = engine.expects_prompt();
            let (result, used) = self.digester.digest(&self.buf);
            match result {
                DigestResult::Urc(line) | DigestResult::Response(Ok(line)) => {
                    trace!("Line {:?}", LossyStr(line));
                    if let Some(event) = engine.process_line(line) {
                        on_event(event);
                    }
                }
                DigestResult::Prompt(_) => {
                    trace!("Prompt");
                    prompt = true;
                }
                DigestResult::Response(Err(_)) | DigestResult::None => {}
            }
            if used > 0 {
                self.skip_lf = c == b'\r' && used == self.buf.len();
                self.consume(used);
            }
        }

        prompt
    }

    fn consume(&mut self, used: usize) {
        let rest = self.buf.len() - used;
        self.buf.copy_within(used.., 0);
        self.buf.truncate(rest);
    }
}

/// Frames the assembled bytes into lines, the `> ` prompt and the headers of
/// `+IPD`/`+RECEIVE` payloads, which end on their colon.
#[derive(Debug, Default)]
pub struct LineDigester {
    /// A lone `>` is the payload prompt instead of line content
    pub expect_prompt: bool,
}

impl Digester for LineDigester {
    fn digest<'a>(&mut self, buf: &'a [u8]) -> (DigestResult<'a>, usize) {
        let Some(&last) = buf.last() else {
            return (DigestResult::None, 0);
        };

        match last {
            b'\r' | b'\n' => {
                let line = &buf[..buf.len() - 1];
                if line.is_empty() {
                    (DigestResult::None, buf.len())
                } else {
                    (DigestResult::Urc(line), buf.len())
                }
            }
            b'>' if buf.len() == 1 && self.expect_prompt => (DigestResult::Prompt(last), 1),
            b' ' if buf.len() == 1 => (DigestResult::None, 1),
            b':' if buf.starts_with(b"+IPD,") || buf.starts_with(b"+RECEIVE,") => {
                (DigestResult::Urc(buf), buf.len())
            }
            _ => (DigestResult::None, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::network_service::types::OperatorStatus;
    use crate::config::DefaultConfig;
    use crate::engine::{CommandKind, Output};
    use crate::socket::ConnId;

    fn setup() -> (Engine, Ingress<128>) {
        (Engine::new::<DefaultConfig>(), Ingress::new())
    }

    fn feed_all(ingress: &mut Ingress<128>, engine: &mut Engine, bytes: &[u8]) -> std::vec::Vec<Event> {
        let mut events = std::vec::Vec::new();
        ingress.feed(engine, bytes, |e| events.push(e));
        events
    }

    #[test]
    fn digester_frames() {
        let mut digester = LineDigester::default();
        assert_eq!(digester.digest(b"+CSQ: 1"), (DigestResult::None, 0));
        assert_eq!(digester.digest(b"+CSQ: 1\r"), (DigestResult::Urc(b"+CSQ: 1"), 8));
        assert_eq!(digester.digest(b"\n"), (DigestResult::None, 1));
        assert_eq!(digester.digest(b"+IPD,1,4:"), (DigestResult::Urc(b"+IPD,1,4:"), 9));
        assert_eq!(digester.digest(b">"), (DigestResult::None, 0));

        digester.expect_prompt = true;
        assert_eq!(digester.digest(b">"), (DigestResult::Prompt(b'>'), 1));
    }

    #[test]
    fn lines_split_across_feeds() {
        let (mut engine, mut ingress) = setup();
        assert!(feed_all(&mut ingress, &mut engine, b"\r\n+CSQ: 2").is_empty());
        assert_eq!(
            feed_all(&mut ingress, &mut engine, b"0,99\r\n+CREG: 5\r\n"),
            [
                Event::SignalStrength(-73),
                Event::NetworkRegChanged(crate::registration::RegistrationStatus::Roaming)
            ]
        );
    }

    #[test]
    fn hex_fetch_through_ingress() {
        let (mut engine, mut ingress) = setup();
        feed_all(&mut ingress, &mut engine, b"\r\n+SQNSRING: 1,3\r\n");
        let req = engine.next_fetch().unwrap();
        assert_eq!(req.len, 3);

        feed_all(&mut ingress, &mut engine, b"\r\n+SQNSRECV: 1,3\r\n61");
        feed_all(&mut ingress, &mut engine, b"6263\r\n\r\nOK\r\n");
        assert_eq!(engine.take_completion(), Some(Ok(Output::Received(3))));

        let mut out = [0u8; 8];
        let conn = ConnId::new(0).unwrap();
        assert_eq!(engine.read(conn, &mut out), 3);
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn ipd_payload_without_line_break() {
        let (mut engine, mut ingress) = setup();
        feed_all(&mut ingress, &mut engine, b"\r\n+IPD,1,4:OK\r\n\r\n+CSQ: 31,0\r\n");

        let mut out = [0u8; 8];
        assert_eq!(engine.read(ConnId::new(1).unwrap(), &mut out), 4);
        assert_eq!(&out[..4], b"OK\r\n");
        assert_eq!(engine.network().rssi, -51);
    }

    #[test]
    fn ipd_payload_for_unknown_connection_is_skipped() {
        let (mut engine, mut ingress) = setup();
        engine.begin(CommandKind::Generic).unwrap();
        feed_all(&mut ingress, &mut engine, b"\r\n+IPD,7,4:OK\r\n");
        assert_eq!(engine.take_completion(), None);

        feed_all(&mut ingress, &mut engine, b"\r\nOK\r\n");
        assert_eq!(engine.take_completion(), Some(Ok(Output::None)));
    }

    #[test]
    fn prompt_only_when_expected() {
        let (mut engine, mut ingress) = setup();
        assert!(!ingress.feed(&mut engine, b"> ", |_| {}));

        ingress.clear();
        engine
            .begin(CommandKind::SocketSend(ConnId::new(0).unwrap()))
            .unwrap();
        assert!(ingress.feed(&mut engine, b"\r\n> ", |_| {}));
        ingress.feed(&mut engine, b"\r\nOK\r\n", |_| {});
        assert_eq!(engine.take_completion(), Some(Ok(Output::None)));
    }

    #[test]
    fn operator_scan_is_streamed() {
        let (mut engine, mut ingress) = setup();
        engine.begin(CommandKind::OperatorScan).unwrap();

        // Longer than the line buffer
        let mut line = std::vec::Vec::new();
        line.extend_from_slice(b"\r\n+COPS: ");
        for _ in 0..4 {
            line.extend_from_slice(b"(2,\"Operator Long Name\",\"OpLN\",24001),");
        }
        line.extend_from_slice(b",(0-4),(0-2)\r\n\r\nOK\r\n");
        feed_all(&mut ingress, &mut engine, &line);

        let Some(Ok(Output::Operators(ops))) = engine.take_completion() else {
            panic!("no scan result");
        };
        assert_eq!(ops.len(), 4);
        assert!(ops.iter().all(|op| op.status == OperatorStatus::Current));
        assert_eq!(ops[3].long_name.as_str(), "Operator Long Name");
        assert_eq!(ops[3].numeric, 24001);
    }

    #[test]
    fn overlong_line_is_dropped() {
        let mut engine = Engine::new::<DefaultConfig>();
        let mut ingress: Ingress<8> = Ingress::new();
        let mut events = std::vec::Vec::new();
        ingress.feed(&mut engine, b"+CSQ: 10,99 and more\r\n+CSQ: 0\r\n", |e| {
            events.push(e)
        });
        assert_eq!(events, [Event::SignalStrength(-113)]);
    }
}
