pub mod control;
pub mod runner;
pub mod state;

use atat::AtatCmd;
use embedded_io_async::{Read, Write};
use heapless::Vec;

use crate::config::{CellularConfig, CMD_BUF_SIZE};
use crate::error::Error;

pub use self::control::{Control, EventSubscriber};
pub use self::runner::Runner;
pub use self::state::State;

/// Format `cmd` into the bytes written to the modem.
pub(crate) fn encode<Cmd: AtatCmd>(cmd: &Cmd) -> Result<Vec<u8, CMD_BUF_SIZE>, Error> {
    if Cmd::MAX_LEN > CMD_BUF_SIZE {
        return Err(Error::Overflow);
    }
    let mut buf = Vec::new();
    buf.resize(Cmd::MAX_LEN, 0).map_err(|_| Error::Overflow)?;
    let len = cmd.write(&mut buf);
    buf.truncate(len);
    Ok(buf)
}

/// Split the serial link into a [`Control`] handle and the [`Runner`] that
/// must be polled in a background task.
pub fn new<'a, R: Read, W: Write, C: CellularConfig>(
    state: &'a State,
    rx: R,
    tx: W,
    _config: C,
) -> (Control<'a>, Runner<'a, R, W, C>) {
    (Control::new(state), Runner::new(state, rx, tx))
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use core::convert::Infallible;
    use std::collections::VecDeque;

    use embassy_futures::block_on;
    use embassy_futures::select::{select, Either};
    use embassy_time::{Duration, Timer};
    use embedded_io_async::ErrorType;
    use no_std_net::{Ipv4Addr, SocketAddrV4};

    use super::*;
    use crate::command::ip_transport_layer::types::{DialOptions, TransmissionProtocol};
    use crate::command::network_service::GetSignalQuality;
    use crate::config::DefaultConfig;
    use crate::engine::Event;
    use crate::error::GenericError;
    use crate::registration::RegistrationStatus;
    use crate::socket::ConnId;

    /// Serial link answering each write with the next scripted reply.
    #[derive(Default)]
    struct Modem {
        replies: VecDeque<&'static [u8]>,
        rx: VecDeque<u8>,
        written: std::vec::Vec<u8>,
    }

    struct Rx<'a>(&'a RefCell<Modem>);
    struct Tx<'a>(&'a RefCell<Modem>);

    impl ErrorType for Rx<'_> {
        type Error = Infallible;
    }

    impl ErrorType for Tx<'_> {
        type Error = Infallible;
    }

    impl Read for Rx<'_> {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            loop {
                {
                    let mut modem = self.0.borrow_mut();
                    if !modem.rx.is_empty() {
                        let n = buf.len().min(modem.rx.len());
                        for b in buf[..n].iter_mut() {
                            *b = modem.rx.pop_front().unwrap();
                        }
                        return Ok(n);
                    }
                }
                Timer::after(Duration::from_millis(1)).await;
            }
        }
    }

    impl Write for Tx<'_> {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            let mut modem = self.0.borrow_mut();
            modem.written.extend_from_slice(buf);
            if let Some(reply) = modem.replies.pop_front() {
                modem.rx.extend(reply.iter());
            }
            Ok(buf.len())
        }
    }

    fn modem(replies: &[&'static [u8]]) -> RefCell<Modem> {
        crate::test_helpers::init_logging();
        RefCell::new(Modem {
            replies: replies.iter().copied().collect(),
            ..Default::default()
        })
    }

    #[test]
    fn encode_adds_prefix_and_terminator() {
        let cmd = encode(&GetSignalQuality).unwrap();
        assert_eq!(&cmd[..], b"AT+CSQ\r\n");
    }

    #[test]
    fn query_through_runner() {
        let link = modem(&[b"\r\n+CSQ: 20,99\r\n\r\nOK\r\n"]);
        let state = State::new::<DefaultConfig>();
        let (control, mut runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);

        let rssi = block_on(async {
            match select(runner.run(), control.signal_quality()).await {
                Either::First(_) => unreachable!(),
                Either::Second(res) => res,
            }
        });
        assert_eq!(rssi, Ok(-73));
        assert_eq!(link.borrow().written, b"AT+CSQ\r\n");
    }

    #[test]
    fn payload_follows_prompt() {
        let link = modem(&[
            b"\r\nOK\r\n",
            b"\r\nOK\r\n",
            b"\r\n> ",
            b"\r\nOK\r\n",
        ]);
        let state = State::new::<DefaultConfig>();
        let (control, mut runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);
        let conn = ConnId::new(0).unwrap();

        let sent = block_on(async {
            let exchange = async {
                control
                    .open(
                        conn,
                        TransmissionProtocol::Tcp,
                        SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 80),
                        DialOptions::default(),
                    )
                    .await?;
                control.send(conn, b"hello").await
            };
            match select(runner.run(), exchange).await {
                Either::First(_) => unreachable!(),
                Either::Second(res) => res,
            }
        });

        assert_eq!(sent, Ok(5));
        assert!(link.borrow().written.ends_with(b"\r\nhello"));
    }

    #[test]
    fn send_requires_active_connection() {
        let state = State::new::<DefaultConfig>();
        let link = modem(&[]);
        let (control, _runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);
        let res = block_on(control.send(ConnId::new(2).unwrap(), b"x"));
        assert_eq!(res, Err(Error::ConnectionNotActive));
    }

    #[test]
    fn unanswered_command_times_out() {
        let link = modem(&[]);
        let state = State::new::<DefaultConfig>();
        let (control, mut runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);

        let res = block_on(async {
            match select(runner.run(), control.send_command(&crate::command::AT)).await {
                Either::First(_) => unreachable!(),
                Either::Second(res) => res,
            }
        });
        assert_eq!(res, Err(Error::Generic(GenericError::Timeout)));
    }

    #[test]
    fn announced_data_is_fetched_in_the_background() {
        let link = modem(&[
            b"\r\nOK\r\n\r\n+SQNSRING: 1,3\r\n",
            b"\r\n+SQNSRECV: 1,3\r\n616263\r\n\r\nOK\r\n",
        ]);
        let state = State::new::<DefaultConfig>();
        let (control, mut runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);
        let conn = ConnId::new(0).unwrap();

        let mut buf = [0u8; 8];
        let n = block_on(async {
            let exchange = async {
                control.send_command(&crate::command::AT).await.unwrap();
                while control.pending(conn) < 3 {
                    Timer::after(Duration::from_millis(1)).await;
                }
                control.read(conn, &mut buf)
            };
            match select(runner.run(), exchange).await {
                Either::First(_) => unreachable!(),
                Either::Second(n) => n,
            }
        });

        assert_eq!(&buf[..n], b"abc");
        assert_eq!(link.borrow().written, b"AT\r\nAT+SQNSRECV=1,3\r\n");
        assert!(!state.with_engine(|e| e.has_pending_reads()));
    }

    #[test]
    fn follow_ups_are_sent_after_the_command() {
        let link = modem(&[
            b"\r\n+CREG: 1\r\n+CPIN: READY\r\n\r\nOK\r\n",
            b"\r\n+COPS: 0,0,\"Operator\"\r\n\r\nOK\r\n",
            b"\r\n+CCID: 8944500102198304826\r\n\r\nOK\r\n",
        ]);
        let state = State::new::<DefaultConfig>();
        let (control, mut runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);

        block_on(async {
            let exchange = async {
                control.send_command(&crate::command::AT).await.unwrap();
                while state.with_engine(|e| e.sim().iccid.is_empty()) {
                    Timer::after(Duration::from_millis(1)).await;
                }
            };
            match select(runner.run(), exchange).await {
                Either::First(_) => unreachable!(),
                Either::Second(()) => {}
            }
        });

        assert_eq!(link.borrow().written, b"AT\r\nAT+COPS?\r\nAT+CCID\r\n");
        assert_eq!(
            state.with_engine(|e| e.sim().iccid.clone()).as_str(),
            "8944500102198304826"
        );
    }

    #[test]
    fn unsolicited_lines_are_published() {
        let link = modem(&[b"\r\n+CREG: 1\r\n\r\nOK\r\n"]);
        let state = State::new::<DefaultConfig>();
        let (control, mut runner) = new(&state, Rx(&link), Tx(&link), DefaultConfig);
        let mut events = control.subscribe_events().unwrap();

        block_on(async {
            match select(runner.run(), control.send_command(&crate::command::AT)).await {
                Either::First(_) => unreachable!(),
                Either::Second(res) => res.unwrap(),
            }
        });
        assert_eq!(
            events.try_next_message_pure(),
            Some(Event::NetworkRegChanged(RegistrationStatus::Home))
        );
    }
}
