use core::future::pending;
use core::marker::PhantomData;

use embassy_futures::select::{select3, Either3};
use embassy_time::{Instant, Timer};
use embedded_io_async::{Read, Write};
use heapless::Vec;

use super::state::{Request, State};
use super::encode;
use crate::command::device_lock::GetCCID;
use crate::command::ip_transport_layer::{GetConnectionStatus, SocketReceive};
use crate::command::network_service::GetOperatorSelection;
use crate::config::{CellularConfig, CMD_BUF_SIZE, INGRESS_BUF_SIZE, SEND_CHUNK_SIZE};
use crate::engine::{CommandKind, FollowUp, Output};
use crate::error::{Error, GenericError};
use crate::ingress::Ingress;

const READ_BUF_SIZE: usize = 256;

/// Who is waiting for the active command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Control,
    /// Follow ups and fetches issued by the runner itself
    Internal,
}

struct Current {
    origin: Origin,
    payload: Option<Vec<u8, SEND_CHUNK_SIZE>>,
    deadline: Instant,
}

/// Background runner owning the serial link.
///
/// You must call `.run()` in a background task for the modem to operate.
pub struct Runner<'a, R, W, C> {
    state: &'a State,
    rx: R,
    tx: W,
    ingress: Ingress<INGRESS_BUF_SIZE>,
    current: Option<Current>,
    _config: PhantomData<C>,
}

impl<'a, R: Read, W: Write, C: CellularConfig> Runner<'a, R, W, C> {
    pub(crate) fn new(state: &'a State, rx: R, tx: W) -> Self {
        Self {
            state,
            rx,
            tx,
            ingress: Ingress::new(),
            current: None,
            _config: PhantomData,
        }
    }

    pub async fn run(&mut self) -> ! {
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if self.current.is_none() {
                self.housekeeping().await;
            }

            let state = self.state;
            let idle = self.current.is_none();
            let wake_at = self.wake_at();

            let requests = async {
                if idle {
                    state.requests.receive().await
                } else {
                    pending().await
                }
            };
            let timer = async {
                match wake_at {
                    Some(at) => Timer::at(at).await,
                    None => pending().await,
                }
            };

            match select3(self.rx.read(&mut buf), requests, timer).await {
                Either3::First(Ok(0)) => {}
                Either3::First(Ok(n)) => self.ingest(&buf[..n]).await,
                Either3::First(Err(_)) => warn!("Serial read failed"),
                Either3::Second(req) => self.start(req).await,
                Either3::Third(()) => self.check_deadline(),
            }
        }
    }

    /// When the loop must wake up without input: the deadline of the active
    /// command, or the next poll of a non-empty pending read ring.
    fn wake_at(&self) -> Option<Instant> {
        if let Some(current) = &self.current {
            return Some(current.deadline);
        }
        self.state
            .with_engine(|e| e.has_pending_reads())
            .then(|| Instant::now() + C::FETCH_POLL_INTERVAL)
    }

    /// Issue interpreter follow ups first, then the next fetch.
    async fn housekeeping(&mut self) {
        let follow_up = self.state.with_engine(|e| e.pop_follow_up());
        if let Some(follow_up) = follow_up {
            debug!("Follow up {:?}", follow_up);
            let (kind, cmd) = match follow_up {
                FollowUp::QueryOperator => (CommandKind::OperatorGet, encode(&GetOperatorSelection)),
                FollowUp::QuerySimInfo => (CommandKind::SimInfo, encode(&GetCCID)),
                FollowUp::QueryNetworkStatus => {
                    (CommandKind::ConnectionStatus, encode(&GetConnectionStatus))
                }
            };
            if let Ok(cmd) = cmd {
                if self.state.with_engine(|e| e.begin(kind)).is_ok() {
                    self.write_command(&cmd, Origin::Internal, None, C::COMMAND_TIMEOUT)
                        .await;
                }
            }
            return;
        }

        let Some(req) = self.state.with_engine(|e| e.next_fetch()) else {
            return;
        };
        trace!("Fetching {} bytes of connection {}", req.len, req.conn);
        match encode(&SocketReceive {
            conn_id: req.conn.wire(),
            max_bytes: req.len as u16,
        }) {
            Ok(cmd) => {
                self.write_command(&cmd, Origin::Internal, None, C::FETCH_TIMEOUT)
                    .await
            }
            Err(_) => self.state.with_engine(|e| e.abort()),
        }
    }

    async fn start(&mut self, req: Request) {
        if let Err(e) = self.state.with_engine(|e| e.begin(req.kind)) {
            self.state.response.signal(Err(e));
            return;
        }
        self.write_command(&req.cmd, Origin::Control, req.payload, req.timeout)
            .await;
    }

    async fn write_command(
        &mut self,
        cmd: &Vec<u8, CMD_BUF_SIZE>,
        origin: Origin,
        payload: Option<Vec<u8, SEND_CHUNK_SIZE>>,
        timeout: embassy_time::Duration,
    ) {
        trace!("Sending {:?}", crate::fmt::LossyStr(cmd));
        if self.write(cmd).await.is_err() {
            self.state.with_engine(|e| e.abort());
            if origin == Origin::Control {
                self.state.response.signal(Err(Error::Io));
            }
            return;
        }

        self.current = Some(Current {
            origin,
            payload,
            deadline: Instant::now() + timeout,
        });
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.tx.write_all(bytes).await.map_err(|_| Error::Io)?;
        self.tx.flush().await.map_err(|_| Error::Io)
    }

    async fn ingest(&mut self, bytes: &[u8]) {
        let state = self.state;
        let ingress = &mut self.ingress;
        let publisher = state.events.immediate_publisher();

        let (prompt, completion) = state.with_engine(|engine| {
            let prompt = ingress.feed(engine, bytes, |event| {
                debug!("Event {:?}", event);
                publisher.publish_immediate(event);
            });
            (prompt, engine.take_completion())
        });

        if prompt {
            let payload = self.current.as_mut().and_then(|c| c.payload.take());
            if let Some(payload) = payload {
                if self.write(&payload).await.is_err() {
                    warn!("Payload write failed");
                }
            }
        }

        if let Some(result) = completion {
            self.complete(result);
        }
    }

    fn complete(&mut self, result: Result<Output, Error>) {
        let Some(current) = self.current.take() else {
            return;
        };
        match current.origin {
            Origin::Control => self.state.response.signal(result),
            Origin::Internal => {
                if let Err(e) = result {
                    warn!("Internal command failed: {:?}", e);
                }
            }
        }
    }

    fn check_deadline(&mut self) {
        let timed_out = self
            .current
            .as_ref()
            .map(|c| Instant::now() >= c.deadline)
            .unwrap_or(false);
        if !timed_out {
            return;
        }

        warn!("Command timed out");
        self.state.with_engine(|e| e.abort());
        self.ingress.clear();
        if let Some(Current {
            origin: Origin::Control,
            ..
        }) = self.current.take()
        {
            self.state
                .response
                .signal(Err(Error::Generic(GenericError::Timeout)));
        }
    }
}
