//! Response interpretation engine.
//!
//! The [`Engine`] owns every piece of modem state: registration, SIM,
//! operator, calls, message storage, the connection table, the receive flow
//! controller and its buffer pool. It is fed complete response lines and,
//! while a payload is due, raw payload bytes. It never blocks and never
//! performs I/O; the async runner decides what to send next by asking it for
//! follow up requests and fetches.

mod call;
mod connection;
mod flow;
mod network;
mod phonebook;
mod sim;
mod sms;

pub use connection::Connection;
pub use flow::{FetchRequest, FlowControl, PendingRead};

use heapless::{Deque, Vec};
use no_std_net::{Ipv4Addr, SocketAddrV4};

use crate::command::call_control::types::CallInfo;
use crate::command::device_lock::types::{SimInfo, SimState};
use crate::command::ip_transport_layer::types::TransmissionProtocol;
use crate::command::network_service::types::{Operator, ScannedOperator};
use crate::command::phonebook::types::PbEntry;
use crate::command::sms::types::SmsEntry;
use crate::command::types::{Memory, MemoryInfo};
use crate::config::{
    CellularConfig, MAX_CONNS, MAX_PB_ENTRIES, MAX_SCAN_RESULTS, MAX_SMS_ENTRIES, POOL_SLOTS,
    SLOT_CAPACITY,
};
use crate::error::{CommandError, Error};
use crate::fmt::LossyStr;
use crate::parser::cops_scan::CopsScan;
use crate::parser::cursor::Cursor;
use crate::registration::{NetworkState, RegistrationStatus};
use crate::socket::{BufferPool, ConnId};

pub type RxBuffers = BufferPool<MAX_CONNS, POOL_SLOTS, SLOT_CAPACITY>;

const FOLLOW_UP_CAPACITY: usize = 4;

/// Notification raised by an interpreter. At most one per processed line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    NetworkRegChanged(RegistrationStatus),
    /// Signal strength in dBm, `0` when unknown
    SignalStrength(i16),
    SimStateChanged(SimState),
    NetworkAttached,
    NetworkDetached,
    CallChanged(CallInfo),
    SmsReceived { mem: Memory, pos: usize },
    ConnectionClosed { conn: ConnId, forced: bool },
}

/// Which form of a storage command is active: `=?`, `?` or a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageQuery {
    Options,
    Current,
    Set,
}

/// The command whose responses are currently being interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Any command whose only meaningful response is the final result
    Generic,
    NetworkRegistration,
    SignalQuality,
    PinStatus,
    SimInfo,
    OperatorGet,
    OperatorScan,
    CallList,
    SmsSend,
    SmsRead { pos: usize },
    SmsList,
    SmsStorage(StorageQuery),
    PhonebookStorage(StorageQuery),
    PhonebookRead,
    PhonebookFind,
    ConnectionStatus,
    DnsLookup,
    SocketDial(ConnId),
    SocketSend(ConnId),
    SocketFetch(ConnId),
    SocketClose(ConnId),
}

impl CommandKind {
    /// Commands that are answered with a `>` prompt before their payload.
    pub fn expects_prompt(&self) -> bool {
        matches!(self, Self::SocketSend(_) | Self::SmsSend)
    }
}

/// Result data of a completed command.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Output {
    #[default]
    None,
    Registration(RegistrationStatus),
    SignalQuality(i16),
    PinStatus(SimState),
    Iccid(heapless::String<22>),
    Operator(Operator),
    Operators(Vec<ScannedOperator, MAX_SCAN_RESULTS>),
    Call(CallInfo),
    SmsReference(i32),
    Sms(SmsEntry),
    SmsList(Vec<SmsEntry, MAX_SMS_ENTRIES>),
    SmsStorage([MemoryInfo; 3]),
    PhonebookStorage(MemoryInfo),
    Phonebook(Vec<PbEntry, MAX_PB_ENTRIES>),
    Attached(bool),
    HostIp(Ipv4Addr),
    /// Bytes stored by a fetch
    Received(usize),
}

/// Refresh the runner should send on behalf of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FollowUp {
    QueryOperator,
    QuerySimInfo,
    QueryNetworkStatus,
}

pub struct Engine {
    pub(crate) network: NetworkState,
    pub(crate) sim: SimInfo,
    pub(crate) call: CallInfo,
    pub(crate) sms_storage: [MemoryInfo; 3],
    pub(crate) phonebook_storage: MemoryInfo,
    pub(crate) conns: [Connection; MAX_CONNS],
    pub(crate) flow: FlowControl,
    pub(crate) pool: RxBuffers,
    pub(crate) cops_scan: CopsScan,

    active: Option<CommandKind>,
    output: Output,
    completion: Option<Result<Output, Error>>,
    /// `+CMGR`/`+CMGL` header waiting for its text line
    sms_body: Option<SmsEntry>,
    /// Announced payload still being received
    payload: Option<flow::Payload>,
    follow_ups: Deque<FollowUp, FOLLOW_UP_CAPACITY>,
    hex_mode: bool,
}

impl Engine {
    pub fn new<C: CellularConfig>() -> Self {
        Self {
            network: NetworkState::default(),
            sim: SimInfo::default(),
            call: CallInfo::default(),
            sms_storage: [MemoryInfo::default(); 3],
            phonebook_storage: MemoryInfo::default(),
            conns: core::array::from_fn(|i| Connection::new(i as u8)),
            flow: FlowControl::new(C::FETCH_QUANTUM),
            pool: RxBuffers::new(),
            cops_scan: CopsScan::default(),
            active: None,
            output: Output::None,
            completion: None,
            sms_body: None,
            payload: None,
            follow_ups: Deque::new(),
            hex_mode: C::HEX_MODE,
        }
    }

    pub fn network(&self) -> &NetworkState {
        &self.network
    }

    pub fn sim(&self) -> &SimInfo {
        &self.sim
    }

    pub fn call(&self) -> &CallInfo {
        &self.call
    }

    pub fn connection(&self, conn: ConnId) -> &Connection {
        &self.conns[conn.index()]
    }

    pub fn active_command(&self) -> Option<CommandKind> {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Whether fetched payloads arrive hex encoded.
    pub fn hex_mode(&self) -> bool {
        self.hex_mode
    }

    /// Start interpreting responses for `kind`.
    pub fn begin(&mut self, kind: CommandKind) -> Result<(), Error> {
        if self.active.is_some() {
            return Err(Error::Busy);
        }

        self.output = match kind {
            CommandKind::OperatorScan => {
                self.cops_scan.reset();
                Output::Operators(Vec::new())
            }
            CommandKind::SmsList => Output::SmsList(Vec::new()),
            CommandKind::PhonebookRead | CommandKind::PhonebookFind => {
                Output::Phonebook(Vec::new())
            }
            _ => Output::None,
        };
        self.completion = None;
        self.active = Some(kind);
        Ok(())
    }

    /// Drop the active command, e.g. after a timeout.
    pub fn abort(&mut self) {
        if let Some(kind) = self.active.take() {
            debug!("Aborting {:?}", kind);
            if let CommandKind::SocketFetch(_) = kind {
                self.flow.retry();
            }
        }
        self.abort_payload();
        self.output = Output::None;
        self.sms_body = None;
    }

    pub fn take_completion(&mut self) -> Option<Result<Output, Error>> {
        self.completion.take()
    }

    pub fn pop_follow_up(&mut self) -> Option<FollowUp> {
        self.follow_ups.pop_front()
    }

    pub(crate) fn push_follow_up(&mut self, req: FollowUp) {
        if self.follow_ups.iter().any(|r| *r == req) {
            return;
        }
        if self.follow_ups.push_back(req).is_err() {
            warn!("Follow up queue full, dropping {:?}", req);
        }
    }

    /// Whether the next `>` on the link is the prompt for the active command.
    pub fn expects_prompt(&self) -> bool {
        self.active.map(|k| k.expects_prompt()).unwrap_or(false)
    }

    /// Whether the `+COPS:` line should be streamed to [`Engine::feed_cops_scan`].
    pub fn is_scanning(&self) -> bool {
        self.active == Some(CommandKind::OperatorScan)
    }

    /// Feed one byte of a streamed `+COPS=?` result, after the `+COPS:` prefix.
    pub fn feed_cops_scan(&mut self, c: u8) {
        if let Output::Operators(results) = &mut self.output {
            self.cops_scan.feed(c, results);
        }
    }

    /// Record where a connection is being dialled to. The connection becomes
    /// active once the dial command completes. Bytes left over from an
    /// earlier session on the same id are discarded.
    pub fn prepare_dial(&mut self, conn: ConnId, protocol: TransmissionProtocol, remote: SocketAddrV4) {
        if self.payload.as_ref().and_then(|p| p.conn()) == Some(conn) {
            self.abort_payload();
        }
        let stale = self.pool.pending(conn);
        if stale > 0 {
            debug!("Discarding {} unread bytes of connection {}", stale, conn);
        }
        self.pool.clear(conn);

        let c = &mut self.conns[conn.index()];
        c.protocol = protocol;
        c.remote_ip = *remote.ip();
        c.remote_port = remote.port();
    }

    /// Interpret one response line. Trailing line terminators are ignored.
    pub fn process_line(&mut self, line: &[u8]) -> Option<Event> {
        let line = trim_line(line);
        if line.is_empty() {
            return None;
        }

        if let Some(entry) = self.sms_body.take() {
            if line != b"OK" {
                self.store_sms_body(entry, line);
                return None;
            }
            self.store_sms_entry(entry);
        }

        if let Some(result) = final_result(line) {
            return self.finish(result);
        }

        let active = self.active;
        let is = |kind: CommandKind| active == Some(kind);

        if line.starts_with(b"+CREG:") {
            self.parse_creg(line, is(CommandKind::NetworkRegistration))
        } else if line.starts_with(b"+CSQ:") {
            self.parse_csq(line)
        } else if line.starts_with(b"+CPIN:") {
            self.parse_cpin(line, true)
        } else if line.starts_with(b"+CCID:") {
            self.parse_ccid(line);
            None
        } else if line.starts_with(b"+COPS:") {
            if self.is_scanning() {
                for &c in &line[6..] {
                    self.feed_cops_scan(c);
                }
            } else {
                self.parse_cops(line);
            }
            None
        } else if line.starts_with(b"+CLCC:") {
            self.parse_clcc(line, true)
        } else if line.starts_with(b"+CMGS:") {
            self.parse_cmgs(line);
            None
        } else if line.starts_with(b"+CMGR:") {
            self.parse_cmgr(line);
            None
        } else if line.starts_with(b"+CMGL:") {
            self.parse_cmgl(line);
            None
        } else if line.starts_with(b"+CMTI:") {
            self.parse_cmti(line)
        } else if line.starts_with(b"+CPMS:") {
            if let Some(CommandKind::SmsStorage(query)) = active {
                self.parse_cpms(line, query);
            }
            None
        } else if line.starts_with(b"+CPBS:") {
            if let Some(CommandKind::PhonebookStorage(query)) = active {
                self.parse_cpbs(line, query);
            }
            None
        } else if line.starts_with(b"+CPBR:") || line.starts_with(b"+CPBF:") {
            self.parse_cpb_entry(line);
            None
        } else if line.starts_with(b"STATE:") {
            let (event, continue_scan) = self.parse_cipstatus(line, false);
            if !continue_scan && is(CommandKind::ConnectionStatus) {
                // Nothing else follows `IP INITIAL`, not even a final result.
                self.finish(Ok(()));
            }
            event
        } else if is(CommandKind::ConnectionStatus)
            && (line.starts_with(b"C:") || line.starts_with(b"S:"))
        {
            self.parse_cipstatus(line, true).0
        } else if line.starts_with(b"+IPD,") || line.starts_with(b"+RECEIVE,") {
            self.parse_ipd(line);
            None
        } else if line.starts_with(b"+SQNDNSLKUP:") {
            self.parse_dns_lookup(line);
            None
        } else if line.starts_with(b"+SQNSRING:") {
            self.parse_sqnsring(line);
            None
        } else if line.starts_with(b"+SQNSRECV:") {
            self.parse_sqnsrecv(line);
            None
        } else if line.starts_with(b"+SQNSH:") {
            self.parse_sqnsh(line)
        } else {
            trace!("Unhandled line {:?}", LossyStr(line));
            None
        }
    }

    /// Complete the active command with a final result.
    fn finish(&mut self, result: Result<(), Error>) -> Option<Event> {
        let Some(kind) = self.active.take() else {
            trace!("Final result without an active command");
            return None;
        };
        let output = core::mem::take(&mut self.output);
        let mut event = None;

        let result = match result {
            Ok(()) => Ok(match kind {
                CommandKind::NetworkRegistration => Output::Registration(self.network.status),
                CommandKind::PinStatus => Output::PinStatus(self.sim.state),
                CommandKind::SimInfo => Output::Iccid(self.sim.iccid.clone()),
                CommandKind::CallList => Output::Call(self.call.clone()),
                CommandKind::SmsStorage(_) => Output::SmsStorage(self.sms_storage),
                CommandKind::PhonebookStorage(_) => {
                    Output::PhonebookStorage(self.phonebook_storage)
                }
                CommandKind::ConnectionStatus => Output::Attached(self.network.is_attached),
                CommandKind::SocketDial(conn) => {
                    let c = &mut self.conns[conn.index()];
                    c.active = true;
                    debug!("Connection {} open", conn);
                    Output::None
                }
                CommandKind::SocketClose(conn) => {
                    event = self.close_connection(conn, true);
                    Output::None
                }
                _ => output,
            }),
            Err(e) => {
                if let CommandKind::SocketFetch(conn) = kind {
                    warn!("Fetch on connection {} failed, dropping its descriptor", conn);
                    self.abort_payload();
                    self.flow.fetch_failed();
                }
                Err(e)
            }
        };

        self.completion = Some(result);
        event
    }

    /// Drain received bytes of `conn`, oldest first.
    pub fn read(&mut self, conn: ConnId, out: &mut [u8]) -> usize {
        self.pool.read(conn, out)
    }

    pub fn pending(&self, conn: ConnId) -> usize {
        self.pool.pending(conn)
    }
}

fn trim_line(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|c| !matches!(c, b'\r' | b'\n'))
        .map(|p| p + 1)
        .unwrap_or(0);
    &line[..end]
}

fn skip_spaces(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|c| *c != b' ').unwrap_or(s.len());
    &s[start..]
}

fn final_result(line: &[u8]) -> Option<Result<(), Error>> {
    if line == b"OK" {
        Some(Ok(()))
    } else if line == b"ERROR" {
        Some(Err(Error::Command(CommandError::Error)))
    } else if let Some(rest) = line.strip_prefix(b"+CME ERROR:") {
        let code = Cursor::new(skip_spaces(rest)).read_number();
        Some(Err(Error::Command(CommandError::Cme(code as u16))))
    } else if let Some(rest) = line.strip_prefix(b"+CMS ERROR:") {
        let code = Cursor::new(skip_spaces(rest)).read_number();
        Some(Err(Error::Command(CommandError::Cms(code as u16))))
    } else {
        None
    }
}
