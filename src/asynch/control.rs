use core::fmt::Write as _;

use atat::AtatCmd;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::pubsub::Subscriber;
use embassy_time::Duration;
use heapless::{String, Vec};
use no_std_net::{Ipv4Addr, SocketAddrV4};

use super::encode;
use super::state::{Request, State};
use crate::command::call_control::types::CallInfo;
use crate::command::call_control::ListCalls;
use crate::command::device_lock::types::SimState;
use crate::command::device_lock::{GetCCID, GetPinStatus};
use crate::command::dns::ResolveHost;
use crate::command::ip_transport_layer::types::{DataMode, DialOptions, RingMode, TransmissionProtocol};
use crate::command::ip_transport_layer::{
    GetConnectionStatus, SocketClose, SocketConfigExt, SocketDial, SocketSend,
};
use crate::command::network_service::types::{Operator, ScannedOperator};
use crate::command::network_service::{
    GetNetworkRegistrationStatus, GetOperatorSelection, GetOperators, GetSignalQuality,
};
use crate::command::phonebook::types::PbEntry;
use crate::command::phonebook::{
    FindPhonebook, GetPhonebookStorage, GetPhonebookStorageOptions, ReadPhonebook,
    SetPhonebookStorage,
};
use crate::command::sms::types::{SmsEntry, SmsStatus};
use crate::command::sms::{
    DeleteMessage, GetMessageStorage, GetMessageStorageOptions, ListMessages, ReadMessage,
    SendMessage, SetMessageFormat, SetMessageStorage,
};
use crate::command::types::{Memory, MemoryInfo};
use crate::command::{SetReportMobileTerminationError, AT};
use crate::config::{
    EVENT_CAPACITY, EVENT_SUBSCRIBERS, MAX_PB_ENTRIES, MAX_SCAN_RESULTS, MAX_SMS_ENTRIES,
    SEND_CHUNK_SIZE,
};
use crate::engine::{CommandKind, Event, Output, StorageQuery};
use crate::error::Error;
use crate::registration::RegistrationStatus;
use crate::socket::ConnId;

pub type EventSubscriber<'a> =
    Subscriber<'a, NoopRawMutex, Event, EVENT_CAPACITY, EVENT_SUBSCRIBERS, 1>;

/// Ctrl-Z, terminates the text of `+CMGS`
const SMS_END: u8 = 0x1A;

/// Handle for issuing commands through the [`super::Runner`].
///
/// Every call formats a command, hands it to the runner and waits for the
/// engine to interpret the modem's answer.
#[derive(Clone, Copy)]
pub struct Control<'a> {
    state: &'a State,
}

impl<'a> Control<'a> {
    pub(crate) fn new(state: &'a State) -> Self {
        Self { state }
    }

    async fn exec<Cmd: AtatCmd>(
        &self,
        kind: CommandKind,
        cmd: &Cmd,
        payload: Option<Vec<u8, SEND_CHUNK_SIZE>>,
    ) -> Result<Output, Error> {
        let cmd = encode(cmd)?;
        let _exchange = self.state.exchange.lock().await;

        self.state.response.reset();
        self.state
            .requests
            .send(Request {
                kind,
                cmd,
                payload,
                timeout: Duration::from_millis(Cmd::MAX_TIMEOUT_MS.into()),
            })
            .await;
        self.state.response.wait().await
    }

    /// Send a command whose only result is `OK` or an error.
    pub async fn send_command<Cmd: AtatCmd>(&self, cmd: &Cmd) -> Result<(), Error> {
        self.exec(CommandKind::Generic, cmd, None).await.map(drop)
    }

    /// Check the modem answers and select numeric error reports and text
    /// mode messages.
    pub async fn init(&self) -> Result<(), Error> {
        self.send_command(&AT).await?;
        self.send_command(&SetReportMobileTerminationError { n: 1 }).await?;
        self.send_command(&SetMessageFormat { mode: 1 }).await?;
        self.pin_status().await?;
        self.registration().await?;
        Ok(())
    }

    pub fn subscribe_events(&self) -> Result<EventSubscriber<'a>, Error> {
        Ok(self.state.events.subscriber()?)
    }

    pub async fn signal_quality(&self) -> Result<i16, Error> {
        match self
            .exec(CommandKind::SignalQuality, &GetSignalQuality, None)
            .await?
        {
            Output::SignalQuality(rssi) => Ok(rssi),
            _ => Err(missing()),
        }
    }

    pub async fn registration(&self) -> Result<RegistrationStatus, Error> {
        match self
            .exec(
                CommandKind::NetworkRegistration,
                &GetNetworkRegistrationStatus,
                None,
            )
            .await?
        {
            Output::Registration(status) => Ok(status),
            _ => Err(missing()),
        }
    }

    pub async fn operator(&self) -> Result<Operator, Error> {
        match self
            .exec(CommandKind::OperatorGet, &GetOperatorSelection, None)
            .await?
        {
            Output::Operator(op) => Ok(op),
            _ => Err(missing()),
        }
    }

    /// Scan for operators. Can take minutes.
    pub async fn scan_operators(&self) -> Result<Vec<ScannedOperator, MAX_SCAN_RESULTS>, Error> {
        match self
            .exec(CommandKind::OperatorScan, &GetOperators, None)
            .await?
        {
            Output::Operators(ops) => Ok(ops),
            _ => Err(missing()),
        }
    }

    pub async fn pin_status(&self) -> Result<SimState, Error> {
        match self.exec(CommandKind::PinStatus, &GetPinStatus, None).await? {
            Output::PinStatus(state) => Ok(state),
            _ => Err(missing()),
        }
    }

    pub async fn iccid(&self) -> Result<String<22>, Error> {
        match self.exec(CommandKind::SimInfo, &GetCCID, None).await? {
            Output::Iccid(iccid) => Ok(iccid),
            _ => Err(missing()),
        }
    }

    /// Refresh the attach state and the connection table with `+CIPSTATUS`.
    pub async fn network_status(&self) -> Result<bool, Error> {
        match self
            .exec(CommandKind::ConnectionStatus, &GetConnectionStatus, None)
            .await?
        {
            Output::Attached(attached) => Ok(attached),
            _ => Err(missing()),
        }
    }

    pub async fn current_call(&self) -> Result<CallInfo, Error> {
        match self.exec(CommandKind::CallList, &ListCalls, None).await? {
            Output::Call(call) => Ok(call),
            _ => Err(missing()),
        }
    }

    pub async fn resolve(&self, host: &str) -> Result<Ipv4Addr, Error> {
        match self
            .exec(CommandKind::DnsLookup, &ResolveHost { host }, None)
            .await?
        {
            Output::HostIp(ip) => Ok(ip),
            _ => Err(missing()),
        }
    }

    /// Dial `remote` on `conn`. Received data is announced by the modem and
    /// fetched in the background; drain it with [`Control::read`].
    pub async fn open(
        &self,
        conn: ConnId,
        protocol: TransmissionProtocol,
        remote: SocketAddrV4,
        options: DialOptions,
    ) -> Result<(), Error> {
        let (active, hex) = self
            .state
            .with_engine(|e| (e.connection(conn).is_active(), e.hex_mode()));
        if active {
            return Err(Error::Busy);
        }

        self.send_command(&SocketConfigExt {
            conn_id: conn.wire(),
            ring_mode: RingMode::DataAmount,
            recv_data_mode: if hex { DataMode::Hex } else { DataMode::Text },
            keepalive: 0,
        })
        .await?;

        let mut ip: String<15> = String::new();
        write!(ip, "{}", remote.ip()).map_err(|_| Error::Overflow)?;

        self.state
            .with_engine(|e| e.prepare_dial(conn, protocol, remote));
        self.exec(
            CommandKind::SocketDial(conn),
            &SocketDial {
                conn_id: conn.wire(),
                protocol,
                remote_port: remote.port(),
                remote_ip: &ip,
                closure_type: options.closure_type,
                local_port: options.local_port,
                conn_mode: 1,
                accept_any_remote: u8::from(options.accept_any_remote),
            },
            None,
        )
        .await
        .map(drop)
    }

    /// Send all of `data`, in chunks the modem accepts after one prompt.
    pub async fn send(&self, conn: ConnId, data: &[u8]) -> Result<usize, Error> {
        self.ensure_active(conn)?;

        for chunk in data.chunks(SEND_CHUNK_SIZE) {
            let payload = Vec::from_slice(chunk).map_err(|_| Error::Overflow)?;
            self.exec(
                CommandKind::SocketSend(conn),
                &SocketSend {
                    conn_id: conn.wire(),
                    length: chunk.len() as u16,
                },
                Some(payload),
            )
            .await?;
        }
        Ok(data.len())
    }

    /// Copy received bytes of `conn` into `buf`. `0` means nothing is
    /// pending, not an error.
    pub fn read(&self, conn: ConnId, buf: &mut [u8]) -> usize {
        self.state.with_engine(|e| e.read(conn, buf))
    }

    /// Received bytes of `conn` waiting to be read.
    pub fn pending(&self, conn: ConnId) -> usize {
        self.state.with_engine(|e| e.pending(conn))
    }

    pub async fn close(&self, conn: ConnId) -> Result<(), Error> {
        self.ensure_active(conn)?;
        self.exec(
            CommandKind::SocketClose(conn),
            &SocketClose {
                conn_id: conn.wire(),
            },
            None,
        )
        .await
        .map(drop)
    }

    fn ensure_active(&self, conn: ConnId) -> Result<(), Error> {
        if self.state.with_engine(|e| e.connection(conn).is_active()) {
            Ok(())
        } else {
            Err(Error::ConnectionNotActive)
        }
    }

    /// Send a text message, returning its message reference.
    pub async fn send_sms(&self, number: &str, text: &str) -> Result<i32, Error> {
        let mut payload: Vec<u8, SEND_CHUNK_SIZE> = Vec::new();
        payload
            .extend_from_slice(text.as_bytes())
            .map_err(|_| Error::Overflow)?;
        payload.push(SMS_END).map_err(|_| Error::Overflow)?;

        match self
            .exec(CommandKind::SmsSend, &SendMessage { number }, Some(payload))
            .await?
        {
            Output::SmsReference(mr) => Ok(mr),
            _ => Err(missing()),
        }
    }

    pub async fn read_sms(&self, index: u16) -> Result<SmsEntry, Error> {
        match self
            .exec(
                CommandKind::SmsRead {
                    pos: usize::from(index),
                },
                &ReadMessage { index },
                None,
            )
            .await?
        {
            Output::Sms(sms) => Ok(sms),
            _ => Err(missing()),
        }
    }

    pub async fn list_sms(&self, status: SmsStatus) -> Result<Vec<SmsEntry, MAX_SMS_ENTRIES>, Error> {
        match self
            .exec(
                CommandKind::SmsList,
                &ListMessages {
                    stat: status.as_text(),
                },
                None,
            )
            .await?
        {
            Output::SmsList(list) => Ok(list),
            _ => Err(missing()),
        }
    }

    pub async fn delete_sms(&self, index: u16) -> Result<(), Error> {
        self.send_command(&DeleteMessage { index }).await
    }

    /// Storage options, or the current selection, of the three message
    /// storages.
    pub async fn sms_storage(&self, options: bool) -> Result<[MemoryInfo; 3], Error> {
        let out = if options {
            self.exec(
                CommandKind::SmsStorage(StorageQuery::Options),
                &GetMessageStorageOptions,
                None,
            )
            .await?
        } else {
            self.exec(
                CommandKind::SmsStorage(StorageQuery::Current),
                &GetMessageStorage,
                None,
            )
            .await?
        };
        match out {
            Output::SmsStorage(info) => Ok(info),
            _ => Err(missing()),
        }
    }

    pub async fn set_sms_storage(&self, mem: [Memory; 3]) -> Result<[MemoryInfo; 3], Error> {
        match self
            .exec(
                CommandKind::SmsStorage(StorageQuery::Set),
                &SetMessageStorage {
                    mem1: mem[0].code(),
                    mem2: mem[1].code(),
                    mem3: mem[2].code(),
                },
                None,
            )
            .await?
        {
            Output::SmsStorage(info) => Ok(info),
            _ => Err(missing()),
        }
    }

    pub async fn phonebook_storage(&self, options: bool) -> Result<MemoryInfo, Error> {
        let out = if options {
            self.exec(
                CommandKind::PhonebookStorage(StorageQuery::Options),
                &GetPhonebookStorageOptions,
                None,
            )
            .await?
        } else {
            self.exec(
                CommandKind::PhonebookStorage(StorageQuery::Current),
                &GetPhonebookStorage,
                None,
            )
            .await?
        };
        match out {
            Output::PhonebookStorage(info) => Ok(info),
            _ => Err(missing()),
        }
    }

    pub async fn set_phonebook_storage(&self, mem: Memory) -> Result<MemoryInfo, Error> {
        match self
            .exec(
                CommandKind::PhonebookStorage(StorageQuery::Set),
                &SetPhonebookStorage {
                    storage: mem.code(),
                },
                None,
            )
            .await?
        {
            Output::PhonebookStorage(info) => Ok(info),
            _ => Err(missing()),
        }
    }

    pub async fn read_phonebook(
        &self,
        begin: u16,
        end: u16,
    ) -> Result<Vec<PbEntry, MAX_PB_ENTRIES>, Error> {
        match self
            .exec(
                CommandKind::PhonebookRead,
                &ReadPhonebook { begin, end },
                None,
            )
            .await?
        {
            Output::Phonebook(entries) => Ok(entries),
            _ => Err(missing()),
        }
    }

    pub async fn find_phonebook(&self, text: &str) -> Result<Vec<PbEntry, MAX_PB_ENTRIES>, Error> {
        match self
            .exec(CommandKind::PhonebookFind, &FindPhonebook { text }, None)
            .await?
        {
            Output::Phonebook(entries) => Ok(entries),
            _ => Err(missing()),
        }
    }
}

/// The command completed with `OK` but without the response line it needs.
fn missing() -> Error {
    Error::Atat(atat::Error::InvalidResponse)
}
