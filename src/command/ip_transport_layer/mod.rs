//! ### Internet protocol transport layer
//!
//! Sequans socket commands. `<connId>` is numbered from 1.
pub mod types;

use atat::atat_derive::AtatCmd;
use types::{ClosureType, DataMode, RingMode, TransmissionProtocol};

use super::NoResponse;

/// Socket dial +SQNSD
///
/// Opens a remote connection in command mode (`<connMode>` 1), so incoming
/// data is announced with `+SQNSRING` and fetched with `+SQNSRECV`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+SQNSD", NoResponse, timeout_ms = 120000)]
pub struct SocketDial<'a> {
    #[at_arg(position = 0)]
    pub conn_id: u8,
    #[at_arg(position = 1)]
    pub protocol: TransmissionProtocol,
    #[at_arg(position = 2)]
    pub remote_port: u16,
    #[at_arg(position = 3, len = 15)]
    pub remote_ip: &'a str,
    #[at_arg(position = 4)]
    pub closure_type: ClosureType,
    #[at_arg(position = 5)]
    pub local_port: u16,
    #[at_arg(position = 6)]
    pub conn_mode: u8,
    #[at_arg(position = 7)]
    pub accept_any_remote: u8,
}

/// Extended send data in command mode +SQNSSENDEXT
///
/// The modem answers with a `>` prompt and then reads exactly `length`
/// bytes.
#[derive(Clone, AtatCmd)]
#[at_cmd("+SQNSSENDEXT", NoResponse, timeout_ms = 10000)]
pub struct SocketSend {
    #[at_arg(position = 0)]
    pub conn_id: u8,
    #[at_arg(position = 1)]
    pub length: u16,
}

/// Receive data in command mode +SQNSRECV
///
/// Answered with `+SQNSRECV: <connId>,<bytes>` followed by the data.
#[derive(Clone, AtatCmd)]
#[at_cmd("+SQNSRECV", NoResponse, timeout_ms = 10000)]
pub struct SocketReceive {
    #[at_arg(position = 0)]
    pub conn_id: u8,
    #[at_arg(position = 1)]
    pub max_bytes: u16,
}

/// Socket shutdown +SQNSH
#[derive(Clone, AtatCmd)]
#[at_cmd("+SQNSH", NoResponse, timeout_ms = 10000)]
pub struct SocketClose {
    #[at_arg(position = 0)]
    pub conn_id: u8,
}

/// Socket configuration extended +SQNSCFGEXT
#[derive(Clone, AtatCmd)]
#[at_cmd("+SQNSCFGEXT", NoResponse, timeout_ms = 1000)]
pub struct SocketConfigExt {
    #[at_arg(position = 0)]
    pub conn_id: u8,
    #[at_arg(position = 1)]
    pub ring_mode: RingMode,
    #[at_arg(position = 2)]
    pub recv_data_mode: DataMode,
    /// Unused, always 0
    #[at_arg(position = 3)]
    pub keepalive: u16,
}

/// Connection status +CIPSTATUS
///
/// One `STATE:` line followed by a `C:` line per connection.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIPSTATUS", NoResponse, timeout_ms = 10000)]
pub struct GetConnectionStatus;
