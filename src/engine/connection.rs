use heapless::String;
use no_std_net::Ipv4Addr;

use super::flow::Payload;
use super::{CommandKind, Engine, Event, Output};
use crate::command::ip_transport_layer::types::{ConnectionStatus, TransmissionProtocol};
use crate::parser::cursor::Cursor;
use crate::socket::ConnId;

/// Modem side view of one socket connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub num: u8,
    pub protocol: TransmissionProtocol,
    pub remote_ip: Ipv4Addr,
    pub remote_port: u16,
    pub bearer: u8,
    /// Last textual status reported for this connection
    pub status: ConnectionStatus,
    pub(crate) active: bool,
}

impl Connection {
    pub(crate) fn new(num: u8) -> Self {
        Self {
            num,
            protocol: TransmissionProtocol::Tcp,
            remote_ip: Ipv4Addr::UNSPECIFIED,
            remote_port: 0,
            bearer: 0,
            status: ConnectionStatus::Initial,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Engine {
    /// Run close processing for `conn`. Nothing happens if the connection is
    /// not active, so a repeated `CLOSED` is harmless.
    pub(crate) fn close_connection(&mut self, conn: ConnId, forced: bool) -> Option<Event> {
        let c = &mut self.conns[conn.index()];
        if !c.active {
            return None;
        }

        let ip = c.remote_ip.octets();
        debug!(
            "Connection {} to {}.{}.{}.{}:{} closed (forced: {})",
            conn, ip[0], ip[1], ip[2], ip[3], c.remote_port, forced
        );
        let event = Event::ConnectionClosed { conn, forced };

        c.active = false;
        c.status = ConnectionStatus::Closed;
        Some(event)
    }

    /// A `+CIPSTATUS` line: either the general `STATE: <state>` line or a
    /// per connection `C: <n>,<bearer>,<proto>,<ip>,<port>,<state>` line.
    ///
    /// The second value is `false` when no further lines, not even a final
    /// result, follow this one.
    pub(crate) fn parse_cipstatus(&mut self, line: &[u8], is_conn_line: bool) -> (Option<Event>, bool) {
        if !(is_conn_line && matches!(line.first(), Some(b'C' | b'S'))) {
            return self.parse_ip_state(line);
        }

        let mut cur = Cursor::new(line);
        cur.advance(3);

        let num = cur.read_number();
        let Some(conn) = usize::try_from(num).ok().and_then(ConnId::new) else {
            warn!("Status for unknown connection {}", num);
            return (None, true);
        };

        let bearer = cur.read_number() as u8;
        let proto: String<8> = cur.read_string();
        let remote_ip = cur.read_ip();
        let remote_port = cur.read_number() as u16;
        let text: String<16> = cur.read_string();
        let status = ConnectionStatus::from_text(&text);

        let c = &mut self.conns[conn.index()];
        c.bearer = bearer;
        if let Some(protocol) = TransmissionProtocol::from_text(&proto) {
            c.protocol = protocol;
        }
        c.remote_ip = remote_ip;
        c.remote_port = remote_port;
        c.status = status;

        let event = match status {
            ConnectionStatus::Closed => self.close_connection(conn, false),
            ConnectionStatus::Initial => None,
            _ => {
                let c = &mut self.conns[conn.index()];
                if !c.active {
                    debug!("Connection {} seen {:?}", conn, status);
                    c.active = true;
                }
                None
            }
        };
        (event, true)
    }

    fn parse_ip_state(&mut self, line: &[u8]) -> (Option<Event>, bool) {
        let state = line.get(7..).unwrap_or_default();

        let mut continue_scan = true;
        let attached = if state.starts_with(b"IP INITIAL") {
            continue_scan = false;
            false
        } else {
            !state.starts_with(b"PDP DEACT")
        };

        if self.network.is_attached == attached {
            return (None, continue_scan);
        }

        debug!("Network attached: {}", attached);
        self.network.is_attached = attached;
        let event = if attached {
            Event::NetworkAttached
        } else {
            Event::NetworkDetached
        };
        (Some(event), continue_scan)
    }

    /// `+IPD,<n>,<len>:` or `+RECEIVE,<n>,<len>:`, followed by `<len>` raw
    /// bytes.
    pub(crate) fn parse_ipd(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        if cur.eat(b'+') {
            if cur.peek() == b'R' {
                cur.advance(8);
            } else {
                cur.advance(4);
            }
        }

        let num = cur.read_number();
        let len = usize::try_from(cur.read_number()).unwrap_or(0);
        let Some(conn) = usize::try_from(num).ok().and_then(ConnId::new) else {
            warn!("Data for unknown connection {}", num);
            // The bytes follow regardless and must not reach the line parser.
            if len > 0 {
                self.payload = Some(Payload::discard(len, false));
            }
            return;
        };
        if len == 0 {
            return;
        }

        trace!("{} bytes announced on connection {}", len, conn);
        self.payload = Some(Payload::new(conn, self.pool.reserve(conn), len, false));
    }

    /// `+SQNDNSLKUP: <host>,<ip>`
    pub(crate) fn parse_dns_lookup(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        cur.advance(13);
        cur.next_param();
        let ip = cur.read_ip();

        if self.active_command() == Some(CommandKind::DnsLookup) {
            self.output = Output::HostIp(ip);
        }
    }

    /// `+SQNSH: <connId>`, the remote closed the connection.
    pub(crate) fn parse_sqnsh(&mut self, line: &[u8]) -> Option<Event> {
        let mut cur = Cursor::new(line);
        cur.advance(8);
        let num = cur.read_number();
        let Some(conn) = ConnId::from_wire(num) else {
            warn!("Close for unknown connection {}", num);
            return None;
        };
        self.close_connection(conn, false)
    }
}
