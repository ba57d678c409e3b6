//! Receive flow control.
//!
//! The modem announces buffered socket data with `+SQNSRING: <connId>,<n>`
//! and hands it over only when asked with `+SQNSRECV=<connId>,<n>`. The
//! announcements are queued as [`PendingRead`]s and served strictly in
//! arrival order, one fetch at a time. A fetch is only issued when its
//! connection has a free receive slot, otherwise the ring stalls until the
//! application drains that connection.

use heapless::Deque;

use super::{CommandKind, Engine, Output, RxBuffers};
use crate::config::RING_CAPACITY;
use crate::hex::HexDecoder;
use crate::parser::cursor::Cursor;
use crate::socket::{ConnId, SlotHandle};

/// Bytes still owed to a connection by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingRead {
    pub conn: ConnId,
    pub len: usize,
}

/// A `+SQNSRECV` the runner should send next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchRequest {
    pub conn: ConnId,
    pub len: usize,
}

pub struct FlowControl {
    ring: Deque<PendingRead, RING_CAPACITY>,
    /// Largest single fetch
    quantum: usize,
    outstanding: bool,
    stalled: bool,
}

impl FlowControl {
    pub const fn new(quantum: usize) -> Self {
        Self {
            ring: Deque::new(),
            quantum: if quantum == 0 { 1 } else { quantum },
            outstanding: false,
            stalled: false,
        }
    }

    /// Queue an announcement of `len` bytes, split into requests of at most
    /// one quantum.
    ///
    /// When the ring is full the rest is folded into the newest descriptor
    /// of the same connection, which is then fetched one quantum at a time.
    /// Only if the connection has no descriptor left to grow are the bytes
    /// given up.
    pub fn announce(&mut self, conn: ConnId, mut len: usize) {
        while len > 0 {
            let chunk = len.min(self.quantum);
            if self.ring.push_back(PendingRead { conn, len: chunk }).is_err() {
                match self.ring.iter_mut().rev().find(|r| r.conn == conn) {
                    Some(tail) => {
                        debug!("Pending read ring full, {} bytes of connection {} merged", len, conn);
                        tail.len += len;
                    }
                    None => {
                        warn!("Pending read ring full, dropping {} bytes of connection {}", len, conn);
                    }
                }
                return;
            }
            len -= chunk;
        }
    }

    /// The head of the ring, if it may be fetched now.
    pub fn next_request(&mut self, pool: &RxBuffers) -> Option<FetchRequest> {
        if self.outstanding {
            return None;
        }
        let head = *self.ring.front()?;
        if !pool.can_reserve(head.conn) {
            if !self.stalled {
                warn!("Fetch for connection {} stalled, no free receive slot", head.conn);
                self.stalled = true;
            }
            return None;
        }
        self.stalled = false;
        Some(FetchRequest {
            conn: head.conn,
            len: head.len.min(self.quantum),
        })
    }

    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRead> {
        self.ring.iter()
    }

    fn issue(&mut self) {
        self.outstanding = true;
    }

    /// The modem acknowledged a fetch. The head is removed by position, the
    /// acknowledged id and count are not matched against it.
    pub fn ack(&mut self) {
        self.outstanding = false;
        if let Some(head) = self.ring.front_mut() {
            if head.len > self.quantum {
                head.len -= self.quantum;
                return;
            }
        }
        self.ring.pop_front();
    }

    /// Allow the head to be fetched again.
    pub fn retry(&mut self) {
        self.outstanding = false;
    }

    /// The modem rejected the fetch; its descriptor is dropped.
    pub fn fetch_failed(&mut self) {
        if self.outstanding {
            self.ring.pop_front();
        }
        self.outstanding = false;
    }
}

/// Payload bytes expected after an announcement line.
pub(crate) struct Payload {
    /// `None` when the bytes are only swallowed
    conn: Option<ConnId>,
    slot: Option<SlotHandle>,
    /// Wire characters still to come
    remaining: usize,
    hex: bool,
    decoder: HexDecoder,
    stored: usize,
    dropped: usize,
}

impl Payload {
    /// `len` is the payload length in bytes.
    pub(crate) fn new(conn: ConnId, slot: Option<SlotHandle>, len: usize, hex: bool) -> Self {
        if slot.is_none() {
            warn!("No free receive slot on connection {}, dropping {} bytes", conn, len);
        }
        Self {
            conn: Some(conn),
            slot,
            remaining: if hex { len * 2 } else { len },
            hex,
            decoder: HexDecoder::new(),
            stored: 0,
            dropped: 0,
        }
    }

    pub(crate) fn conn(&self) -> Option<ConnId> {
        self.conn
    }

    /// Consume a payload without storing it.
    pub(crate) fn discard(len: usize, hex: bool) -> Self {
        Self {
            conn: None,
            slot: None,
            remaining: if hex { len * 2 } else { len },
            hex,
            decoder: HexDecoder::new(),
            stored: 0,
            dropped: 0,
        }
    }
}

impl Engine {
    /// `+SQNSRING: <connId>,<recData>`
    pub(crate) fn parse_sqnsring(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        cur.advance(11);
        let num = cur.read_number();
        let len = cur.read_number();

        let Some(conn) = ConnId::from_wire(num) else {
            warn!("Data ready on unknown connection {}", num);
            return;
        };
        let Ok(len) = usize::try_from(len) else {
            return;
        };
        trace!("{} bytes ready on connection {}", len, conn);
        self.flow.announce(conn, len);
    }

    /// `+SQNSRECV: <connId>,<recData>`, followed by the payload.
    pub(crate) fn parse_sqnsrecv(&mut self, line: &[u8]) {
        let mut cur = Cursor::new(line);
        cur.advance(11);
        let num = cur.read_number();
        let len = usize::try_from(cur.read_number()).unwrap_or(0);

        self.flow.ack();

        let Some(conn) = ConnId::from_wire(num) else {
            warn!("Fetched data for unknown connection {}", num);
            if len > 0 {
                self.payload = Some(Payload::discard(len, self.hex_mode));
            }
            return;
        };
        if len == 0 {
            return;
        }

        let slot = self.pool.reserve(conn);
        self.payload = Some(Payload::new(conn, slot, len, self.hex_mode));
    }

    /// Hand out the next fetch and start interpreting its responses. `None`
    /// while a command is running, a fetch is outstanding, the ring is empty
    /// or the head's connection has no free receive slot.
    pub fn next_fetch(&mut self) -> Option<FetchRequest> {
        if !self.is_idle() {
            return None;
        }
        let req = self.flow.next_request(&self.pool)?;
        self.begin(CommandKind::SocketFetch(req.conn)).ok()?;
        self.flow.issue();
        Some(req)
    }

    /// Whether announcements are waiting to be fetched.
    pub fn has_pending_reads(&self) -> bool {
        !self.flow.is_empty()
    }

    /// Wire bytes the ingress must route to [`Engine::process_payload`]
    /// instead of the line parser.
    pub fn payload_remaining(&self) -> usize {
        self.payload.as_ref().map(|p| p.remaining).unwrap_or(0)
    }

    /// Consume payload bytes, returning how many of `data` were used.
    pub fn process_payload(&mut self, data: &[u8]) -> usize {
        let Some(mut payload) = self.payload.take() else {
            return 0;
        };

        let n = data.len().min(payload.remaining);
        let data = &data[..n];
        payload.remaining -= n;

        if payload.hex {
            let mut buf = [0u8; 64];
            let mut len = 0;
            for &c in data {
                if let Some(b) = payload.decoder.push(c) {
                    buf[len] = b;
                    len += 1;
                    if len == buf.len() {
                        self.store_payload(&mut payload, &buf);
                        len = 0;
                    }
                }
            }
            self.store_payload(&mut payload, &buf[..len]);
        } else {
            self.store_payload(&mut payload, data);
        }

        if payload.remaining > 0 {
            self.payload = Some(payload);
        } else {
            self.complete_payload(payload);
        }
        n
    }

    /// Write decoded bytes, spilling into the connection's next free slot
    /// when the current one is full.
    fn store_payload(&mut self, payload: &mut Payload, mut data: &[u8]) {
        while !data.is_empty() {
            let Some(slot) = payload.slot else {
                payload.dropped += data.len();
                return;
            };
            let n = self.pool.append(slot, data);
            payload.stored += n;
            data = &data[n..];

            if !data.is_empty() {
                self.pool.commit(slot);
                payload.slot = self.pool.reserve(slot.conn);
                if payload.slot.is_none() {
                    warn!("Receive slots of connection {} exhausted", slot.conn);
                }
            }
        }
    }

    fn complete_payload(&mut self, payload: Payload) {
        if let Some(slot) = payload.slot {
            self.pool.commit(slot);
        }
        let Some(conn) = payload.conn else {
            return;
        };
        if payload.dropped > 0 {
            warn!("Dropped {} received bytes of connection {}", payload.dropped, conn);
        }
        trace!("Stored {} bytes on connection {}", payload.stored, conn);

        if self.active_command() == Some(CommandKind::SocketFetch(conn)) {
            self.output = Output::Received(payload.stored);
        }
    }

    /// Give up on a payload in progress. Whatever was stored so far stays
    /// readable.
    pub(crate) fn abort_payload(&mut self) {
        if let Some(payload) = self.payload.take() {
            debug!(
                "Payload of connection {:?} cut short, {} wire bytes missing",
                payload.conn, payload.remaining
            );
            if let Some(slot) = payload.slot {
                self.pool.commit(slot);
            }
        }
    }
}
