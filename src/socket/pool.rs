//! Fixed arena of receive slots, addressed by `(connection, slot)`.
//!
//! Each fetch from the modem is written into the next free slot of its
//! connection and only becomes readable once committed. Readers drain slots
//! in the order they were filled. When every slot of a connection holds
//! undrained data, [`RxPool::reserve`] refuses and new fetches for that
//! connection stall until the application reads.

use super::ConnId;

#[derive(Clone, Copy)]
struct Slot<const CAP: usize> {
    buf: [u8; CAP],
    read_at: usize,
    len: usize,
    filling: bool,
}

impl<const CAP: usize> Slot<CAP> {
    const fn new() -> Self {
        Self {
            buf: [0; CAP],
            read_at: 0,
            len: 0,
            filling: false,
        }
    }

    fn pending(&self) -> usize {
        if self.filling {
            0
        } else {
            self.len - self.read_at
        }
    }

    fn is_free(&self) -> bool {
        !self.filling && self.read_at == self.len
    }
}

/// Index based handle to a slot that is being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotHandle {
    pub conn: ConnId,
    pub slot: usize,
}

/// Receive slots of a single connection.
pub struct RxPool<const SLOTS: usize, const CAP: usize> {
    slots: [Slot<CAP>; SLOTS],
    next_free: usize,
    next_data: usize,
}

impl<const SLOTS: usize, const CAP: usize> Default for RxPool<SLOTS, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SLOTS: usize, const CAP: usize> RxPool<SLOTS, CAP> {
    pub const fn new() -> Self {
        Self {
            slots: [Slot::new(); SLOTS],
            next_free: 0,
            next_data: 0,
        }
    }

    /// Whether the next slot in line for writing is free.
    pub fn can_reserve(&self) -> bool {
        self.slots[self.next_free].is_free()
    }

    /// Claim the next free slot for writing.
    pub fn reserve(&mut self) -> Option<usize> {
        if !self.can_reserve() {
            return None;
        }
        let idx = self.next_free;
        let slot = &mut self.slots[idx];
        slot.read_at = 0;
        slot.len = 0;
        slot.filling = true;
        self.next_free = (idx + 1) % SLOTS;
        Some(idx)
    }

    /// Append to a reserved slot, returning how many bytes fit.
    pub fn append(&mut self, idx: usize, data: &[u8]) -> usize {
        let Some(slot) = self.slots.get_mut(idx).filter(|s| s.filling) else {
            return 0;
        };
        let n = data.len().min(CAP - slot.len);
        slot.buf[slot.len..slot.len + n].copy_from_slice(&data[..n]);
        slot.len += n;
        n
    }

    /// Make a reserved slot visible to readers.
    pub fn commit(&mut self, idx: usize) {
        if let Some(slot) = self.slots.get_mut(idx) {
            slot.filling = false;
        }
    }

    /// Drain from the oldest slot holding data. Returns `0` when nothing is
    /// pending.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        for _ in 0..SLOTS {
            let slot = &mut self.slots[self.next_data];
            if slot.filling {
                return 0;
            }

            let pending = slot.pending();
            if pending > 0 {
                let n = out.len().min(pending);
                out[..n].copy_from_slice(&slot.buf[slot.read_at..slot.read_at + n]);
                slot.read_at += n;
                if slot.read_at == slot.len {
                    slot.read_at = 0;
                    slot.len = 0;
                    self.next_data = (self.next_data + 1) % SLOTS;
                }
                return n;
            }

            if self.next_data == self.next_free {
                return 0;
            }
            self.next_data = (self.next_data + 1) % SLOTS;
        }
        0
    }

    /// Committed bytes not yet read.
    pub fn pending(&self) -> usize {
        self.slots.iter().map(Slot::pending).sum()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Receive slots for every connection.
pub struct BufferPool<const CONNS: usize, const SLOTS: usize, const CAP: usize> {
    conns: [RxPool<SLOTS, CAP>; CONNS],
}

impl<const CONNS: usize, const SLOTS: usize, const CAP: usize> Default
    for BufferPool<CONNS, SLOTS, CAP>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const CONNS: usize, const SLOTS: usize, const CAP: usize> BufferPool<CONNS, SLOTS, CAP> {
    pub fn new() -> Self {
        Self {
            conns: core::array::from_fn(|_| RxPool::new()),
        }
    }

    fn conn(&self, conn: ConnId) -> Option<&RxPool<SLOTS, CAP>> {
        self.conns.get(conn.index())
    }

    fn conn_mut(&mut self, conn: ConnId) -> Option<&mut RxPool<SLOTS, CAP>> {
        self.conns.get_mut(conn.index())
    }

    pub fn can_reserve(&self, conn: ConnId) -> bool {
        self.conn(conn).map(RxPool::can_reserve).unwrap_or(false)
    }

    pub fn reserve(&mut self, conn: ConnId) -> Option<SlotHandle> {
        let slot = self.conn_mut(conn)?.reserve()?;
        Some(SlotHandle { conn, slot })
    }

    pub fn append(&mut self, handle: SlotHandle, data: &[u8]) -> usize {
        self.conn_mut(handle.conn)
            .map(|p| p.append(handle.slot, data))
            .unwrap_or(0)
    }

    pub fn commit(&mut self, handle: SlotHandle) {
        if let Some(p) = self.conn_mut(handle.conn) {
            p.commit(handle.slot);
        }
    }

    pub fn read(&mut self, conn: ConnId, out: &mut [u8]) -> usize {
        self.conn_mut(conn).map(|p| p.read(out)).unwrap_or(0)
    }

    pub fn pending(&self, conn: ConnId) -> usize {
        self.conn(conn).map(RxPool::pending).unwrap_or(0)
    }

    pub fn clear(&mut self, conn: ConnId) {
        if let Some(p) = self.conn_mut(conn) {
            p.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill<const S: usize, const C: usize>(pool: &mut RxPool<S, C>, data: &[u8]) -> bool {
        match pool.reserve() {
            Some(idx) => {
                pool.append(idx, data);
                pool.commit(idx);
                true
            }
            None => false,
        }
    }

    #[test]
    fn drains_in_fill_order() {
        let mut pool = RxPool::<3, 8>::new();
        assert!(fill(&mut pool, b"abc"));
        assert!(fill(&mut pool, b"de"));

        let mut out = [0u8; 8];
        assert_eq!(pool.read(&mut out), 3);
        assert_eq!(&out[..3], b"abc");
        assert_eq!(pool.read(&mut out), 2);
        assert_eq!(&out[..2], b"de");
        assert_eq!(pool.read(&mut out), 0);
    }

    #[test]
    fn partial_drain_keeps_slot() {
        let mut pool = RxPool::<2, 8>::new();
        assert!(fill(&mut pool, b"abcdef"));

        let mut out = [0u8; 4];
        assert_eq!(pool.read(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(pool.pending(), 2);
        assert_eq!(pool.read(&mut out), 2);
        assert_eq!(&out[..2], b"ef");
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn round_robin_stalls_until_drained() {
        let mut pool = RxPool::<3, 4>::new();
        for chunk in [b"aa", b"bb", b"cc"] {
            assert!(fill(&mut pool, chunk));
        }

        // Every slot holds data: nothing more is accepted.
        assert!(!pool.can_reserve());
        assert_eq!(pool.reserve(), None);
        assert_eq!(pool.pending(), 6);

        let mut out = [0u8; 1];
        assert_eq!(pool.read(&mut out), 1);
        // A partial drain does not free the slot.
        assert!(!pool.can_reserve());

        assert_eq!(pool.read(&mut out), 1);
        assert!(pool.can_reserve());
        assert!(fill(&mut pool, b"dd"));

        let mut out = [0u8; 4];
        assert_eq!(pool.read(&mut out), 2);
        assert_eq!(&out[..2], b"bb");
        assert_eq!(pool.read(&mut out), 2);
        assert_eq!(&out[..2], b"cc");
        assert_eq!(pool.read(&mut out), 2);
        assert_eq!(&out[..2], b"dd");
    }

    #[test]
    fn filling_slot_is_invisible() {
        let mut pool = RxPool::<2, 4>::new();
        let idx = pool.reserve().unwrap();
        assert_eq!(pool.append(idx, b"abcdef"), 4);

        let mut out = [0u8; 4];
        assert_eq!(pool.read(&mut out), 0);
        pool.commit(idx);
        assert_eq!(pool.read(&mut out), 4);
    }

    #[test]
    fn empty_commit_is_skipped() {
        let mut pool = RxPool::<3, 4>::new();
        let idx = pool.reserve().unwrap();
        pool.commit(idx);
        assert!(fill(&mut pool, b"xy"));

        let mut out = [0u8; 4];
        assert_eq!(pool.read(&mut out), 2);
        assert_eq!(&out[..2], b"xy");
    }

    #[test]
    fn connections_are_independent() {
        let mut pool = BufferPool::<2, 2, 4>::new();
        let a = ConnId::new(0).unwrap();
        let b = ConnId::new(1).unwrap();

        let h = pool.reserve(a).unwrap();
        pool.append(h, b"aaaa");
        pool.commit(h);

        let mut out = [0u8; 4];
        assert_eq!(pool.read(b, &mut out), 0);
        assert_eq!(pool.pending(a), 4);
        assert_eq!(pool.read(a, &mut out), 4);
    }
}
