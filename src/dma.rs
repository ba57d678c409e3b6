//! Double buffered DMA reception.
//!
//! The UART DMA writes alternately into two buffers of `N` bytes. The
//! interrupt handlers never touch the parser: they only post [`DmaEvent`]s
//! through a single producer, single consumer queue. The processing context
//! drains that queue with [`DmaReader`], which turns the events into ordered
//! spans of freshly written bytes.

use core::ops::Range;

use heapless::spsc::Consumer;

/// One of the two DMA buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    First,
    Second,
}

impl Half {
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Posted from interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaEvent {
    /// The line went idle while the DMA was writing at `pos` of the active
    /// buffer.
    Idle { pos: usize },
    /// The DMA filled `buffer` and moved on to the other one.
    Completed { buffer: Half },
}

/// Bytes of one buffer that are ready to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub buffer: Half,
    pub range: Range<usize>,
}

impl Span {
    pub fn bytes<'a, const N: usize>(&self, buffers: &'a [[u8; N]; 2]) -> &'a [u8] {
        &buffers[self.buffer.index()][self.range.clone()]
    }
}

/// Tracks how far the processing context has consumed the DMA buffers.
pub struct DmaReader<const N: usize> {
    active: Half,
    old_pos: usize,
}

impl<const N: usize> Default for DmaReader<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DmaReader<N> {
    pub const fn new() -> Self {
        Self {
            active: Half::First,
            old_pos: 0,
        }
    }

    /// The buffer the DMA is expected to be writing into.
    pub fn active(&self) -> Half {
        self.active
    }

    /// Fold one event, returning the span it made available.
    pub fn reconcile(&mut self, event: DmaEvent) -> Option<Span> {
        match event {
            DmaEvent::Idle { pos } => {
                let pos = pos.min(N);
                if pos <= self.old_pos {
                    return None;
                }
                let span = Span {
                    buffer: self.active,
                    range: self.old_pos..pos,
                };
                self.old_pos = pos;
                Some(span)
            }
            DmaEvent::Completed { buffer } => {
                if buffer != self.active {
                    warn!("DMA completed {:?} while tracking {:?}", buffer, self.active);
                    self.active = buffer.other();
                    self.old_pos = 0;
                    return None;
                }

                let span = (self.old_pos < N).then(|| Span {
                    buffer,
                    range: self.old_pos..N,
                });
                self.active = buffer.other();
                self.old_pos = 0;
                span
            }
        }
    }

    /// Drain every queued event, handing out spans in arrival order.
    pub fn drain<const Q: usize>(
        &mut self,
        events: &mut Consumer<'_, DmaEvent, Q>,
        mut f: impl FnMut(Span),
    ) {
        while let Some(event) = events.dequeue() {
            if let Some(span) = self.reconcile(event) {
                f(span);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::spsc::Queue;

    fn collect(buffers: &[[u8; 8]; 2], events: &[DmaEvent]) -> std::vec::Vec<u8> {
        let mut queue: Queue<DmaEvent, 8> = Queue::new();
        let (mut tx, mut rx) = queue.split();
        for ev in events {
            tx.enqueue(*ev).unwrap();
        }

        let mut reader = DmaReader::<8>::new();
        let mut out = std::vec::Vec::new();
        reader.drain(&mut rx, |span| out.extend_from_slice(span.bytes(buffers)));
        out
    }

    #[test]
    fn idle_within_one_buffer() {
        let buffers = [*b"OK\r\nAT\r\n", [0; 8]];
        assert_eq!(
            collect(
                &buffers,
                &[DmaEvent::Idle { pos: 4 }, DmaEvent::Idle { pos: 4 }, DmaEvent::Idle { pos: 8 }]
            ),
            b"OK\r\nAT\r\n"
        );
    }

    #[test]
    fn wrap_into_second_buffer() {
        let buffers = [*b"abcdefgh", *b"ijkl____"];
        assert_eq!(
            collect(
                &buffers,
                &[
                    DmaEvent::Idle { pos: 3 },
                    DmaEvent::Completed { buffer: Half::First },
                    DmaEvent::Idle { pos: 4 },
                ]
            ),
            b"abcdefghijkl"
        );
    }

    #[test]
    fn both_buffers_filled_between_polls() {
        let buffers = [*b"01234567", *b"89abcdef"];
        assert_eq!(
            collect(
                &buffers,
                &[
                    DmaEvent::Idle { pos: 6 },
                    DmaEvent::Completed { buffer: Half::First },
                    DmaEvent::Completed { buffer: Half::Second },
                    DmaEvent::Idle { pos: 2 },
                ]
            ),
            b"0123456789abcdef01"
        );
    }

    #[test]
    fn out_of_order_completion_resyncs() {
        let mut reader = DmaReader::<8>::new();
        assert_eq!(reader.reconcile(DmaEvent::Completed { buffer: Half::Second }), None);
        assert_eq!(reader.active(), Half::First);
        assert_eq!(
            reader.reconcile(DmaEvent::Idle { pos: 2 }),
            Some(Span {
                buffer: Half::First,
                range: 0..2
            })
        );
    }
}
