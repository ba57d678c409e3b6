mod pool;

use core::fmt;

pub use self::pool::{BufferPool, RxPool, SlotHandle};

use crate::config::MAX_CONNS;

/// Identity of one of the modem's socket connections.
///
/// Internally zero based. The Sequans socket commands number their
/// connections from one, see [`ConnId::wire`] and [`ConnId::from_wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnId(u8);

impl ConnId {
    /// Returns `None` for ids outside the connection table.
    pub fn new(id: usize) -> Option<Self> {
        (id < MAX_CONNS).then_some(Self(id as u8))
    }

    pub(crate) fn from_wire(id: i32) -> Option<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(Self::new)
    }

    pub fn wire(&self) -> u8 {
        self.0 + 1
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
