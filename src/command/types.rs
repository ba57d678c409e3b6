//! Argument and parameter types shared by several command groups

/// Storage area for short messages and phonebook entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Memory {
    /// SIM message storage
    Sim,
    /// Mobile equipment storage
    MobileEquipment,
    /// Any of the storages associated with the ME
    MobileTermination,
    /// Broadcast message storage
    Broadcast,
    /// Status report storage
    StatusReport,
    /// Terminal adaptor storage
    TerminalAdaptor,
    /// SIM fixed dialling phonebook
    FixedDialling,
    /// Last dialled numbers
    LastDialled,
    /// Missed calls
    MissedCalls,
    /// Received calls
    ReceivedCalls,
    /// Dialled calls
    DialledCalls,
    /// Emergency numbers
    Emergency,
    /// Own numbers (MSISDNs)
    OwnNumbers,
    #[default]
    Unknown,
}

impl Memory {
    pub(crate) const TABLE: [(&'static [u8], Memory); 13] = [
        (b"SM", Self::Sim),
        (b"ME", Self::MobileEquipment),
        (b"MT", Self::MobileTermination),
        (b"BM", Self::Broadcast),
        (b"SR", Self::StatusReport),
        (b"TA", Self::TerminalAdaptor),
        (b"FD", Self::FixedDialling),
        (b"LD", Self::LastDialled),
        (b"MC", Self::MissedCalls),
        (b"RC", Self::ReceivedCalls),
        (b"DC", Self::DialledCalls),
        (b"EN", Self::Emergency),
        (b"ON", Self::OwnNumbers),
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Sim => "SM",
            Self::MobileEquipment => "ME",
            Self::MobileTermination => "MT",
            Self::Broadcast => "BM",
            Self::StatusReport => "SR",
            Self::TerminalAdaptor => "TA",
            Self::FixedDialling => "FD",
            Self::LastDialled => "LD",
            Self::MissedCalls => "MC",
            Self::ReceivedCalls => "RC",
            Self::DialledCalls => "DC",
            Self::Emergency => "EN",
            Self::OwnNumbers => "ON",
            Self::Unknown => "",
        }
    }
}

/// Set of [`Memory`] values, as listed by the storage query commands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemorySet(u16);

impl MemorySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, mem: Memory) {
        self.0 |= 1 << mem as u16;
    }

    pub fn contains(&self, mem: Memory) -> bool {
        self.0 & (1 << mem as u16) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Timestamp as reported in SMS headers, `yy/MM/dd,hh:mm:ss±zz`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// Usage of one storage area, as reported by `+CPMS` and `+CPBS`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryInfo {
    pub available: MemorySet,
    pub current: Memory,
    pub used: usize,
    pub total: usize,
}
