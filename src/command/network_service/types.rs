//! Argument and parameter types used by Network service Commands and Responses
use heapless::String;

pub const LONG_NAME_LEN: usize = 20;
pub const SHORT_NAME_LEN: usize = 10;

/// Operator selection mode, `<mode>` of `+COPS`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorMode {
    /// 0: automatic
    #[default]
    Automatic,
    /// 1: manual
    Manual,
    /// 2: deregister from network
    Deregister,
    /// 3: set only `<format>`
    SetFormat,
    /// 4: manual/automatic
    ManualAutomatic,
    Unknown(i32),
}

impl From<i32> for OperatorMode {
    fn from(v: i32) -> Self {
        match v {
            0 => Self::Automatic,
            1 => Self::Manual,
            2 => Self::Deregister,
            3 => Self::SetFormat,
            4 => Self::ManualAutomatic,
            v => Self::Unknown(v),
        }
    }
}

/// `<format>` of `+COPS`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorFormat {
    LongName,
    ShortName,
    Numeric,
    /// The response carried no format field.
    #[default]
    Invalid,
}

impl From<i32> for OperatorFormat {
    fn from(v: i32) -> Self {
        match v {
            0 => Self::LongName,
            1 => Self::ShortName,
            2 => Self::Numeric,
            _ => Self::Invalid,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorName {
    #[default]
    None,
    LongName(String<LONG_NAME_LEN>),
    ShortName(String<SHORT_NAME_LEN>),
    Numeric(u32),
}

/// Currently selected operator, as reported by `+COPS?`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Operator {
    pub mode: OperatorMode,
    pub format: OperatorFormat,
    pub name: OperatorName,
}

/// `<stat>` of an operator in a `+COPS=?` scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorStatus {
    #[default]
    Unknown,
    Available,
    Current,
    Forbidden,
}

impl From<u32> for OperatorStatus {
    fn from(v: u32) -> Self {
        match v {
            1 => Self::Available,
            2 => Self::Current,
            3 => Self::Forbidden,
            _ => Self::Unknown,
        }
    }
}

/// One operator found by a network scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScannedOperator {
    pub status: OperatorStatus,
    pub long_name: String<LONG_NAME_LEN>,
    pub short_name: String<SHORT_NAME_LEN>,
    pub numeric: u32,
}
