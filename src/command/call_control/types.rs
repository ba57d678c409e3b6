//! Argument and parameter types used by Call Control Commands and Responses
use heapless::String;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallDirection {
    #[default]
    MobileOriginated,
    MobileTerminated,
}

impl From<i32> for CallDirection {
    fn from(v: i32) -> Self {
        match v {
            1 => Self::MobileTerminated,
            _ => Self::MobileOriginated,
        }
    }
}

/// `<stat>` of a `+CLCC` line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallState {
    Active,
    Held,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
    #[default]
    Disconnected,
}

impl From<i32> for CallState {
    fn from(v: i32) -> Self {
        match v {
            0 => Self::Active,
            1 => Self::Held,
            2 => Self::Dialing,
            3 => Self::Alerting,
            4 => Self::Incoming,
            5 => Self::Waiting,
            _ => Self::Disconnected,
        }
    }
}

/// `<mode>` of a `+CLCC` line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallType {
    #[default]
    Voice,
    Data,
    Fax,
    Unknown,
}

impl From<i32> for CallType {
    fn from(v: i32) -> Self {
        match v {
            0 => Self::Voice,
            1 => Self::Data,
            2 => Self::Fax,
            _ => Self::Unknown,
        }
    }
}

/// Last reported call, from `+CLCC`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallInfo {
    pub id: u8,
    pub direction: CallDirection,
    pub state: CallState,
    pub kind: CallType,
    pub multiparty: bool,
    pub number: String<20>,
    /// Type of address, 129 national or 145 international
    pub address_type: u8,
    pub name: String<20>,
}
