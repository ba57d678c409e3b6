//! Argument and parameter types used by Short Messages Service Commands and Responses
use heapless::String;

use crate::command::types::{DateTime, Memory};

/// `<stat>` of a stored message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SmsStatus {
    Unread,
    Read,
    Unsent,
    Sent,
    /// Only valid as a `+CMGL` filter
    All,
    #[default]
    Unknown,
}

impl SmsStatus {
    pub fn from_text(text: &str) -> Self {
        match text {
            "REC UNREAD" => Self::Unread,
            "REC READ" => Self::Read,
            "STO UNSENT" => Self::Unsent,
            "STO SENT" => Self::Sent,
            "ALL" => Self::All,
            _ => Self::Unknown,
        }
    }

    pub fn as_text(&self) -> &'static str {
        match self {
            Self::Unread => "REC UNREAD",
            Self::Read => "REC READ",
            Self::Unsent => "STO UNSENT",
            Self::Sent => "STO SENT",
            Self::All | Self::Unknown => "ALL",
        }
    }
}

/// A message read with `+CMGR` or listed with `+CMGL`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmsEntry {
    pub mem: Memory,
    pub pos: usize,
    pub status: SmsStatus,
    pub number: String<20>,
    pub name: String<20>,
    pub datetime: DateTime,
    pub data: String<160>,
}

/// Message storage selection order of `+CPMS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageSlot {
    /// Messages are read and deleted from here
    Operate = 0,
    /// Messages are written and sent from here
    Receive = 1,
    /// Received messages are placed here
    Sent = 2,
}
