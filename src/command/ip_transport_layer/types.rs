//! Argument and parameter types used by Internet protocol transport layer Commands and Responses
use atat::atat_derive::AtatEnum;

/// `<txProt>` of `+SQNSD`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmissionProtocol {
    #[default]
    Tcp = 0,
    Udp = 1,
}

impl TransmissionProtocol {
    /// Protocol column of a connection status line.
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "TCP" => Some(Self::Tcp),
            "UDP" => Some(Self::Udp),
            _ => None,
        }
    }
}

/// `<srMode>` of `+SQNSCFGEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingMode {
    /// `+SQNSRING: <connId>`
    Normal = 0,
    /// `+SQNSRING: <connId>,<recData>`
    DataAmount = 1,
}

/// `<recvDataMode>` and `<sendDataMode>` of `+SQNSCFGEXT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataMode {
    Text = 0,
    Hex = 1,
}

/// `<closureType>` of `+SQNSD`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, AtatEnum)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClosureType {
    /// Local host closes immediately when the remote host has closed
    #[default]
    Immediate = 0,
    /// Local host closes after an escape sequence
    AfterEscape = 255,
}

/// Textual status of a connection status line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionStatus {
    #[default]
    Initial,
    Connecting,
    Connected,
    RemoteClosing,
    Closing,
    Closed,
    Unknown,
}

impl ConnectionStatus {
    pub fn from_text(text: &str) -> Self {
        match text {
            "INITIAL" => Self::Initial,
            "CONNECTING" => Self::Connecting,
            "CONNECTED" => Self::Connected,
            "REMOTE CLOSING" => Self::RemoteClosing,
            "CLOSING" => Self::Closing,
            "CLOSED" => Self::Closed,
            _ => Self::Unknown,
        }
    }
}

/// Extra `+SQNSD` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DialOptions {
    pub closure_type: ClosureType,
    /// `0` lets the modem pick
    pub local_port: u16,
    pub accept_any_remote: bool,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            closure_type: ClosureType::Immediate,
            local_port: 0,
            accept_any_remote: false,
        }
    }
}
