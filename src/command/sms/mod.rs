//! ### Short Messages Service
pub mod types;

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// Message format +CMGF
///
/// `1` selects text mode, which the message interpreters expect.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGF", NoResponse, timeout_ms = 1000)]
pub struct SetMessageFormat {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// Send message +CMGS
///
/// The modem answers with a `>` prompt, after which the text is written and
/// terminated with Ctrl-Z. The final response is `+CMGS: <mr>`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGS", NoResponse, timeout_ms = 180000)]
pub struct SendMessage<'a> {
    #[at_arg(position = 0, len = 20)]
    pub number: &'a str,
}

/// Read message +CMGR
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGR", NoResponse, timeout_ms = 10000)]
pub struct ReadMessage {
    #[at_arg(position = 0)]
    pub index: u16,
}

/// List message +CMGL
///
/// One `+CMGL` header line followed by the message text per stored message.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGL", NoResponse, timeout_ms = 20000)]
pub struct ListMessages<'a> {
    #[at_arg(position = 0, len = 10)]
    pub stat: &'a str,
}

/// Delete message +CMGD
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGD", NoResponse, timeout_ms = 10000)]
pub struct DeleteMessage {
    #[at_arg(position = 0)]
    pub index: u16,
}

/// Preferred message storage +CPMS
///
/// Lists the supported storages for each of the three selections.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPMS=?", NoResponse, timeout_ms = 1000)]
pub struct GetMessageStorageOptions;

/// Preferred message storage +CPMS
///
/// Reads `<mem>,<used>,<total>` for each of the three selections.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPMS?", NoResponse, timeout_ms = 1000)]
pub struct GetMessageStorage;

/// Preferred message storage +CPMS
///
/// Responds with `<used>,<total>` for each of the three selections.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPMS", NoResponse, timeout_ms = 1000)]
pub struct SetMessageStorage<'a> {
    #[at_arg(position = 0, len = 2)]
    pub mem1: &'a str,
    #[at_arg(position = 1, len = 2)]
    pub mem2: &'a str,
    #[at_arg(position = 2, len = 2)]
    pub mem3: &'a str,
}
