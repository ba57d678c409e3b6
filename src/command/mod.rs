//! AT Commands for Sequans cellular modems
//!
//! Responses are interpreted line by line by the [`crate::engine::Engine`],
//! so every command here declares [`NoResponse`] and only carries its
//! formatting and timeout.

pub mod call_control;
pub mod device_lock;
pub mod dns;
pub mod ip_transport_layer;
pub mod network_service;
pub mod phonebook;
pub mod sms;
pub mod types;

use atat::atat_derive::{AtatCmd, AtatResp};

#[derive(Clone, AtatResp)]
pub struct NoResponse;

#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse, timeout_ms = 1000)]
pub struct AT;

/// Report mobile termination error +CMEE
///
/// `1` makes the modem report numeric `+CME ERROR: <err>` codes.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMEE", NoResponse, timeout_ms = 1000)]
pub struct SetReportMobileTerminationError {
    #[at_arg(position = 0)]
    pub n: u8,
}
