//! ### Device lock
pub mod types;

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// Enter PIN +CPIN
///
/// Reads whether the MT is waiting for a password, `+CPIN: <code>`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPIN?", NoResponse, timeout_ms = 10000)]
pub struct GetPinStatus;

/// Card identification +CCID
///
/// Returns the ICCID of the SIM card.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CCID", NoResponse, timeout_ms = 1000)]
pub struct GetCCID;
