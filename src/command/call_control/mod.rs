//! ### Call control
pub mod types;

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// List current calls +CLCC
///
/// Returns one `+CLCC` line per call.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CLCC", NoResponse, timeout_ms = 1000)]
pub struct ListCalls;
