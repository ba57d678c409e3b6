//! ### Domain Name System
use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// DNS lookup +SQNDNSLKUP
///
/// Answered with `+SQNDNSLKUP: <hostname>,<ip>`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+SQNDNSLKUP", NoResponse, timeout_ms = 70000)]
pub struct ResolveHost<'a> {
    #[at_arg(position = 0, len = 128)]
    pub host: &'a str,
}
