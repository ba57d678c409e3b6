//! ### Network service
pub mod types;

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// Signal quality +CSQ
///
/// Returns the received signal strength indication `<rssi>` and `<qual>`.
/// `<rssi>` 0..31 maps to -113..-51 dBm, 99 means not known.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSQ", NoResponse, timeout_ms = 1000)]
pub struct GetSignalQuality;

/// Operator selection +COPS
///
/// Reads the current mode, format and the selected operator.
#[derive(Clone, AtatCmd)]
#[at_cmd("+COPS?", NoResponse, timeout_ms = 180000)]
pub struct GetOperatorSelection;

/// Operator selection +COPS
///
/// Lists the operators present in the network. The response is a single line
/// of `(<stat>,<long>,<short>,<numeric>[,<AcT>])` groups followed by the
/// supported modes and formats.
#[derive(Clone, AtatCmd)]
#[at_cmd("+COPS=?", NoResponse, timeout_ms = 180000)]
pub struct GetOperators;

/// Network registration status +CREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG?", NoResponse, timeout_ms = 1000)]
pub struct GetNetworkRegistrationStatus;
