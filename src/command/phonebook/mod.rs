//! ### Phonebook
pub mod types;

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// Select phonebook memory storage +CPBS
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPBS=?", NoResponse, timeout_ms = 1000)]
pub struct GetPhonebookStorageOptions;

/// Select phonebook memory storage +CPBS
///
/// Reads `<storage>,<used>,<total>` of the selected phonebook.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPBS?", NoResponse, timeout_ms = 1000)]
pub struct GetPhonebookStorage;

/// Select phonebook memory storage +CPBS
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPBS", NoResponse, timeout_ms = 1000)]
pub struct SetPhonebookStorage<'a> {
    #[at_arg(position = 0, len = 2)]
    pub storage: &'a str,
}

/// Read phonebook entries +CPBR
///
/// `+CPBR: <index>,<number>,<type>,<text>` per entry in `begin..=end`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPBR", NoResponse, timeout_ms = 10000)]
pub struct ReadPhonebook {
    #[at_arg(position = 0)]
    pub begin: u16,
    #[at_arg(position = 1)]
    pub end: u16,
}

/// Find phonebook entries +CPBF
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPBF", NoResponse, timeout_ms = 10000)]
pub struct FindPhonebook<'a> {
    #[at_arg(position = 0, len = 20)]
    pub text: &'a str,
}
