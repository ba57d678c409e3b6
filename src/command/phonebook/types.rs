//! Argument and parameter types used by Phonebook Commands and Responses
use heapless::String;

/// One phonebook entry from `+CPBR` or `+CPBF`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PbEntry {
    pub pos: usize,
    pub number: String<26>,
    /// Type of address, 129 national or 145 international
    pub number_type: u8,
    pub name: String<20>,
}
