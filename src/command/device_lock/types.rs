//! Argument and parameter types used by Device lock Commands and Responses

/// SIM state as reported by `+CPIN`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimState {
    /// No `+CPIN` report seen yet
    #[default]
    Unknown,
    /// READY: MT is not pending for any password
    Ready,
    /// NOT READY, and any text not otherwise recognised
    NotReady,
    /// NOT INSERTED
    NotInserted,
    /// SIM PIN: MT is waiting SIM PIN to be given
    PinRequired,
    /// SIM PUK: MT is waiting SIM PUK to be given
    PukRequired,
}

impl SimState {
    const LITERALS: [(&'static [u8], SimState); 5] = [
        (b"READY", Self::Ready),
        (b"NOT READY", Self::NotReady),
        (b"NOT INSERTED", Self::NotInserted),
        (b"SIM PIN", Self::PinRequired),
        (b"SIM PUK", Self::PukRequired),
    ];

    /// Match the `<code>` text of a `+CPIN` line.
    pub fn from_code(text: &[u8]) -> Self {
        Self::LITERALS
            .iter()
            .find(|(lit, _)| text.starts_with(*lit))
            .map(|&(_, state)| state)
            .unwrap_or(Self::NotReady)
    }
}

/// SIM identity collected once the SIM reports ready.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimInfo {
    pub state: SimState,
    pub iccid: heapless::String<22>,
}
