#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GenericError {
    Timeout,
    Unsupported,
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // General device errors
    Busy,
    Uninitialized,

    // Connection errors
    InvalidConnection,
    ConnectionNotActive,

    /// The modem terminated a command with `ERROR`, `+CME ERROR` or `+CMS ERROR`.
    Command(CommandError),

    // Resource exhaustion, e.g. a full buffer or descriptor ring
    Overflow,

    // Serial link read/write failure
    Io,

    // Generic shared errors, e.g. from `core::`
    Generic(GenericError),

    Atat(atat::Error),

    SubscriberOverflow(embassy_sync::pubsub::Error),
}

/// Final failure result code of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    Error,
    Cme(u16),
    Cms(u16),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Busy => defmt::write!(f, "Busy"),
            Self::Uninitialized => defmt::write!(f, "Uninitialized"),
            Self::InvalidConnection => defmt::write!(f, "InvalidConnection"),
            Self::ConnectionNotActive => defmt::write!(f, "ConnectionNotActive"),
            Self::Command(e) => defmt::write!(f, "Command({:?})", e),
            Self::Overflow => defmt::write!(f, "Overflow"),
            Self::Io => defmt::write!(f, "Io"),
            Self::Generic(e) => defmt::write!(f, "Generic({:?})", e),
            Self::Atat(e) => defmt::write!(f, "Atat({:?})", e),
            Self::SubscriberOverflow(_) => defmt::write!(f, "SubscriberOverflow"),
        }
    }
}

impl From<atat::Error> for Error {
    fn from(e: atat::Error) -> Self {
        Self::Atat(e)
    }
}

impl From<embassy_time::TimeoutError> for Error {
    fn from(_: embassy_time::TimeoutError) -> Self {
        Self::Generic(GenericError::Timeout)
    }
}

impl From<embassy_sync::pubsub::Error> for Error {
    fn from(e: embassy_sync::pubsub::Error) -> Self {
        Self::SubscriberOverflow(e)
    }
}
