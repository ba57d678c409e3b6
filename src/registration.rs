use crate::command::network_service::types::Operator;

/// 3GPP circuit switched registration state as reported by `+CREG`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationStatus {
    #[default]
    NotRegistered,
    Home,
    Searching,
    Denied,
    Unknown,
    Roaming,
}

impl From<i32> for RegistrationStatus {
    fn from(v: i32) -> Self {
        match v {
            0 => Self::NotRegistered,
            1 => Self::Home,
            2 => Self::Searching,
            3 => Self::Denied,
            5 => Self::Roaming,
            _ => Self::Unknown,
        }
    }
}

impl RegistrationStatus {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Home | Self::Roaming)
    }
}

/// Network facing state shared between the interpreters and the public API.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NetworkState {
    pub status: RegistrationStatus,
    pub operator: Operator,
    /// Last reported signal strength in dBm, `0` when unknown.
    pub rssi: i16,
    /// Packet data attach state, maintained by the connection status
    /// interpreter and read by the registration interpreter.
    pub is_attached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_codes() {
        assert_eq!(RegistrationStatus::from(0), RegistrationStatus::NotRegistered);
        assert_eq!(RegistrationStatus::from(1), RegistrationStatus::Home);
        assert_eq!(RegistrationStatus::from(2), RegistrationStatus::Searching);
        assert_eq!(RegistrationStatus::from(3), RegistrationStatus::Denied);
        assert_eq!(RegistrationStatus::from(4), RegistrationStatus::Unknown);
        assert_eq!(RegistrationStatus::from(5), RegistrationStatus::Roaming);
        assert_eq!(RegistrationStatus::from(42), RegistrationStatus::Unknown);
    }

    #[test]
    fn registered_states() {
        assert!(RegistrationStatus::Home.is_registered());
        assert!(RegistrationStatus::Roaming.is_registered());
        assert!(!RegistrationStatus::Searching.is_registered());
        assert!(!RegistrationStatus::Denied.is_registered());
    }
}
