use std::fmt;
use thiserror::Error;

/// Largest value a four digit PIN can hold
pub const MAX_PIN: u16 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    #[error("PIN must be exactly 4 digits")]
    InvalidFormat,
    #[error("PIN {0} is outside 0000-9999")]
    OutOfRange(i64),
}

/// Four digit numeric PIN guarding the reward's hiding place.
///
/// Stored as an integer, so `"0042"` and `42` are the same PIN. A registered
/// PIN of `0000` is distinct from having no PIN at all, which is modelled as
/// `Option<Pin>::None` by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(u16);

impl Pin {
    pub fn new(value: u16) -> Result<Self, PinError> {
        if value > MAX_PIN {
            return Err(PinError::OutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Parse user input. Exactly four ASCII digits, leading zeros allowed.
    pub fn parse(input: &str) -> Result<Self, PinError> {
        let input = input.trim();
        if input.len() != 4 || !input.chars().all(|c| c.is_ascii_digit()) {
            return Err(PinError::InvalidFormat);
        }
        let value = input.parse::<u16>().map_err(|_| PinError::InvalidFormat)?;
        Self::new(value)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Compare against entered text, parsed the same way as at registration
    pub fn matches(self, entered: &str) -> bool {
        Self::parse(entered).map(|pin| pin == self).unwrap_or(false)
    }
}

impl TryFrom<i64> for Pin {
    type Error = PinError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_PIN)
            .map(Pin)
            .ok_or(PinError::OutOfRange(value))
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zeros_parse_to_same_integer() {
        let registered = Pin::parse("0042").unwrap();
        assert_eq!(registered.value(), 42);
        assert!(registered.matches("0042"));
        assert_eq!(registered.to_string(), "0042");
    }

    #[test]
    fn test_zero_is_a_real_pin() {
        let pin = Pin::parse("0000").unwrap();
        assert_eq!(pin.value(), 0);
        assert!(pin.matches("0000"));
        assert!(!pin.matches("0001"));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(Pin::parse("42"), Err(PinError::InvalidFormat));
        assert_eq!(Pin::parse("12345"), Err(PinError::InvalidFormat));
        assert_eq!(Pin::parse("12a4"), Err(PinError::InvalidFormat));
        assert_eq!(Pin::parse("-123"), Err(PinError::InvalidFormat));
        assert_eq!(Pin::parse(""), Err(PinError::InvalidFormat));
    }

    #[test]
    fn test_matches_never_accepts_garbage() {
        let pin = Pin::new(1234).unwrap();
        assert!(!pin.matches("1234 5"));
        assert!(!pin.matches("abcd"));
        assert!(pin.matches(" 1234 "));
    }

    #[test]
    fn test_range_checks() {
        assert!(Pin::new(9999).is_ok());
        assert_eq!(Pin::new(10000), Err(PinError::OutOfRange(10000)));
        assert_eq!(Pin::try_from(-1), Err(PinError::OutOfRange(-1)));
        assert_eq!(Pin::try_from(42).unwrap().value(), 42);
    }
}
