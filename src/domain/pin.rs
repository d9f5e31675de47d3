use std::fmt;

/// Number of digits in an account PIN.
pub const PIN_LENGTH: usize = 4;

/// A validated 4-digit numeric PIN.
///
/// The value is never printed: `Debug` and `Display` redact it.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    /// Parse a PIN, accepting exactly four ASCII digits.
    pub fn parse(input: &str) -> Result<Self, InvalidPin> {
        if is_valid_pin(input) {
            Ok(Self(input.to_string()))
        } else {
            Err(InvalidPin)
        }
    }

    /// Compare an entered candidate against this PIN.
    /// Malformed candidates never match.
    pub fn matches(&self, candidate: &str) -> bool {
        // Fold over every byte so a mismatch position is not observable
        candidate.len() == self.0.len()
            && self
                .0
                .bytes()
                .zip(candidate.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

/// Returns true if the input is exactly four ASCII digits.
pub fn is_valid_pin(input: &str) -> bool {
    input.len() == PIN_LENGTH && input.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl std::str::FromStr for Pin {
    type Err = InvalidPin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pin::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPin;

impl fmt::Display for InvalidPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PIN must be exactly {} digits", PIN_LENGTH)
    }
}

impl std::error::Error for InvalidPin {}
