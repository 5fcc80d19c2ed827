//! Phone number normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Number of digits in a normalized phone number.
pub const PHONE_DIGITS: usize = 10;

/// A normalized ten-digit phone number.
///
/// Country codes are dropped by keeping the last ten digits, so
/// `+1 (713) 555-0100` and `713.555.0100` compare equal.
///
/// Deserialization goes through [`Phone::parse`], so a state document can
/// never hold a phone that is not ten digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Parses and normalizes a raw phone number.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MalformedPhone`] when fewer than ten digits remain.
    pub fn parse(raw: &str) -> Result<Self> {
        let digits = normalize_digits(raw);
        if digits.len() == PHONE_DIGITS {
            Ok(Self(digits))
        } else {
            Err(BridgeError::MalformedPhone {
                raw: raw.to_string(),
            })
        }
    }

    /// Parses an optional raw value; blank input yields `Ok(None)`.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::parse(value).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the number for an SMS gateway (`+1XXXXXXXXXX`).
    pub fn to_e164(&self) -> String {
        format!("+1{}", self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = BridgeError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}-{}", &self.0[..3], &self.0[3..6], &self.0[6..])
    }
}

// Strips everything but digits and keeps at most the last ten.
fn normalize_digits(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(PHONE_DIGITS);
    digits[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_normalizes() {
        let phone: Phone = serde_json::from_str("\"+1 (713) 555-0100\"").unwrap();
        assert_eq!(phone.as_str(), "7135550100");
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"7135550100\"");
    }

    #[test]
    fn test_deserialize_rejects_short_number() {
        let result: std::result::Result<Phone, _> = serde_json::from_str("\"55501\"");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("malformed phone number"));
    }

    #[test]
    fn test_strips_formatting() {
        let phone = Phone::parse("(713) 555-0100").unwrap();
        assert_eq!(phone.as_str(), "7135550100");
    }

    #[test]
    fn test_drops_country_code() {
        assert_eq!(
            Phone::parse("+1 713 555 0100").unwrap(),
            Phone::parse("713.555.0100").unwrap()
        );
    }

    #[test]
    fn test_rejects_short_numbers() {
        let err = Phone::parse("555-0100").unwrap_err();
        assert!(matches!(err, BridgeError::MalformedPhone { raw } if raw == "555-0100"));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(Phone::parse_optional(None).unwrap(), None);
        assert_eq!(Phone::parse_optional(Some("  ")).unwrap(), None);
        assert!(Phone::parse_optional(Some("12")).is_err());
    }

    #[test]
    fn test_display_and_e164() {
        let phone = Phone::parse("7135550100").unwrap();
        assert_eq!(phone.to_string(), "(713) 555-0100");
        assert_eq!(phone.to_e164(), "+17135550100");
    }
}
