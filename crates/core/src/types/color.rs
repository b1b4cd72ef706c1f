//! Hex colour used to paint tags in the UI.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a `#RRGGBB` colour.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("colour must look like #RRGGBB, got {0:?}")]
pub struct HexColorError(pub String);

/// A `#RRGGBB` colour. Stored upper-cased.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a colour, accepting either case.
    ///
    /// # Errors
    ///
    /// Returns [`HexColorError`] unless the input is `#` followed by exactly
    /// six hex digits.
    pub fn parse(s: &str) -> Result<Self, HexColorError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| HexColorError(s.to_owned()))?;

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HexColorError(s.to_owned()));
        }

        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    /// Returns the colour as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        assert_eq!(HexColor::parse("#e26c2d").unwrap().as_str(), "#E26C2D");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(HexColor::parse("e26c2d").is_err());
        assert!(HexColor::parse("#e26c2").is_err());
        assert!(HexColor::parse("#e26c2g").is_err());
    }
}
