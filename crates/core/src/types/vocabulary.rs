//! Server-defined vocabulary tokens.
//!
//! Amenity types (`WIFI`, `PARKING_INCLUDED`, ...) and tenant preference
//! types (`VEGETARIAN`, `FEMALE_ONLY`, ...) are owned by the listing
//! service and fetched at view mount. The client never hard-codes them; it
//! only guarantees a token is a non-empty, trimmed string.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`VocabularyToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    /// The token is empty or only whitespace.
    #[error("vocabulary token cannot be empty")]
    Empty,
}

/// One entry of a server-provided vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VocabularyToken(String);

impl VocabularyToken {
    /// Create a token, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`VocabularyError::Empty`] for blank input.
    pub fn new(token: impl AsRef<str>) -> Result<Self, VocabularyError> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Err(VocabularyError::Empty);
        }
        Ok(Self(token.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label, e.g. `PARKING_INCLUDED` becomes `Parking Included`.
    #[must_use]
    pub fn label(&self) -> String {
        self.0
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let lower = word.to_ascii_lowercase();
                let mut chars = lower.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_uppercase().to_string() + chars.as_str()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'de> Deserialize<'de> for VocabularyToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for VocabularyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VocabularyToken {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for VocabularyToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims() {
        assert_eq!(VocabularyToken::new("  WIFI ").unwrap().as_str(), "WIFI");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert_eq!(VocabularyToken::new(" "), Err(VocabularyError::Empty));
    }

    #[test]
    fn test_label() {
        let token = VocabularyToken::new("WASHER_DRYER_IN_UNIT").unwrap();
        assert_eq!(token.label(), "Washer Dryer In Unit");
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        assert!(serde_json::from_str::<VocabularyToken>("\"\"").is_err());
        let token: VocabularyToken = serde_json::from_str("\"PARKING\"").unwrap();
        assert_eq!(token.as_str(), "PARKING");
    }
}
