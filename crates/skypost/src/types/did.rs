//! Decentralized Identifier (DID) type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated account identifier.
///
/// Bluesky accounts are identified by `did:plc:` or `did:web:` DIDs. The DID
/// is the stable user id; the handle may change.
///
/// # Example
///
/// ```
/// use skypost::Did;
///
/// let did = Did::new("did:plc:z72i7hdynmk6r22z27h6tvur").unwrap();
/// assert_eq!(did.method(), "plc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a new DID from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the string is not `did:<method>:<id>`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        validate(&s).map_err(|reason| InvalidInputError::Did {
            value: s.clone(),
            reason: reason.to_string(),
        })?;
        Ok(Self(s))
    }

    /// Returns the DID method (e.g., "plc" for "did:plc:...").
    pub fn method(&self) -> &str {
        self.0
            .strip_prefix("did:")
            .and_then(|s| s.split(':').next())
            .unwrap_or("")
    }

    /// Returns the full DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(s: &str) -> Result<(), &'static str> {
    let rest = s.strip_prefix("did:").ok_or("must start with 'did:'")?;
    let (method, identifier) = rest
        .split_once(':')
        .ok_or("must have format 'did:<method>:<identifier>'")?;

    if method.is_empty() || !method.chars().all(|c| c.is_ascii_lowercase()) {
        return Err("method must be non-empty lowercase letters");
    }
    if identifier.is_empty() {
        return Err("identifier must be non-empty");
    }
    Ok(())
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_plc_did() {
        let did = Did::new("did:plc:abc").unwrap();
        assert_eq!(did.method(), "plc");
        assert_eq!(did.as_str(), "did:plc:abc");
    }

    #[test]
    fn valid_web_did() {
        let did = Did::new("did:web:example.com").unwrap();
        assert_eq!(did.method(), "web");
    }

    #[test]
    fn rejects_handles() {
        assert!(Did::new("alice.bsky.social").is_err());
    }

    #[test]
    fn rejects_missing_identifier() {
        assert!(Did::new("did:plc:").is_err());
    }

    #[test]
    fn rejects_missing_method() {
        assert!(Did::new("did::identifier").is_err());
    }

    #[test]
    fn deserialize_validates() {
        assert!(serde_json::from_str::<Did>("\"did:plc:abc\"").is_ok());
        assert!(serde_json::from_str::<Did>("\"not-a-did\"").is_err());
    }
}
