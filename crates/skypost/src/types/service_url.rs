//! Service base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// The default Bluesky entryway.
pub(crate) const DEFAULT_SERVICE: &str = "https://bsky.social";

/// A validated XRPC service base URL.
///
/// The URL must be absolute and use HTTPS; plain HTTP is accepted only for
/// localhost so tests can target a local mock server.
///
/// # Example
///
/// ```
/// use skypost::ServiceUrl;
///
/// let service = ServiceUrl::new("https://bsky.social").unwrap();
/// assert_eq!(service.xrpc_url("com.atproto.server.createSession"),
///            "https://bsky.social/xrpc/com.atproto.server.createSession");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    /// Create a new service URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not HTTPS.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| invalid(s, e.to_string()))?;

        if url.cannot_be_a_base() {
            return Err(invalid(s, "must be an absolute URL"));
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");
        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid(s, "must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.host_str().is_none() {
            return Err(invalid(s, "must have a host"));
        }

        Ok(Self(url))
    }

    /// Returns the XRPC endpoint URL for a given method.
    pub fn xrpc_url(&self, method: &str) -> String {
        // Url always renders a root path as "/"
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/xrpc/{}", base, method)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

fn invalid(value: &str, reason: impl Into<String>) -> Error {
    InvalidInputError::ServiceUrl {
        value: value.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl Default for ServiceUrl {
    fn default() -> Self {
        Self(Url::parse(DEFAULT_SERVICE).expect("default service URL is valid"))
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServiceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
