//! Login credentials type.

use std::fmt;

/// Login credentials for `createSession`.
///
/// Holds the identifier (handle, email or DID) and the account or app
/// password.
///
/// # Security
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use skypost::Credentials;
///
/// let creds = Credentials::new("alice.bsky.social", "app-password-here");
/// assert_eq!(creds.identifier(), "alice.bsky.social");
/// ```
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// Returns the identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the password. Only used to build the login request body.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
