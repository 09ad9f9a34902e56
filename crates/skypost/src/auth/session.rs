//! The authenticated session triple.

use std::fmt;

use crate::types::{Did, ServiceUrl};

use super::AccessToken;

/// The result of a successful login: a bearer token plus the account's
/// identifiers, bound to the service that issued them.
///
/// Sessions are immutable. A new login or refresh produces a new value; the
/// credential store, not this struct, decides whether the user is logged in.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    access_token: AccessToken,
    user_id: Did,
    handle: String,
    service: ServiceUrl,
}

impl AuthSession {
    /// Assemble a session from its parts.
    pub fn new(
        access_token: AccessToken,
        user_id: Did,
        handle: impl Into<String>,
        service: ServiceUrl,
    ) -> Self {
        Self {
            access_token,
            user_id,
            handle: handle.into(),
            service,
        }
    }

    /// Returns the bearer token.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the stable account identifier.
    pub fn user_id(&self) -> &Did {
        &self.user_id
    }

    /// Returns the handle the account logged in as.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Returns the service the token was issued by. The token is only ever
    /// sent back to this service.
    pub fn service(&self) -> &ServiceUrl {
        &self.service
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("handle", &self.handle)
            .field("service", &self.service.as_str())
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_token() {
        let session = AuthSession::new(
            AccessToken::new("tok123"),
            Did::new("did:plc:abc").unwrap(),
            "alice.bsky.social",
            ServiceUrl::default(),
        );
        let debug = format!("{:?}", session);
        assert!(debug.contains("did:plc:abc"));
        assert!(debug.contains("alice.bsky.social"));
        assert!(!debug.contains("tok123"));
    }
}
