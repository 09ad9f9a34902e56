//! Credential storage.
//!
//! The store is the single source of truth for whether the user is logged
//! in. [`ApiClient`](crate::ApiClient) reads the session from it on every
//! authenticated call and writes it after login or refresh, always as one
//! unit: one [`CredentialStore::get_many`] to read, one
//! [`CredentialStore::apply`] to write.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::auth::{AccessToken, AuthSession, RefreshToken};
use crate::error::StoreError;
use crate::types::{Did, ServiceUrl};

/// Key for the access JWT.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Key for the account DID.
pub const USER_ID_KEY: &str = "userDID";
/// Key for the account handle.
pub const HANDLE_KEY: &str = "handle";
/// Key for the refresh JWT.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Key for the base URL of the service that issued the tokens.
pub const SERVICE_KEY: &str = "service";

// Token first: a store that applies these in order and stops early is left
// without a token, which reads as logged out.
const SESSION_KEYS: [&str; 5] = [
    ACCESS_TOKEN_KEY,
    USER_ID_KEY,
    HANDLE_KEY,
    REFRESH_TOKEN_KEY,
    SERVICE_KEY,
];

/// A key/value store for session credentials, e.g. a platform keychain.
pub trait CredentialStore: Send {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// Read several values from one snapshot of the store.
    ///
    /// The default reads the keys one by one. Stores shared with other
    /// processes should override it so a concurrent [`apply`](Self::apply)
    /// is seen entirely or not at all.
    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Apply several changes as one unit. `None` removes the key.
    ///
    /// The default applies the changes in order and stops at the first
    /// error. Stores that can commit atomically should override it.
    fn apply(&mut self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        for (key, value) in changes {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.delete(key)?,
            }
        }
        Ok(())
    }
}

/// The persisted form of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredSession {
    pub session: AuthSession,
    pub refresh_token: Option<RefreshToken>,
}

/// Load the session, if the store holds a complete and valid one.
///
/// A store with a token but no DID or service (or values that no longer
/// parse) counts as logged out.
pub(crate) fn load_session<S: CredentialStore + ?Sized>(
    store: &S,
) -> Result<Option<StoredSession>, StoreError> {
    let values = store.get_many(&SESSION_KEYS)?;
    let [token, user_id, handle, refresh_token, service]: [Option<String>; 5] =
        values.try_into().map_err(|values: Vec<_>| StoreError::Corrupt {
            path: "credential store".to_string(),
            message: format!("expected {} values, got {}", SESSION_KEYS.len(), values.len()),
        })?;

    let (Some(token), Some(user_id), Some(service)) = (token, user_id, service) else {
        return Ok(None);
    };
    if token.is_empty() {
        return Ok(None);
    }
    let Ok(user_id) = Did::new(user_id) else {
        tracing::warn!("Stored user id is not a valid DID; treating as logged out");
        return Ok(None);
    };
    let Ok(service) = ServiceUrl::new(&service) else {
        tracing::warn!("Stored service is not a valid URL; treating as logged out");
        return Ok(None);
    };

    Ok(Some(StoredSession {
        session: AuthSession::new(
            AccessToken::new(token),
            user_id,
            handle.unwrap_or_default(),
            service,
        ),
        refresh_token: refresh_token.map(RefreshToken::new),
    }))
}

/// Replace the stored session. On failure the previous values are put back.
pub(crate) fn save_session<S: CredentialStore + ?Sized>(
    store: &mut S,
    stored: &StoredSession,
) -> Result<(), StoreError> {
    let previous = store.get_many(&SESSION_KEYS)?;

    let session = &stored.session;
    let changes = [
        (ACCESS_TOKEN_KEY, Some(session.access_token().as_str())),
        (USER_ID_KEY, Some(session.user_id().as_str())),
        (HANDLE_KEY, Some(session.handle())),
        (
            REFRESH_TOKEN_KEY,
            stored.refresh_token.as_ref().map(RefreshToken::as_str),
        ),
        (SERVICE_KEY, Some(session.service().as_str())),
    ];

    if let Err(e) = store.apply(&changes) {
        let restore: Vec<_> = SESSION_KEYS
            .iter()
            .zip(&previous)
            .map(|(key, value)| (*key, value.as_deref()))
            .collect();
        if let Err(restore) = store.apply(&restore) {
            tracing::error!(error = %restore, "Failed to restore previous session after write error");
        }
        return Err(e);
    }
    Ok(())
}

/// Remove every session key.
pub(crate) fn clear_session<S: CredentialStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let changes: [(&str, Option<&str>); 5] = SESSION_KEYS.map(|key| (key, None));
    store.apply(&changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(token: &str, did: &str, handle: &str) -> StoredSession {
        StoredSession {
            session: AuthSession::new(
                AccessToken::new(token),
                Did::new(did).unwrap(),
                handle,
                ServiceUrl::new("https://bsky.test").unwrap(),
            ),
            refresh_token: Some(RefreshToken::new(format!("refresh-{}", token))),
        }
    }

    /// Fails every `set` or `delete` after the first `ok_writes`.
    struct FlakyStore {
        inner: MemoryStore,
        ok_writes: usize,
        armed: bool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                ok_writes: 0,
                armed: false,
            }
        }

        fn arm(&mut self, ok_writes: usize) {
            self.armed = true;
            self.ok_writes = ok_writes;
        }

        fn check(&mut self) -> Result<(), StoreError> {
            if self.armed {
                if self.ok_writes == 0 {
                    self.armed = false;
                    return Err(StoreError::Io {
                        path: "flaky".to_string(),
                        source: std::io::Error::other("disk full"),
                    });
                }
                self.ok_writes -= 1;
            }
            Ok(())
        }
    }

    impl CredentialStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.set(key, value)
        }

        fn delete(&mut self, key: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(key)
        }
    }

    #[test]
    fn save_then_load() {
        let mut store = MemoryStore::new();
        let session = stored("tok123", "did:plc:abc", "alice.bsky.social");
        save_session(&mut store, &session).unwrap();
        assert_eq!(load_session(&store).unwrap(), Some(session));
        assert_eq!(
            store.get(SERVICE_KEY).unwrap().as_deref(),
            Some("https://bsky.test/")
        );
    }

    #[test]
    fn incomplete_store_is_logged_out() {
        let mut store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, "tok123").unwrap();
        assert!(load_session(&store).unwrap().is_none());

        store.set(USER_ID_KEY, "not-a-did").unwrap();
        assert!(load_session(&store).unwrap().is_none());
    }

    #[test]
    fn session_without_service_is_logged_out() {
        let mut store = MemoryStore::new();
        save_session(&mut store, &stored("tok123", "did:plc:abc", "alice.test")).unwrap();

        store.delete(SERVICE_KEY).unwrap();
        assert!(load_session(&store).unwrap().is_none());

        store.set(SERVICE_KEY, "ftp://bsky.test").unwrap();
        assert!(load_session(&store).unwrap().is_none());
    }

    #[test]
    fn failed_write_restores_previous_session() {
        let mut store = FlakyStore::new();
        let old = stored("old", "did:plc:old", "old.test");
        save_session(&mut store, &old).unwrap();

        store.arm(2);
        let new = stored("new", "did:plc:new", "new.test");
        assert!(save_session(&mut store, &new).is_err());

        assert_eq!(load_session(&store).unwrap(), Some(old));
    }

    #[test]
    fn clear_removes_everything() {
        let mut store = MemoryStore::new();
        save_session(&mut store, &stored("tok", "did:plc:abc", "alice.test")).unwrap();
        clear_session(&mut store).unwrap();
        for key in SESSION_KEYS {
            assert!(store.get(key).unwrap().is_none());
        }
    }

    #[test]
    fn interrupted_clear_reads_as_logged_out() {
        let mut store = FlakyStore::new();
        save_session(&mut store, &stored("tok", "did:plc:abc", "alice.test")).unwrap();

        store.arm(1);
        assert!(clear_session(&mut store).is_err());

        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(USER_ID_KEY).unwrap().is_some());
        assert!(load_session(&store).unwrap().is_none());
    }
}
