//! File-backed credential store.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::StoreError;

use super::CredentialStore;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// A credential store persisted as a JSON object in a single file.
///
/// Writes go through a temp file and a rename while holding an exclusive
/// lock on `<file>.lock`; reads hold a shared lock on the same file. A batch
/// passed to [`apply`](CredentialStore::apply) is one rename, so another
/// process sees all of it or none of it. On Unix the file is created with
/// mode 0600.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn open_lock(&self) -> std::io::Result<File> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.path.with_extension("lock"))
    }

    /// Read the whole file under a shared lock.
    fn snapshot(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let lock_file = match self.open_lock() {
            Ok(file) => file,
            // No directory yet, so nothing was ever written.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        lock_file.lock_shared().map_err(|e| self.io_error(e))?;

        let result = self.read();

        lock_file.unlock().map_err(|e| self.io_error(e))?;
        result
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let lock_file = self.open_lock().map_err(|e| self.io_error(e))?;
        lock_file.lock_exclusive().map_err(|e| self.io_error(e))?;

        let result = self.read().and_then(|mut values| {
            apply(&mut values);
            self.write(&values)
        });

        lock_file.unlock().map_err(|e| self.io_error(e))?;
        result
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(values).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&temp_path)
                .map_err(|e| self.io_error(e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(|e| self.io_error(e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), keys = values.len(), "Credential store written");
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.snapshot()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.apply(&[(key, Some(value))])
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.apply(&[(key, None)])
    }

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let mut values = self.snapshot()?;
        Ok(keys.iter().map(|key| values.remove(*key)).collect())
    }

    fn apply(&mut self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        if !self.path.exists() && changes.iter().all(|(_, value)| value.is_none()) {
            return Ok(());
        }
        self.update(|values| {
            for (key, value) in changes {
                match value {
                    Some(value) => {
                        values.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        values.remove(*key);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));
        assert_eq!(store.get("accessToken").unwrap(), None);
    }

    #[test]
    fn values_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let mut store = FileStore::new(&path);
        store.set("accessToken", "tok123").unwrap();
        store.set("handle", "alice.test").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("accessToken").unwrap().as_deref(), Some("tok123"));
        assert_eq!(reopened.get("handle").unwrap().as_deref(), Some("alice.test"));
    }

    #[test]
    fn delete_removes_only_that_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("credentials.json"));
        store.set("accessToken", "tok123").unwrap();
        store.set("handle", "alice.test").unwrap();

        store.delete("accessToken").unwrap();
        assert_eq!(store.get("accessToken").unwrap(), None);
        assert_eq!(store.get("handle").unwrap().as_deref(), Some("alice.test"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("handle"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn apply_writes_batch_in_one_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let mut store = FileStore::new(&path);
        store.set("refreshToken", "old").unwrap();

        store
            .apply(&[
                ("accessToken", Some("tok123")),
                ("handle", Some("alice.test")),
                ("refreshToken", None),
            ])
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened
                .get_many(&["accessToken", "handle", "refreshToken"])
                .unwrap(),
            vec![Some("tok123".to_string()), Some("alice.test".to_string()), None]
        );
    }

    #[test]
    fn concurrent_reader_never_sees_mixed_session() {
        use std::thread;

        use crate::auth::{AccessToken, AuthSession, RefreshToken};
        use crate::store::{StoredSession, load_session, save_session};
        use crate::types::{Did, ServiceUrl};

        fn session(name: &str) -> StoredSession {
            StoredSession {
                session: AuthSession::new(
                    AccessToken::new(format!("tok-{}", name)),
                    Did::new(format!("did:plc:{}", name)).unwrap(),
                    format!("{}.test", name),
                    ServiceUrl::new("https://bsky.test").unwrap(),
                ),
                refresh_token: Some(RefreshToken::new(format!("ref-{}", name))),
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let sessions = [session("a"), session("b")];
        save_session(&mut FileStore::new(&path), &sessions[0]).unwrap();

        let writer = {
            let path = path.clone();
            let sessions = sessions.clone();
            thread::spawn(move || {
                let mut store = FileStore::new(&path);
                for i in 0..200 {
                    save_session(&mut store, &sessions[i % 2]).unwrap();
                }
            })
        };

        let reader = FileStore::new(&path);
        loop {
            let finished = writer.is_finished();
            let loaded = load_session(&reader).unwrap().expect("session present");
            assert!(
                sessions.contains(&loaded),
                "mixed session observed: {:?}",
                loaded.session
            );
            if finished {
                break;
            }
        }
        writer.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let mut store = FileStore::new(&path);
        store.set("accessToken", "tok123").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
