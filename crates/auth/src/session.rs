//! Persisted session state.
//!
//! The signed-in principal and its bearer token live in a small key-value
//! store that outlives the process (the desktop analogue of browser local
//! storage). Writes replace an entry wholesale; reads never fail, an
//! unreadable entry simply reads as absent.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::{Principal, PrincipalSource};

/// Key of the persisted principal record.
pub const USER_KEY: &str = "user";

/// Key of the persisted bearer token.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid session key '{0}'")]
    InvalidKey(String),

    #[error("session storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode principal record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S> KeyValueStore for Box<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store for tests/dev. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one file per key.
///
/// Writes go to a uniquely named temporary sibling first and are renamed into
/// place, so a reader never observes a half-written record and concurrent
/// writers never share a temporary file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: Arc<PathBuf>,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir: Arc::new(dir) })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key).ok()?;
        std::fs::read_to_string(path).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source: io::Error| StoreError::Io {
            key: key.to_string(),
            source,
        };
        // Dropping the temp file on any error path deletes it.
        let mut tmp = tempfile::NamedTempFile::new_in(self.dir.as_path()).map_err(io_err)?;
        tmp.write_all(value.as_bytes()).map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// The persisted session: principal record plus bearer token.
///
/// `revision` counts writes and removals of the principal record made through
/// this handle; the permission gate uses it to tell when a `clear()` stops
/// applying.
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
    revision: u64,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store, revision: 0 }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist a freshly authenticated principal and its token.
    ///
    /// The previous record goes first, so a failure part-way leaves the
    /// session signed out rather than pairing one user's record with another
    /// user's token.
    pub fn login(&mut self, principal: &Principal, token: Option<&str>) -> Result<(), StoreError> {
        let record = principal.to_record()?;
        self.revision += 1;
        self.store.remove(USER_KEY)?;

        let written = match token {
            Some(token) => self.store.set(TOKEN_KEY, token),
            None => self.store.remove(TOKEN_KEY),
        }
        .and_then(|()| self.store.set(USER_KEY, &record));

        if let Err(err) = written {
            if let Err(cleanup) = self.store.remove(TOKEN_KEY) {
                tracing::warn!(error = %cleanup, "failed to drop token after aborted login");
            }
            return Err(err);
        }
        tracing::info!(
            principal_id = ?principal.id,
            roles = principal.roles.len(),
            "session started"
        );
        Ok(())
    }

    /// Replace the principal record (roles may have changed), keeping the token.
    pub fn refresh_profile(&mut self, principal: &Principal) -> Result<(), StoreError> {
        self.write_principal(principal)?;
        tracing::debug!(principal_id = ?principal.id, "principal record refreshed");
        Ok(())
    }

    /// Remove the principal record and the token.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.revision += 1;
        self.store.remove(USER_KEY)?;
        self.store.remove(TOKEN_KEY)?;
        tracing::info!("session ended");
        Ok(())
    }

    /// Current principal, leniently decoded. `None` when absent or unreadable.
    pub fn principal(&self) -> Option<Principal> {
        Principal::from_record(&self.store.get(USER_KEY)?)
    }

    /// The principal record as stored.
    pub fn record(&self) -> Option<String> {
        self.store.get(USER_KEY)
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    pub fn is_signed_in(&self) -> bool {
        self.principal().is_some()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn write_principal(&mut self, principal: &Principal) -> Result<(), StoreError> {
        let record = principal.to_record()?;
        self.revision += 1;
        self.store.set(USER_KEY, &record)
    }
}

impl<S: KeyValueStore> PrincipalSource for SessionStore<S> {
    fn raw_record(&self) -> Option<String> {
        self.record()
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
