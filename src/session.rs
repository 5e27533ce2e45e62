//! Client session: bearer token, username and role list, persisted in a
//! key-value store that outlives the process (the terminal counterpart of
//! browser local storage).
//!
//! The store is the only source of truth; nothing is cached in memory.
//! sled locks its directory, so one process at a time owns a session path.
//! A second open of the same path fails with `ClientError::Storage` until the
//! first handle is dropped and its lock released.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use sled::Db;
use tracing::{debug, warn};

use crate::error::Result;

pub const TOKEN_KEY: &str = "jwtToken";
pub const USERNAME_KEY: &str = "username";
pub const ROLES_KEY: &str = "userRoles";

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

/// Minimal string key-value contract the session needs from its backing store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    /// Make preceding writes durable. No-op for volatile stores.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sled-backed store, one tree per database directory.
#[derive(Clone)]
pub struct SledStore {
    #[allow(dead_code)] // keeps the db handle alive alongside the tree
    db: Db,
    tree: sled::Tree,
}

impl SledStore {
    /// Open or create the session database at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let db = sled::open(path)?;
        let tree = db.open_tree("session")?;
        Ok(Self { db, tree })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .tree
            .get(key.as_bytes())?
            .map(|v| String::from_utf8_lossy(&v).into_owned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.tree.flush()?;
        Ok(())
    }
}

/// Volatile store for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Session lifecycle over a [`KeyValueStore`].
///
/// Roles are whatever the login response claimed. They are unsigned and only
/// decide which commands the client offers; the backend authorizes every
/// request on its own.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(Arc::new(SledStore::open(path)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    /// Persist a fresh session.
    ///
    /// Roles and username are written before the token, so any reader of
    /// this store that observes the token also observes the other two.
    pub fn set_session(&self, token: &str, username: &str, roles: &[String]) -> Result<()> {
        let roles_json = serde_json::to_string(roles)?;
        self.store.set(ROLES_KEY, &roles_json)?;
        self.store.set(USERNAME_KEY, username)?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.flush()?;
        debug!(username, roles = %roles_json, "Session stored");
        Ok(())
    }

    /// Remove token, username and roles. Token goes first so a concurrent
    /// reader never sees a token without its companions.
    pub fn clear_session(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USERNAME_KEY)?;
        self.store.remove(ROLES_KEY)?;
        self.store.flush()?;
        debug!("Session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
    }

    pub fn username(&self) -> Option<String> {
        self.read(USERNAME_KEY)
    }

    /// Persisted roles; empty when absent or unparseable.
    pub fn roles(&self) -> BTreeSet<String> {
        let Some(raw) = self.read(ROLES_KEY) else {
            return BTreeSet::new();
        };
        serde_json::from_str::<Vec<String>>(&raw)
            .map(|roles| roles.into_iter().collect())
            .unwrap_or_else(|e| {
                warn!("Ignoring unparseable role list {raw:?}: {e}");
                BTreeSet::new()
            })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().contains(role)
    }

    // Read failures are logged and read as "absent", same as a missing key.
    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            warn!("Session read of {key} failed: {e}");
            None
        })
    }

    /// Raw write access, for callers that need to seed odd states.
    pub fn backing_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::fs;
    use std::thread;
    use std::time::Duration;

    fn roles(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_login_then_logout_lifecycle() {
        let session = SessionStore::in_memory();
        assert!(!session.is_authenticated());
        assert!(session.roles().is_empty());

        session.set_session("abc", "jane", &roles(&[ROLE_ADMIN])).unwrap();
        assert!(session.is_authenticated());
        assert!(session.has_role(ROLE_ADMIN));
        assert!(!session.has_role(ROLE_USER));
        assert_eq!(session.username().as_deref(), Some("jane"));
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.clear_session().unwrap();
        assert!(session.token().is_none());
        assert!(session.username().is_none());
        assert!(!session.is_authenticated());
        assert!(!session.has_role(ROLE_ADMIN));
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        let session = SessionStore::in_memory();
        session.backing_store().set(TOKEN_KEY, "").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_corrupt_roles_read_as_empty() {
        let session = SessionStore::in_memory();
        session.backing_store().set(ROLES_KEY, "{not json").unwrap();
        assert!(session.roles().is_empty());
        assert!(!session.has_role(ROLE_ADMIN));
    }

    // sled drops its directory lock from a background thread after the last
    // handle goes away, so an immediate reopen can still see it held.
    fn open_when_released(path: &str) -> SessionStore {
        for _ in 0..100 {
            match SessionStore::open(path) {
                Ok(session) => return session,
                Err(_) => thread::sleep(Duration::from_millis(50)),
            }
        }
        SessionStore::open(path).expect("Session store still locked")
    }

    #[test]
    fn test_sled_session_is_single_process() {
        let temp_dir = std::env::temp_dir().join("ecopreco_test_session_lock");
        let _ = fs::remove_dir_all(&temp_dir);
        let path = temp_dir.to_str().unwrap().to_string();

        let held = SessionStore::open(&path).expect("Failed to open session store");
        let second = SessionStore::open(&path);
        assert!(matches!(second, Err(ClientError::Storage(_))));

        drop(held);
        let _ = fs::remove_dir_all(temp_dir);
    }

    #[test]
    fn test_sled_session_survives_reopen() {
        // Use temp dir for isolated test DB
        let temp_dir = std::env::temp_dir().join("ecopreco_test_session_reopen");
        let _ = fs::remove_dir_all(&temp_dir);
        let path = temp_dir.to_str().unwrap().to_string();

        {
            let session = SessionStore::open(&path).expect("Failed to open session store");
            session.set_session("tok-1", "admin", &roles(&[ROLE_ADMIN, ROLE_USER])).unwrap();
        }

        let reopened = open_when_released(&path);
        assert_eq!(reopened.token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.roles().len(), 2);
        assert!(reopened.has_role(ROLE_USER));

        reopened.clear_session().unwrap();
        assert!(!reopened.is_authenticated());

        drop(reopened);
        let _ = fs::remove_dir_all(temp_dir);
    }
}
