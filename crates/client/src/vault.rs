//! The process-wide persisted session.
//!
//! [`SessionVault`] is the single home of the bearer token and of the
//! signed-in identity. It is created once at start-up, shared (via `Arc`) by
//! the HTTP boundary and the stores, and has exactly two write paths:
//!
//! - [`SessionVault::establish`], used by the session store after a
//!   successful login or registration
//! - [`SessionVault::teardown`], used by logout and by the boundary when the
//!   API answers 401
//!
//! Both are crate-private, so code outside this crate can only read.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mid_shop_core::Identity;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::warn;

use crate::storage::{MemoryStorage, Storage, StorageError, keys};

/// Persisted session state plus the live identity channel.
pub struct SessionVault {
    storage: Arc<dyn Storage>,
    identity: watch::Sender<Option<Identity>>,
    /// Serializes the two write paths.
    writes: Mutex<()>,
}

impl SessionVault {
    /// Open the vault, restoring a previously persisted identity.
    ///
    /// A restored identity counts as signed in without contacting the server;
    /// an expired token only shows up as a 401 on the first authenticated
    /// call. A missing, unreadable or malformed identity means signed out.
    #[must_use]
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let restored = read_identity(storage.as_ref());
        if let Some(identity) = &restored {
            tracing::debug!(username = %identity.username, "Restored persisted session");
        }

        let (identity, _) = watch::channel(restored);
        Self {
            storage,
            identity,
            writes: Mutex::new(()),
        }
    }

    /// A vault backed by [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// Watch the identity. The receiver sees every login, logout and teardown.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    /// The persisted bearer token.
    pub(crate) fn token(&self) -> Option<SecretString> {
        match self.storage.get(keys::TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    /// Whether there is anything to tear down.
    pub(crate) fn has_session(&self) -> bool {
        self.is_authenticated() || self.token().is_some()
    }

    /// Persist a new session and publish its identity.
    ///
    /// Either both entries are written and the identity is published, or the
    /// previously persisted entries are put back and nothing is published.
    pub(crate) fn establish(
        &self,
        token: &SecretString,
        identity: &Identity,
    ) -> Result<(), StorageError> {
        let user = serde_json::to_string(identity)?;

        let _writes = self.lock_writes();
        let previous = [keys::TOKEN, keys::USER].map(|key| (key, self.storage.get(key)));

        let result = self
            .storage
            .set(keys::TOKEN, token.expose_secret())
            .and_then(|()| self.storage.set(keys::USER, &user));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session, restoring previous entries");
            for (key, value) in previous {
                self.restore(key, value);
            }
            return Err(e);
        }

        self.identity.send_replace(Some(identity.clone()));
        Ok(())
    }

    /// Erase the persisted token and identity and publish "signed out".
    ///
    /// Never fails: storage errors are logged and the in-memory identity is
    /// cleared regardless. Returns whether a session existed. When several
    /// callers race, exactly one of them sees `true`.
    pub(crate) fn teardown(&self) -> bool {
        let _writes = self.lock_writes();
        let had_session = self.has_session();
        self.clear_persisted();
        self.identity.send_replace(None);
        had_session
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no bad state
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn restore(&self, key: &str, previous: Result<Option<String>, StorageError>) {
        let result = match previous {
            Ok(Some(value)) => self.storage.set(key, &value),
            // An unreadable old value is dropped rather than left half-written
            Ok(None) | Err(_) => self.storage.remove(key),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to restore persisted session entry");
        }
    }

    fn clear_persisted(&self) {
        for key in [keys::TOKEN, keys::USER] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to erase persisted session entry");
            }
        }
    }
}

impl fmt::Debug for SessionVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionVault")
            .field("identity", &*self.identity.borrow())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn read_identity(storage: &dyn Storage) -> Option<Identity> {
    let stored = match storage.get(keys::USER) {
        Ok(stored) => stored?,
        Err(e) => {
            warn!(error = %e, "Failed to read persisted identity");
            return None;
        }
    };

    match serde_json::from_str(&stored) {
        Ok(identity) => Some(identity),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed persisted identity");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jane() -> Identity {
        Identity {
            username: "jane".to_owned(),
            email: "j@x.com".to_owned(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_open_empty_storage_is_signed_out() {
        let vault = SessionVault::in_memory();
        assert!(!vault.is_authenticated());
        assert!(vault.token().is_none());
        assert!(!vault.has_session());
    }

    #[test]
    fn test_open_restores_identity() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(keys::USER, r#"{"username":"jane","email":"j@x.com"}"#)
            .unwrap();
        storage.set(keys::TOKEN, "t1").unwrap();

        let vault = SessionVault::open(storage);
        assert_eq!(vault.identity(), Some(jane()));
        assert_eq!(vault.token().unwrap().expose_secret(), "t1");
    }

    #[test]
    fn test_open_ignores_malformed_identity() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::USER, "{ definitely not json").unwrap();

        let vault = SessionVault::open(storage);
        assert!(!vault.is_authenticated());
    }

    #[test]
    fn test_establish_persists_token_free_identity() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = SessionVault::open(storage.clone());

        vault
            .establish(&SecretString::from("t1"), &jane())
            .unwrap();

        assert!(vault.is_authenticated());
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("t1"));
        let user = storage.get(keys::USER).unwrap().unwrap();
        assert!(!user.contains("token"));
        assert!(!user.contains("t1"));
    }

    #[test]
    fn test_teardown_clears_everything() {
        let storage = Arc::new(MemoryStorage::new());
        let vault = SessionVault::open(storage.clone());
        vault
            .establish(&SecretString::from("t1"), &jane())
            .unwrap();

        let mut rx = vault.subscribe();
        assert!(vault.teardown());

        assert!(!vault.is_authenticated());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
        assert_eq!(storage.get(keys::USER).unwrap(), None);

        // Nothing left to tear down the second time
        assert!(!vault.teardown());
    }

    #[test]
    fn test_racing_teardowns_report_one_session() {
        for _ in 0..50 {
            let vault = SessionVault::in_memory();
            vault
                .establish(&SecretString::from("t1"), &jane())
                .unwrap();

            let ended = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| vault.teardown())).collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap())
                    .filter(|ended| *ended)
                    .count()
            });

            assert_eq!(ended, 1);
            assert!(!vault.is_authenticated());
        }
    }

    /// Memory storage whose identity writes fail once armed.
    #[derive(Default)]
    struct FailingUserWrites {
        inner: MemoryStorage,
        armed: std::sync::atomic::AtomicBool,
    }

    impl Storage for FailingUserWrites {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == keys::USER && self.armed.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(StorageError::Poisoned);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_relogin_keeps_previous_session() {
        let storage = Arc::new(FailingUserWrites::default());
        let vault = SessionVault::open(storage.clone());
        vault
            .establish(&SecretString::from("t1"), &jane())
            .unwrap();
        let jane_user = storage.get(keys::USER).unwrap();

        storage
            .armed
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let bob = Identity {
            username: "bob".to_owned(),
            email: "b@x.com".to_owned(),
            first_name: None,
            last_name: None,
        };
        assert!(vault.establish(&SecretString::from("t2"), &bob).is_err());

        // Storage and memory still agree on the old session
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("t1"));
        assert_eq!(storage.get(keys::USER).unwrap(), jane_user);
        assert_eq!(vault.identity(), Some(jane()));
        assert_eq!(vault.token().unwrap().expose_secret(), "t1");
    }

    #[test]
    fn test_failed_first_login_leaves_nothing_behind() {
        let storage = Arc::new(FailingUserWrites::default());
        storage
            .armed
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let vault = SessionVault::open(storage.clone());

        assert!(vault.establish(&SecretString::from("t1"), &jane()).is_err());

        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
        assert!(!vault.is_authenticated());
    }

    #[test]
    fn test_debug_redacts_token() {
        let vault = SessionVault::in_memory();
        vault
            .establish(&SecretString::from("super_secret_token"), &jane())
            .unwrap();
        let debug_output = format!("{vault:?}");
        assert!(debug_output.contains("jane"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
