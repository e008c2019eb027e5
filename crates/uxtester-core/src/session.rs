//! Session store: API key storage plus idle expiry.
//!
//! A [`SessionStore`] is created by the caller and handed to each
//! orchestrator that should share it. There is no process-global session.

use crate::security::validate_api_key_format;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use uxtester_types::KeyError;

/// Opaque key storage capability.
pub trait KeyStore: Send + Sync {
    fn get(&self) -> Option<String>;

    /// Store a key. Fails with [`KeyError::InvalidFormat`] on a malformed key.
    fn set(&self, key: &str) -> Result<(), KeyError>;

    fn clear(&self);
}

/// In-memory [`KeyStore`]; nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    key: RwLock<Option<String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self) -> Option<String> {
        self.key.read().clone()
    }

    fn set(&self, key: &str) -> Result<(), KeyError> {
        let key = validate_api_key_format(key)?;
        *self.key.write() = Some(key);
        Ok(())
    }

    fn clear(&self) {
        *self.key.write() = None;
    }
}

/// Key storage with an idle timeout.
///
/// Every key change bumps a generation counter so holders of cached state
/// derived from the key (the confirmed working model) can tell it went stale.
pub struct SessionStore {
    keys: Box<dyn KeyStore>,
    idle_timeout: Duration,
    last_activity: Mutex<Instant>,
    generation: AtomicU64,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_key", &self.has_api_key())
            .field("idle_timeout", &self.idle_timeout)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(keys: Box<dyn KeyStore>, idle_timeout: Duration) -> Self {
        Self {
            keys,
            idle_timeout,
            last_activity: Mutex::new(Instant::now()),
            generation: AtomicU64::new(0),
        }
    }

    /// In-memory session with the given idle timeout.
    pub fn in_memory(idle_timeout: Duration) -> Self {
        Self::new(Box::new(MemoryKeyStore::new()), idle_timeout)
    }

    pub fn api_key(&self) -> Option<String> {
        self.keys.get()
    }

    pub fn has_api_key(&self) -> bool {
        self.keys.get().is_some()
    }

    pub fn set_api_key(&self, key: &str) -> Result<(), KeyError> {
        self.keys.set(key)?;
        self.bump();
        self.touch();
        Ok(())
    }

    /// Drop the key (logout).
    pub fn clear(&self) {
        self.keys.clear();
        self.bump();
    }

    /// Record user activity, extending the idle window.
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Whether the idle window has elapsed since the last activity.
    pub fn is_expired(&self) -> bool {
        self.last_activity.lock().elapsed() >= self.idle_timeout
    }

    /// Expire the session: the key is cleared exactly like a logout.
    pub fn expire(&self) {
        tracing::info!("Session idle for {:?}, clearing API key", self.idle_timeout);
        self.clear();
    }

    /// Expire the session if the idle window has elapsed. Returns whether it did.
    pub fn expire_if_idle(&self) -> bool {
        if self.is_expired() && self.has_api_key() {
            self.expire();
            return true;
        }
        false
    }

    /// Counter bumped on every key change.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
