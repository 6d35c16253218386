use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::Mutex;
use tracing::debug;

use super::store::{CookieOptions, SessionKey, SessionStore};

/// One client's token pair.
///
/// Every write goes through here so that a purge (logout, failed refresh,
/// account deletion) always wins over a refresh that started before it:
/// purging bumps the epoch, and a refresh only persists its new access token if
/// the epoch it started under is still current.
pub struct Session {
    store: Arc<dyn SessionStore>,
    epoch: AtomicU64,
    writes: Mutex<()>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            epoch: AtomicU64::new(0),
            writes: Mutex::new(()),
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub async fn get(&self, key: SessionKey) -> Option<String> {
        self.store.get(key).await
    }

    pub async fn store(&self, key: SessionKey, value: String, options: CookieOptions) {
        let _guard = self.writes.lock().await;
        self.store.set(key, value, options).await;
    }

    pub async fn remove(&self, key: SessionKey) {
        let _guard = self.writes.lock().await;
        self.store.remove(key).await;
    }

    /// Writes only if no purge happened since `epoch` was read.
    pub async fn store_if_current(
        &self,
        epoch: u64,
        key: SessionKey,
        value: String,
        options: CookieOptions,
    ) -> bool {
        let _guard = self.writes.lock().await;
        if self.epoch() != epoch {
            debug!(key = key.as_str(), "session purged meanwhile, dropping write");
            return false;
        }
        self.store.set(key, value, options).await;
        true
    }

    pub async fn purge(&self) {
        let _guard = self.writes.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        for key in SessionKey::ALL {
            self.store.remove(key).await;
        }
    }
}
