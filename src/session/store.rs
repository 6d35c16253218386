use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

/// The two values a session keeps on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
}

impl SessionKey {
    pub const ALL: [SessionKey; 2] = [SessionKey::AccessToken, SessionKey::RefreshToken];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::AccessToken => "accessToken",
            SessionKey::RefreshToken => "refreshToken",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: Duration,
    pub path: String,
}

impl CookieOptions {
    /// httpOnly, lax, one day, root path; `Secure` only in production.
    pub fn defaults(production: bool) -> Self {
        Self {
            http_only: true,
            secure: production,
            same_site: SameSite::Lax,
            max_age: Duration::hours(24),
            path: "/".to_string(),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

/// Server-set, client-held key/value storage. Failures are logged by the
/// implementation and never surface to the caller.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: SessionKey) -> Option<String>;
    async fn set(&self, key: SessionKey, value: String, options: CookieOptions);
    async fn remove(&self, key: SessionKey);
}

/// In-process store; keeps the options of every write so tests can inspect them.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<SessionKey, (String, CookieOptions)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn options(&self, key: SessionKey) -> Option<CookieOptions> {
        self.entries.lock().await.get(&key).map(|(_, o)| o.clone())
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: SessionKey) -> Option<String> {
        self.entries.lock().await.get(&key).map(|(v, _)| v.clone())
    }

    async fn set(&self, key: SessionKey, value: String, options: CookieOptions) {
        self.entries.lock().await.insert(key, (value, options));
    }

    async fn remove(&self, key: SessionKey) {
        self.entries.lock().await.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_cookies_are_secure() {
        let dev = CookieOptions::defaults(false);
        let prod = CookieOptions::defaults(true);
        assert!(!dev.secure);
        assert!(prod.secure);
        assert!(prod.http_only);
        assert_eq!(prod.same_site, SameSite::Lax);
        assert_eq!(prod.max_age, Duration::hours(24));
        assert_eq!(prod.path, "/");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemorySessionStore::new();
        store
            .set(
                SessionKey::AccessToken,
                "tok".into(),
                CookieOptions::defaults(false),
            )
            .await;
        store.remove(SessionKey::AccessToken).await;
        store.remove(SessionKey::AccessToken).await;
        assert!(store.get(SessionKey::AccessToken).await.is_none());
        assert!(store.is_empty().await);
    }
}
