use async_trait::async_trait;
use axum_extra::extract::cookie::{self, Cookie, CookieJar};
use tokio::sync::Mutex;

use super::store::{CookieOptions, SameSite, SessionKey, SessionStore};

/// Session storage backed by the request's cookie jar. Writes accumulate in
/// the jar, which the handler returns with its response.
#[derive(Debug, Default)]
pub struct CookieSession {
    jar: Mutex<CookieJar>,
}

impl CookieSession {
    pub fn new(jar: CookieJar) -> Self {
        Self {
            jar: Mutex::new(jar),
        }
    }

    /// Hands back the jar with every write applied so far.
    pub async fn take_jar(&self) -> CookieJar {
        std::mem::take(&mut *self.jar.lock().await)
    }
}

fn same_site(s: SameSite) -> cookie::SameSite {
    match s {
        SameSite::Strict => cookie::SameSite::Strict,
        SameSite::Lax => cookie::SameSite::Lax,
        SameSite::None => cookie::SameSite::None,
    }
}

pub fn build_cookie(key: SessionKey, value: String, options: &CookieOptions) -> Cookie<'static> {
    Cookie::build((key.as_str(), value))
        .http_only(options.http_only)
        .secure(options.secure)
        .same_site(same_site(options.same_site))
        .max_age(time::Duration::seconds(options.max_age.num_seconds()))
        .path(options.path.clone())
        .build()
}

#[async_trait]
impl SessionStore for CookieSession {
    async fn get(&self, key: SessionKey) -> Option<String> {
        self.jar
            .lock()
            .await
            .get(key.as_str())
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    }

    async fn set(&self, key: SessionKey, value: String, options: CookieOptions) {
        let mut jar = self.jar.lock().await;
        let current = std::mem::take(&mut *jar);
        *jar = current.add(build_cookie(key, value, &options));
    }

    async fn remove(&self, key: SessionKey) {
        let mut jar = self.jar.lock().await;
        let current = std::mem::take(&mut *jar);
        *jar = current.remove(Cookie::build(key.as_str()).path("/"));
    }
}
