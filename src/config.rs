use std::str::FromStr;

use tracing::warn;

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongodb_uri: String,
    pub db_name: String,
    pub bind_addr: String,

    /// Enables `Secure` on session cookies.
    pub production: bool,

    pub jwt_access_secret: Option<String>,
    pub jwt_refresh_secret: Option<String>,
    pub jwt_access_ttl_seconds: i64,
    pub jwt_refresh_ttl_seconds: i64,

    pub session_check_interval_seconds: u64,

    pub auth_rate_limit: bool,
    pub auth_rate_per_second: u64,
    pub auth_rate_burst: u32,

    pub resend_api_key: Option<String>,
    pub mail_from: String,
    pub contact_inbox: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            db_name: "portfolio".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            production: false,
            jwt_access_secret: None,
            jwt_refresh_secret: None,
            jwt_access_ttl_seconds: 60,
            jwt_refresh_ttl_seconds: 3 * 60,
            session_check_interval_seconds: 5 * 60,
            auth_rate_limit: false,
            auth_rate_per_second: 1,
            auth_rate_burst: 10,
            resend_api_key: None,
            mail_from: "Portfolio <noreply@localhost>".to_string(),
            contact_inbox: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match var(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value"))),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Config::default();

        let mongodb_uri =
            var("MONGODB_URI").ok_or_else(|| AppError::Config("MONGODB_URI is required".into()))?;

        let jwt_access_secret = var("JWT_SECRET");
        if jwt_access_secret.is_none() {
            warn!("JWT_SECRET is not set; logins will fail until it is configured");
        }
        let jwt_refresh_secret = match var("JWT_REFRESH_SECRET") {
            Some(secret) => Some(secret),
            None => {
                warn!("JWT_REFRESH_SECRET is not set; refresh tokens fall back to JWT_SECRET");
                jwt_access_secret.clone()
            }
        };

        let cfg = Self {
            mongodb_uri,
            db_name: var("DB_NAME").unwrap_or(defaults.db_name),
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            production: var("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
            jwt_access_secret,
            jwt_refresh_secret,
            jwt_access_ttl_seconds: parsed("JWT_ACCESS_TTL_SECONDS", defaults.jwt_access_ttl_seconds)?,
            jwt_refresh_ttl_seconds: parsed(
                "JWT_REFRESH_TTL_SECONDS",
                defaults.jwt_refresh_ttl_seconds,
            )?,
            session_check_interval_seconds: parsed(
                "SESSION_CHECK_INTERVAL_SECONDS",
                defaults.session_check_interval_seconds,
            )?,
            auth_rate_limit: parsed("AUTH_RATE_LIMIT", true)?,
            auth_rate_per_second: parsed("AUTH_RATE_PER_SECOND", defaults.auth_rate_per_second)?,
            auth_rate_burst: parsed("AUTH_RATE_BURST", defaults.auth_rate_burst)?,
            resend_api_key: var("RESEND_API_KEY"),
            mail_from: var("MAIL_FROM").unwrap_or(defaults.mail_from),
            contact_inbox: var("CONTACT_INBOX"),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_access_ttl_seconds <= 0 || self.jwt_refresh_ttl_seconds <= 0 {
            return Err(AppError::Config("token TTLs must be positive".into()));
        }
        if self.session_check_interval_seconds == 0 {
            return Err(AppError::Config(
                "SESSION_CHECK_INTERVAL_SECONDS must be positive".into(),
            ));
        }
        if self.jwt_refresh_ttl_seconds < self.jwt_access_ttl_seconds {
            warn!("refresh token TTL is shorter than the access token TTL");
        }
        Ok(())
    }

    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.jwt_access_ttl_seconds)
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.jwt_refresh_ttl_seconds)
    }

    pub fn session_check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_check_interval_seconds)
    }
}
