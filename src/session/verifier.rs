use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use super::{
    context::Session,
    store::{CookieOptions, SessionKey},
};
use crate::{
    auth::jwt::TokenCodec,
    clock::Clock,
    config::Config,
    errors::AppError,
    models::jwt::{Subject, TokenKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoToken,
    ValidAccess,
    ExpiredAccess,
    RefreshedOk,
    RefreshFailed,
}

#[derive(Debug, Clone)]
pub struct Verified {
    pub subject: Subject,
    pub state: SessionState,
}

/// Decides whether a session is still authenticated, refreshing the access
/// token from the refresh token when it has lapsed.
#[derive(Clone)]
pub struct SessionVerifier {
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    production: bool,
}

impl SessionVerifier {
    pub fn new(codec: Arc<TokenCodec>, clock: Arc<dyn Clock>, cfg: &Config) -> Self {
        Self {
            codec,
            clock,
            access_ttl: cfg.access_ttl(),
            refresh_ttl: cfg.refresh_ttl(),
            production: cfg.production,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    pub fn cookie_options(&self, kind: TokenKind) -> CookieOptions {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        CookieOptions::defaults(self.production).with_max_age(ttl)
    }

    /// Terminal success yields the subject; terminal failure is `Unauthenticated`
    /// (server-side failures such as a missing signing secret pass through).
    pub async fn verify(&self, session: &Session) -> Result<Verified, AppError> {
        let state = match session.get(SessionKey::AccessToken).await {
            None => SessionState::NoToken,
            Some(token) => match self.codec.verify(&token, TokenKind::Access, self.clock.now()) {
                Ok(subject) => {
                    return Ok(Verified {
                        subject,
                        state: SessionState::ValidAccess,
                    })
                }
                Err(e) => {
                    debug!(error = %e, "access token rejected");
                    SessionState::ExpiredAccess
                }
            },
        };

        debug!(?state, "attempting refresh");
        match self.refresh(session).await {
            Ok(subject) => Ok(Verified {
                subject,
                state: SessionState::RefreshedOk,
            }),
            Err(e) if e.status().is_server_error() => Err(e),
            Err(_) => Err(AppError::Unauthenticated),
        }
    }

    /// Mints a new access token from the stored refresh token. Any failure
    /// purges both tokens.
    pub async fn refresh(&self, session: &Session) -> Result<Subject, AppError> {
        let epoch = session.epoch();
        match self.try_refresh(session, epoch).await {
            Ok(subject) => {
                info!(user_id = %subject.user_id, "access token refreshed");
                Ok(subject)
            }
            Err(e) => {
                warn!(state = ?SessionState::RefreshFailed, error = %e, "refresh failed, purging session");
                session.purge().await;
                Err(e)
            }
        }
    }

    async fn try_refresh(&self, session: &Session, epoch: u64) -> Result<Subject, AppError> {
        let token = session
            .get(SessionKey::RefreshToken)
            .await
            .ok_or(AppError::Unauthenticated)?;

        let now = self.clock.now();
        let subject = self.codec.verify(&token, TokenKind::Refresh, now)?;
        let access = self
            .codec
            .issue(&subject, TokenKind::Access, self.access_ttl, now)?;

        let stored = session
            .store_if_current(
                epoch,
                SessionKey::AccessToken,
                access,
                self.cookie_options(TokenKind::Access),
            )
            .await;
        if !stored {
            return Err(AppError::Unauthenticated);
        }
        Ok(subject)
    }
}
