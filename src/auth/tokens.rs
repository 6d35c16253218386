use tracing::debug;

use crate::{
    errors::AppError,
    models::jwt::{Subject, TokenKind},
    session::{Session, SessionKey, SessionVerifier},
};

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Mints the login token pair and writes it to the session before returning.
/// Without `remember_me` only an access token is issued, and any refresh token
/// left over from an earlier login is dropped.
pub async fn issue_session_tokens(
    verifier: &SessionVerifier,
    session: &Session,
    subject: &Subject,
    remember_me: bool,
) -> Result<IssuedTokens, AppError> {
    let now = verifier.clock().now();
    let codec = verifier.codec();

    let access_token = codec.issue(subject, TokenKind::Access, verifier.access_ttl(), now)?;
    let refresh_token = if remember_me {
        Some(codec.issue(subject, TokenKind::Refresh, verifier.refresh_ttl(), now)?)
    } else {
        None
    };

    session
        .store(
            SessionKey::AccessToken,
            access_token.clone(),
            verifier.cookie_options(TokenKind::Access),
        )
        .await;

    match &refresh_token {
        Some(token) => {
            session
                .store(
                    SessionKey::RefreshToken,
                    token.clone(),
                    verifier.cookie_options(TokenKind::Refresh),
                )
                .await
        }
        None => session.remove(SessionKey::RefreshToken).await,
    }

    debug!(user_id = %subject.user_id, remember_me, "session tokens issued");
    Ok(IssuedTokens {
        access_token,
        refresh_token,
    })
}
