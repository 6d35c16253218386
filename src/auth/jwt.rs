use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::Config,
    errors::AppError,
    models::jwt::{Claims, Subject, TokenKind},
};

#[derive(Clone)]
pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    pub fn from_secret(secret: &str) -> Self {
        let secret = secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Signs and checks session tokens. Each kind has its own HS256 key.
#[derive(Clone)]
pub struct TokenCodec {
    access: Option<Keys>,
    refresh: Option<Keys>,
}

pub fn new_claims(subject: &Subject, kind: TokenKind, ttl: Duration, now: DateTime<Utc>) -> Claims {
    let iat = now.timestamp();
    Claims {
        user_id: subject.user_id.clone(),
        username: subject.username.clone(),
        kind: match kind {
            TokenKind::Access => None,
            TokenKind::Refresh => Some(TokenKind::Refresh),
        },
        iat,
        exp: iat + ttl.num_seconds(),
        jti: Uuid::new_v4().to_string(),
    }
}

fn validation() -> Validation {
    // Expiry is checked against the injected clock, not the system time.
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = false;
    v.validate_aud = false;
    v.set_required_spec_claims(&["exp"]);
    v
}

impl TokenCodec {
    pub fn new(access_secret: Option<&str>, refresh_secret: Option<&str>) -> Self {
        Self {
            access: access_secret.map(Keys::from_secret),
            refresh: refresh_secret.map(Keys::from_secret),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.jwt_access_secret.as_deref(),
            cfg.jwt_refresh_secret.as_deref(),
        )
    }

    fn keys(&self, kind: TokenKind) -> Result<&Keys, AppError> {
        let keys = match kind {
            TokenKind::Access => self.access.as_ref(),
            TokenKind::Refresh => self.refresh.as_ref(),
        };
        keys.ok_or_else(|| AppError::Signing(format!("no {} token secret configured", kind.as_str())))
    }

    pub fn issue(
        &self,
        subject: &Subject,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let keys = self.keys(kind)?;
        let claims = new_claims(subject, kind, ttl, now);
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AppError::Signing(e.to_string()))
    }

    pub fn verify(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Subject, AppError> {
        let keys = self.keys(kind)?;

        let claims = match decode::<Claims>(token, &keys.decoding, &validation()) {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
                // Separate secrets: a token of the other kind fails the signature check
                // here, so try the other key before calling it forged.
                if self.signed_as(token, kind.other()) {
                    return Err(AppError::WrongKind);
                }
                return Err(AppError::InvalidSignature);
            }
            Err(e) => {
                debug!(kind = kind.as_str(), error = ?e.kind(), "token rejected");
                return Err(AppError::InvalidSignature);
            }
        };

        if claims.kind() != kind {
            return Err(AppError::WrongKind);
        }
        if now.timestamp() >= claims.exp {
            return Err(AppError::ExpiredToken);
        }
        Ok(claims.subject())
    }

    fn signed_as(&self, token: &str, kind: TokenKind) -> bool {
        let Ok(keys) = self.keys(kind) else {
            return false;
        };
        decode::<Claims>(token, &keys.decoding, &validation())
            .map(|data| data.claims.kind() == kind)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Subject {
        Subject {
            user_id: "65f0c0ffee0000000000beef".into(),
            username: "ada@example.com".into(),
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn access_token_verifies_until_ttl_elapses() {
        let codec = TokenCodec::new(Some("access-secret"), Some("refresh-secret"));
        let ttl = Duration::seconds(60);
        let token = codec.issue(&subject(), TokenKind::Access, ttl, t0()).unwrap();

        let got = codec
            .verify(&token, TokenKind::Access, t0() + Duration::seconds(59))
            .unwrap();
        assert_eq!(got, subject());

        let expired = codec.verify(&token, TokenKind::Access, t0() + Duration::seconds(60));
        assert!(matches!(expired, Err(AppError::ExpiredToken)));
    }

    #[test]
    fn refresh_token_is_never_an_access_token() {
        let split = TokenCodec::new(Some("access-secret"), Some("refresh-secret"));
        let shared = TokenCodec::new(Some("same"), Some("same"));

        for codec in [split, shared] {
            let refresh = codec
                .issue(&subject(), TokenKind::Refresh, Duration::seconds(180), t0())
                .unwrap();
            assert!(matches!(
                codec.verify(&refresh, TokenKind::Access, t0()),
                Err(AppError::WrongKind)
            ));

            let access = codec
                .issue(&subject(), TokenKind::Access, Duration::seconds(60), t0())
                .unwrap();
            assert!(matches!(
                codec.verify(&access, TokenKind::Refresh, t0()),
                Err(AppError::WrongKind)
            ));
        }
    }

    #[test]
    fn foreign_secret_is_an_invalid_signature() {
        let ours = TokenCodec::new(Some("secret-A"), Some("secret-A-refresh"));
        let theirs = TokenCodec::new(Some("secret-B"), Some("secret-B-refresh"));
        let token = theirs
            .issue(&subject(), TokenKind::Access, Duration::seconds(60), t0())
            .unwrap();

        assert!(matches!(
            ours.verify(&token, TokenKind::Access, t0()),
            Err(AppError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_an_invalid_signature() {
        let codec = TokenCodec::new(Some("access-secret"), None);
        assert!(matches!(
            codec.verify("not.a.jwt", TokenKind::Access, t0()),
            Err(AppError::InvalidSignature)
        ));
    }

    #[test]
    fn missing_secret_is_a_signing_error() {
        let codec = TokenCodec::new(Some("access-secret"), None);
        let res = codec.issue(&subject(), TokenKind::Refresh, Duration::seconds(180), t0());
        assert!(matches!(res, Err(AppError::Signing(_))));
    }

    #[test]
    fn payload_uses_wire_field_names() {
        let refresh = new_claims(&subject(), TokenKind::Refresh, Duration::seconds(180), t0());
        let json = serde_json::to_value(&refresh).unwrap();
        assert_eq!(json["userId"], "65f0c0ffee0000000000beef");
        assert_eq!(json["username"], "ada@example.com");
        assert_eq!(json["type"], "refresh");
        assert_eq!(json["exp"], 1_700_000_180);

        let access = new_claims(&subject(), TokenKind::Access, Duration::seconds(60), t0());
        let json = serde_json::to_value(&access).unwrap();
        assert!(json.get("type").is_none());
    }
}
