mod common;

use common::{harness, memory_session, PASSWORD};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use portfolio_auth::{
    dto::auth::{RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest},
    models::jwt::{Claims, TokenKind},
    password::verify_password,
    repos::UserRepository,
    session::{SessionKey, SessionState},
    AppError,
};

fn claims(token: &str, secret: &str) -> Claims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .expect("decodable token")
        .claims
}

#[tokio::test]
async fn login_stores_an_access_token_for_the_user() {
    let h = harness();
    let user = h.register("Ada Lovelace", "ada@example.com").await;
    let (store, session) = memory_session();

    let me = h
        .state
        .auth
        .login(&session, "Ada@Example.com ", PASSWORD, false)
        .await
        .expect("login");
    assert_eq!(me.id, user.id);

    let access = session.get(SessionKey::AccessToken).await.expect("access token");
    let c = claims(&access, "access-secret-for-tests");
    assert_eq!(c.user_id, user.id);
    assert_eq!(c.username, "ada@example.com");
    assert_eq!(c.kind(), TokenKind::Access);
    assert_eq!(c.exp - c.iat, 60);

    let opts = store.options(SessionKey::AccessToken).await.expect("options");
    assert!(opts.http_only);
    assert_eq!(opts.max_age, chrono::Duration::seconds(60));
    assert!(session.get(SessionKey::RefreshToken).await.is_none());
}

#[tokio::test]
async fn remember_me_adds_a_refresh_token() {
    let h = harness();
    let user = h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();

    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");

    let refresh = session.get(SessionKey::RefreshToken).await.expect("refresh token");
    let c = claims(&refresh, "refresh-secret-for-tests");
    assert_eq!(c.kind(), TokenKind::Refresh);
    assert_eq!(c.user_id, user.id);
    assert_eq!(c.exp - c.iat, 180);
    assert_eq!(
        store.options(SessionKey::RefreshToken).await.map(|o| o.max_age),
        Some(chrono::Duration::seconds(180))
    );
}

#[tokio::test]
async fn login_without_remember_me_drops_an_old_refresh_token() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (_store, session) = memory_session();

    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("first login");
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, false)
        .await
        .expect("second login");

    assert!(session.get(SessionKey::RefreshToken).await.is_none());
}

#[tokio::test]
async fn login_failures_are_distinguished() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();

    let missing = h
        .state
        .auth
        .login(&session, "nobody@example.com", PASSWORD, false)
        .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let wrong = h
        .state
        .auth
        .login(&session, "ada@example.com", "not-the-password", false)
        .await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn expired_access_is_refreshed_while_the_refresh_token_lives() {
    let h = harness();
    let user = h.register("Ada", "ada@example.com").await;
    let (_store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");
    let first = session.get(SessionKey::AccessToken).await.expect("access");

    h.advance(61);
    let verified = h
        .state
        .auth
        .verifier()
        .verify(&session)
        .await
        .expect("refreshed");
    assert_eq!(verified.state, SessionState::RefreshedOk);
    assert_eq!(verified.subject.user_id, user.id);

    let second = session.get(SessionKey::AccessToken).await.expect("new access");
    assert_ne!(first, second);
    assert_eq!(claims(&second, "access-secret-for-tests").user_id, user.id);

    let me = h.state.auth.current_user(&session).await.expect("current user");
    assert_eq!(me.id, user.id);
}

#[tokio::test]
async fn session_only_login_lapses_with_the_access_token() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, false)
        .await
        .expect("login");

    h.advance(59);
    assert!(h.state.auth.current_user(&session).await.is_ok());

    h.advance(2);
    let err = h.state.auth.current_user(&session).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn refresh_token_expiry_ends_the_session() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");

    h.advance(181);
    assert!(matches!(
        h.state.auth.refresh(&session).await,
        Err(AppError::ExpiredToken)
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn tampered_refresh_token_purges_the_session() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");

    let refresh = session.get(SessionKey::RefreshToken).await.expect("refresh");
    let mut forged = refresh.clone();
    forged.push('x');
    session
        .store(
            SessionKey::RefreshToken,
            forged,
            h.state.auth.verifier().cookie_options(TokenKind::Refresh),
        )
        .await;

    assert!(matches!(
        h.state.auth.refresh(&session).await,
        Err(AppError::InvalidSignature)
    ));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn access_token_in_the_refresh_slot_is_the_wrong_kind() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (_store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, false)
        .await
        .expect("login");

    let access = session.get(SessionKey::AccessToken).await.expect("access");
    session
        .store(
            SessionKey::RefreshToken,
            access,
            h.state.auth.verifier().cookie_options(TokenKind::Refresh),
        )
        .await;

    assert!(matches!(
        h.state.auth.refresh(&session).await,
        Err(AppError::WrongKind)
    ));
}

#[tokio::test]
async fn logout_clears_both_tokens() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");

    h.state.auth.logout(&session).await;
    assert!(store.is_empty().await);
    assert!(matches!(
        h.state.auth.current_user(&session).await,
        Err(AppError::Unauthenticated)
    ));

    // Logging out twice is harmless.
    h.state.auth.logout(&session).await;
}

#[tokio::test]
async fn duplicate_registration_creates_nothing() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;

    let again = h
        .state
        .auth
        .register(RegisterRequest {
            full_name: "Other Ada".into(),
            email: " ADA@example.com".into(),
            password: PASSWORD.into(),
        })
        .await;
    assert!(matches!(again, Err(AppError::DuplicateEmail)));
    assert_eq!(h.users.count().await.expect("count"), 1);
}

#[tokio::test]
async fn registration_rejects_weak_passwords_and_bad_emails() {
    let h = harness();
    for (email, password) in [("ada@example.com", "short"), ("not-an-email", PASSWORD)] {
        let res = h
            .state
            .auth
            .register(RegisterRequest {
                full_name: "Ada".into(),
                email: email.into(),
                password: password.into(),
            })
            .await;
        assert!(matches!(res, Err(AppError::Validation(_))), "{email}");
    }
    assert_eq!(h.users.count().await.expect("count"), 0);
}

#[tokio::test]
async fn profile_updates_apply_to_the_signed_in_user() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    h.register("Grace", "grace@example.com").await;
    let (_store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, false)
        .await
        .expect("login");
    let auth = h.state.auth.authenticate(&session).await.expect("auth");

    h.advance(5);
    let updated = h
        .state
        .auth
        .update_profile(
            &auth,
            UpdateProfileRequest {
                full_name: Some("Ada King".into()),
                email: None,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.full_name, "Ada King");
    assert_eq!(updated.email, "ada@example.com");
    assert_ne!(updated.updated_at, updated.created_at);

    let taken = h
        .state
        .auth
        .update_profile(
            &auth,
            UpdateProfileRequest {
                full_name: None,
                email: Some("grace@example.com".into()),
            },
        )
        .await;
    assert!(matches!(taken, Err(AppError::DuplicateEmail)));
}

#[tokio::test]
async fn wrong_current_password_leaves_the_hash_alone() {
    let h = harness();
    let user = h.register("Ada", "ada@example.com").await;
    let (_store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, false)
        .await
        .expect("login");
    let auth = h.state.auth.authenticate(&session).await.expect("auth");
    let id = auth.user_id();
    let before = h.users.find_by_id(id).await.unwrap().unwrap().password_hash;

    let res = h
        .state
        .auth
        .update_password(
            &auth,
            UpdatePasswordRequest {
                current_password: "not-the-password".into(),
                new_password: "another-long-password".into(),
            },
        )
        .await;
    assert!(matches!(res, Err(AppError::InvalidCredentials)));
    let after = h.users.find_by_id(id).await.unwrap().unwrap().password_hash;
    assert_eq!(before, after);

    h.state
        .auth
        .update_password(
            &auth,
            UpdatePasswordRequest {
                current_password: PASSWORD.into(),
                new_password: "another-long-password".into(),
            },
        )
        .await
        .expect("password change");
    let changed = h.users.find_by_id(id).await.unwrap().unwrap().password_hash;
    assert!(verify_password("another-long-password".into(), changed)
        .await
        .unwrap());
    assert_eq!(auth.identity().id, user.id);
}

#[tokio::test]
async fn deleting_the_account_purges_the_session() {
    let h = harness();
    let user = h.register("Ada", "ada@example.com").await;
    let other = h.register("Grace", "grace@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");
    let auth = h.state.auth.authenticate(&session).await.expect("auth");

    let foreign = h.state.auth.delete_account(&session, &auth, &other.id).await;
    assert!(matches!(foreign, Err(AppError::Validation(_))));

    h.state
        .auth
        .delete_account(&session, &auth, &user.id)
        .await
        .expect("delete");
    assert!(store.is_empty().await);
    assert_eq!(h.users.count().await.expect("count"), 1);

    let gone = h.state.auth.delete_account(&session, &auth, &user.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));
}

#[tokio::test]
async fn deleting_an_unknown_account_is_not_found() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, false)
        .await
        .expect("login");
    let auth = h.state.auth.authenticate(&session).await.expect("auth");

    for id in ["65f0c0ffee0000000000beef", "not-an-object-id"] {
        let res = h.state.auth.delete_account(&session, &auth, id).await;
        assert!(matches!(res, Err(AppError::NotFound)), "{id}");
    }
    assert_eq!(h.users.count().await.expect("count"), 1);
    assert!(!store.is_empty().await);
}

#[tokio::test]
async fn tokens_of_a_deleted_user_stop_authenticating() {
    let h = harness();
    h.register("Ada", "ada@example.com").await;
    let (store, session) = memory_session();
    h.state
        .auth
        .login(&session, "ada@example.com", PASSWORD, true)
        .await
        .expect("login");
    let auth = h.state.auth.authenticate(&session).await.expect("auth");

    h.users.delete(auth.user_id()).await.expect("delete");
    assert!(matches!(
        h.state.auth.authenticate(&session).await,
        Err(AppError::Unauthenticated)
    ));
    assert!(store.is_empty().await);
}
