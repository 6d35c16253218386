use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use tracing::{info, warn};

use crate::{
    auth::tokens::issue_session_tokens,
    clock::Clock,
    dto::auth::{RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest},
    errors::AppError,
    models::{
        jwt::Subject,
        user::{bson_now, normalize_email, parse_user_id, Identity, NewUser, UserChanges, UserDoc},
    },
    password::{hash_password, verify_password},
    repos::UserRepository,
    session::{Session, SessionMonitor, SessionVerifier},
};

/// Proof that the current session passed verification. Only
/// [`AuthService::authenticate`] hands these out, so any operation taking one
/// cannot run for an anonymous caller.
#[derive(Debug, Clone)]
pub struct Authenticated {
    user_id: ObjectId,
    subject: Subject,
    identity: Identity,
}

impl Authenticated {
    pub fn user_id(&self) -> ObjectId {
        self.user_id
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    verifier: SessionVerifier,
}

/// Shared by self-registration and admin-created accounts.
pub(crate) async fn create_account(
    users: &dyn UserRepository,
    clock: &dyn Clock,
    req: RegisterRequest,
) -> Result<UserDoc, AppError> {
    req.validate()?;
    let email = normalize_email(&req.email);

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(req.password).await?;
    let user = users
        .insert(NewUser {
            full_name: req.full_name.trim().to_string(),
            email,
            password_hash,
            now: bson_now(clock.now()),
        })
        .await?;

    info!(user_id = %user.id, "account created");
    Ok(user)
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, verifier: SessionVerifier) -> Self {
        Self { users, verifier }
    }

    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    pub async fn login(
        &self,
        session: &Session,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<Identity, AppError> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::NotFound)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let subject = Subject {
            user_id: user.id.to_hex(),
            username: user.email.clone(),
        };
        issue_session_tokens(&self.verifier, session, &subject, remember_me).await?;

        info!(user_id = %user.id, remember_me, "login succeeded");
        Ok(user.into())
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Identity, AppError> {
        let user = create_account(self.users.as_ref(), self.verifier.clock(), req).await?;
        Ok(user.into())
    }

    pub async fn refresh(&self, session: &Session) -> Result<Identity, AppError> {
        let subject = self.verifier.refresh(session).await?;
        match self.load(&subject).await {
            Ok(user) => Ok(user.into()),
            Err(e) => {
                session.purge().await;
                Err(e)
            }
        }
    }

    /// Verifies the session (refreshing once if needed) and loads its user.
    pub async fn authenticate(&self, session: &Session) -> Result<Authenticated, AppError> {
        let verified = self.verifier.verify(session).await?;
        let user = match self.load(&verified.subject).await {
            Ok(user) => user,
            Err(AppError::NotFound) => {
                warn!(user_id = %verified.subject.user_id, "session refers to a deleted user");
                session.purge().await;
                return Err(AppError::Unauthenticated);
            }
            Err(e) => return Err(e),
        };

        Ok(Authenticated {
            user_id: user.id,
            subject: verified.subject,
            identity: user.into(),
        })
    }

    pub async fn current_user(&self, session: &Session) -> Result<Identity, AppError> {
        Ok(self.authenticate(session).await?.into_identity())
    }

    /// Starts periodic re-verification of a client session.
    pub fn monitor(&self, session: Arc<Session>, every: std::time::Duration) -> SessionMonitor {
        SessionMonitor::spawn(self.verifier.clone(), session, every)
    }

    pub async fn logout(&self, session: &Session) {
        session.purge().await;
        info!("logged out");
    }

    pub async fn update_profile(
        &self,
        auth: &Authenticated,
        req: UpdateProfileRequest,
    ) -> Result<Identity, AppError> {
        req.validate()?;
        let changes = UserChanges {
            full_name: req.full_name.map(|n| n.trim().to_string()),
            email: req.email.as_deref().map(normalize_email),
            password_hash: None,
        };
        if changes.is_empty() {
            return Ok(auth.identity.clone());
        }

        self.users
            .update(auth.user_id, &changes, bson_now(self.verifier.clock().now()))
            .await?
            .map(Identity::from)
            .ok_or(AppError::NotFound)
    }

    pub async fn update_password(
        &self,
        auth: &Authenticated,
        req: UpdatePasswordRequest,
    ) -> Result<Identity, AppError> {
        req.validate()?;
        let user = self
            .users
            .find_by_id(auth.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !verify_password(req.current_password, user.password_hash).await? {
            warn!(user_id = %auth.user_id, "password change rejected: current password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let changes = UserChanges {
            password_hash: Some(hash_password(req.new_password).await?),
            ..UserChanges::default()
        };
        let updated = self
            .users
            .update(auth.user_id, &changes, bson_now(self.verifier.clock().now()))
            .await?
            .ok_or(AppError::NotFound)?;

        info!(user_id = %auth.user_id, "password changed");
        Ok(updated.into())
    }

    /// Self-service deletion. Unknown ids are `NotFound`; an existing account
    /// other than the signed-in one is refused.
    pub async fn delete_account(
        &self,
        session: &Session,
        auth: &Authenticated,
        id: &str,
    ) -> Result<(), AppError> {
        let id = parse_user_id(id)?;
        if self.users.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        if id != auth.user_id {
            return Err(AppError::Validation(
                "only your own account can be deleted here".into(),
            ));
        }

        self.users.delete(id).await?.ok_or(AppError::NotFound)?;
        session.purge().await;

        info!(user_id = %id, "account deleted");
        Ok(())
    }

    async fn load(&self, subject: &Subject) -> Result<UserDoc, AppError> {
        let id = ObjectId::parse_str(&subject.user_id).map_err(|_| AppError::Unauthenticated)?;
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }
}
