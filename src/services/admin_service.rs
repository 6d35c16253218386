use std::sync::Arc;

use tracing::info;

use super::auth_service::{create_account, Authenticated};
use crate::{
    clock::Clock,
    dto::{
        admin::{PageQuery, UpdateUserRequest, UserPage},
        auth::RegisterRequest,
    },
    errors::AppError,
    models::user::{bson_now, normalize_email, parse_user_id, Identity, UserChanges},
    password::hash_password,
    repos::UserRepository,
};

/// User management screens. Every call needs an authenticated caller.
#[derive(Clone)]
pub struct AdminUserService {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl AdminUserService {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn list(&self, _auth: &Authenticated, query: PageQuery) -> Result<UserPage, AppError> {
        let (users, total_count) = self.users.page(&query).await?;
        Ok(UserPage {
            data: users.into_iter().map(Identity::from).collect(),
            total_count,
            page: query.page,
            per_page: query.per_page,
        })
    }

    pub async fn count(&self, _auth: &Authenticated) -> Result<u64, AppError> {
        self.users.count().await
    }

    pub async fn get(&self, _auth: &Authenticated, id: &str) -> Result<Identity, AppError> {
        let id = parse_user_id(id)?;
        self.users
            .find_by_id(id)
            .await?
            .map(Identity::from)
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        auth: &Authenticated,
        req: RegisterRequest,
    ) -> Result<Identity, AppError> {
        let user = create_account(self.users.as_ref(), self.clock.as_ref(), req).await?;
        info!(by = %auth.user_id(), user_id = %user.id, "admin created user");
        Ok(user.into())
    }

    pub async fn update(
        &self,
        auth: &Authenticated,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<Identity, AppError> {
        req.validate()?;
        let id = parse_user_id(id)?;

        let password_hash = match req.password {
            Some(p) => Some(hash_password(p).await?),
            None => None,
        };
        let changes = UserChanges {
            full_name: req.full_name.map(|n| n.trim().to_string()),
            email: req.email.as_deref().map(normalize_email),
            password_hash,
        };

        let updated = self
            .users
            .update(id, &changes, bson_now(self.clock.now()))
            .await?
            .ok_or(AppError::NotFound)?;
        info!(by = %auth.user_id(), user_id = %id, "admin updated user");
        Ok(updated.into())
    }

    /// Returns the removed account.
    pub async fn delete(&self, auth: &Authenticated, id: &str) -> Result<Identity, AppError> {
        let id = parse_user_id(id)?;
        let removed = self.users.delete(id).await?.ok_or(AppError::NotFound)?;
        info!(by = %auth.user_id(), user_id = %id, "admin deleted user");
        Ok(removed.into())
    }
}
