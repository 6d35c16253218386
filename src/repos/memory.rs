use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use tokio::sync::RwLock;

use super::UserRepository;
use crate::{
    dto::admin::PageQuery,
    errors::AppError,
    models::user::{NewUser, UserChanges, UserDoc},
};

/// Process-local repository with the same uniqueness rules as the Mongo one.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<UserDoc>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(user: &UserDoc, needle: &str) -> bool {
    user.full_name.to_lowercase().contains(needle) || user.email.to_lowercase().contains(needle)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<UserDoc, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        let doc = user.into_doc();
        users.push(doc.clone());
        Ok(doc)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDoc>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: &UserChanges,
        now: BsonDateTime,
    ) -> Result<Option<UserDoc>, AppError> {
        let mut users = self.users.write().await;
        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::DuplicateEmail);
            }
        }
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            changes.apply(user, now);
            user.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError> {
        let mut users = self.users.write().await;
        let pos = users.iter().position(|u| u.id == id);
        Ok(pos.map(|i| users.remove(i)))
    }

    async fn page(&self, query: &PageQuery) -> Result<(Vec<UserDoc>, u64), AppError> {
        let users = self.users.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut hits: Vec<&UserDoc> = users
            .iter()
            .filter(|u| needle.as_deref().map_or(true, |n| matches(u, n)))
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = hits.len() as u64;
        let page = hits
            .into_iter()
            .skip(usize::try_from(query.skip()).unwrap_or(usize::MAX))
            .take(query.per_page as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.users.read().await.len() as u64)
    }
}
