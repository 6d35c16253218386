pub mod memory;
pub mod users;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

use crate::{
    dto::admin::PageQuery,
    errors::AppError,
    models::user::{NewUser, UserChanges, UserDoc},
};

pub use memory::MemoryUserRepository;
pub use users::MongoUserRepository;

/// Persistence contract for user accounts. Emails arrive already normalized;
/// uniqueness violations surface as `AppError::DuplicateEmail`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<UserDoc, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDoc>, AppError>;
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError>;
    async fn update(
        &self,
        id: ObjectId,
        changes: &UserChanges,
        now: BsonDateTime,
    ) -> Result<Option<UserDoc>, AppError>;
    async fn delete(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError>;
    /// Newest first. Returns the page and the total number of matches.
    async fn page(&self, query: &PageQuery) -> Result<(Vec<UserDoc>, u64), AppError>;
    async fn count(&self) -> Result<u64, AppError>;
}
