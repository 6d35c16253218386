use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use tracing::debug;

use super::UserRepository;
use crate::{
    dto::admin::PageQuery,
    errors::AppError,
    models::user::{NewUser, UserChanges, UserDoc},
};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoUserRepository {
    users: Collection<UserDoc>,
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn write_error(op: &'static str) -> impl FnOnce(mongodb::error::Error) -> AppError {
    move |e| {
        if is_duplicate_key(&e) {
            AppError::DuplicateEmail
        } else {
            AppError::storage(op)(e)
        }
    }
}

fn search_filter(search: Option<&str>) -> Document {
    match search {
        Some(s) => {
            let pattern = regex::escape(s);
            doc! {
                "$or": [
                    { "full_name": { "$regex": pattern.as_str(), "$options": "i" } },
                    { "email": { "$regex": pattern.as_str(), "$options": "i" } },
                ]
            }
        }
        None => doc! {},
    }
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection("users"),
        }
    }

    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users
            .create_index(email_index)
            .await
            .map_err(AppError::storage("users.ensure_indexes"))?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: NewUser) -> Result<UserDoc, AppError> {
        let doc = user.into_doc();
        self.users
            .insert_one(&doc)
            .await
            .map_err(write_error("users.insert"))?;
        debug!(user_id = %doc.id, "user inserted");
        Ok(doc)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserDoc>, AppError> {
        self.users
            .find_one(doc! { "email": email })
            .await
            .map_err(AppError::storage("users.find_by_email"))
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError> {
        self.users
            .find_one(doc! { "_id": id })
            .await
            .map_err(AppError::storage("users.find_by_id"))
    }

    async fn update(
        &self,
        id: ObjectId,
        changes: &UserChanges,
        now: BsonDateTime,
    ) -> Result<Option<UserDoc>, AppError> {
        let mut set = doc! { "updated_at": now };
        if let Some(name) = &changes.full_name {
            set.insert("full_name", name.as_str());
        }
        if let Some(email) = &changes.email {
            set.insert("email", email.as_str());
        }
        if let Some(hash) = &changes.password_hash {
            set.insert("password_hash", hash.as_str());
        }

        self.users
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(write_error("users.update"))
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<UserDoc>, AppError> {
        self.users
            .find_one_and_delete(doc! { "_id": id })
            .await
            .map_err(AppError::storage("users.delete"))
    }

    async fn page(&self, query: &PageQuery) -> Result<(Vec<UserDoc>, u64), AppError> {
        let filter = search_filter(query.search.as_deref());

        let total = self
            .users
            .count_documents(filter.clone())
            .await
            .map_err(AppError::storage("users.page"))?;

        let users: Vec<UserDoc> = self
            .users
            .find(filter)
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(query.skip())
            .limit(query.per_page as i64)
            .await
            .map_err(AppError::storage("users.page"))?
            .try_collect()
            .await
            .map_err(AppError::storage("users.page"))?;

        Ok((users, total))
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.users
            .count_documents(doc! {})
            .await
            .map_err(AppError::storage("users.count"))
    }
}
