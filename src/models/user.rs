use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub full_name: String,
    pub email: String,

    pub password_hash: String,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

/// Fields for a record about to be inserted; the repository assigns nothing else.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub now: BsonDateTime,
}

impl NewUser {
    pub fn into_doc(self) -> UserDoc {
        UserDoc {
            id: ObjectId::new(),
            full_name: self.full_name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.now,
            updated_at: self.now,
        }
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }

    pub fn apply(&self, user: &mut UserDoc, now: BsonDateTime) {
        if let Some(name) = &self.full_name {
            user.full_name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        user.updated_at = now;
    }
}

/// A user account as callers see it: everything but the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<UserDoc> for Identity {
    fn from(u: UserDoc) -> Self {
        Self {
            id: u.id.to_hex(),
            full_name: u.full_name,
            email: u.email,
            created_at: bson_to_rfc3339(u.created_at),
            updated_at: bson_to_rfc3339(u.updated_at),
        }
    }
}

/// Malformed ids cannot name an existing user.
pub fn parse_user_id(id: &str) -> Result<ObjectId, crate::errors::AppError> {
    ObjectId::parse_str(id.trim()).map_err(|_| crate::errors::AppError::NotFound)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn bson_to_rfc3339(dt: BsonDateTime) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(dt.timestamp_millis())
        .unwrap_or(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
        .to_rfc3339()
}

pub fn bson_now(now: chrono::DateTime<chrono::Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(now.timestamp_millis())
}
