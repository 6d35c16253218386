use serde::Deserialize;

use super::require_email;
use crate::errors::AppError;

pub const MAX_MESSAGE_LEN: usize = 5_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub content: String,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        require_email(&self.email)?;
        if self.content.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::Validation("message is too long".into()));
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        format!("New message from {}", self.name.trim())
    }

    pub fn body(&self) -> String {
        let content = if self.content.trim().is_empty() {
            "No message content was provided."
        } else {
            self.content.trim()
        };
        format!(
            "You have a new message!\n\nFrom: {}\nEmail: {}\n\n{}",
            self.name.trim(),
            self.email.trim(),
            content
        )
    }
}
