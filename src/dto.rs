pub mod admin;
pub mod auth;
pub mod contact;
pub mod response;

use crate::{errors::AppError, password::MIN_PASSWORD_LEN};

pub(crate) fn require_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::Validation("email is invalid".into()));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation("email is invalid".into()));
    }
    Ok(())
}

pub(crate) fn require_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("full name is required".into()));
    }
    Ok(())
}
