pub mod admin;
pub mod auth;
pub mod contact;

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::{
    dto::response::ApiResponse,
    errors::AppError,
    session::{CookieSession, Session},
};

/// The session of one request, backed by its cookie jar. Whatever the
/// operation wrote (new tokens, purges) goes back out with the response,
/// on success and on failure alike.
pub struct RequestSession {
    cookies: Arc<CookieSession>,
    pub session: Session,
}

impl RequestSession {
    pub fn new(jar: CookieJar) -> Self {
        let cookies = Arc::new(CookieSession::new(jar));
        Self {
            session: Session::new(cookies.clone()),
            cookies,
        }
    }

    pub async fn respond<T: Serialize>(self, result: Result<T, AppError>) -> (CookieJar, Response) {
        let jar = self.cookies.take_jar().await;
        let body = match result {
            Ok(data) => Json(ApiResponse::ok(data)).into_response(),
            Err(e) => e.into_response(),
        };
        (jar, body)
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
