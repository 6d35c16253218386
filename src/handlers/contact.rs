use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::{
    dto::{contact::ContactRequest, response::ApiResponse},
    errors::AppError,
    mailer::Email,
    state::AppState,
};

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    req.validate()?;
    let to = state
        .cfg
        .contact_inbox
        .clone()
        .ok_or_else(|| AppError::Config("CONTACT_INBOX is not set".into()))?;

    let outcome = state
        .mailer
        .send(&Email {
            to,
            subject: req.subject(),
            body: req.body(),
        })
        .await;

    if outcome.success {
        return Ok((StatusCode::OK, Json(ApiResponse::done())));
    }
    warn!(error = ?outcome.error, "contact message not delivered");
    Ok((
        StatusCode::BAD_GATEWAY,
        Json(ApiResponse::failure(
            outcome.error.unwrap_or_else(|| "message not sent".into()),
        )),
    ))
}
