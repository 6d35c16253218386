use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::RequestSession;
use crate::{
    dto::{
        auth::{LoginRequest, RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest},
        response::ApiResponse,
    },
    errors::AppError,
    models::user::Identity,
    state::AppState,
};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Identity>>), AppError> {
    let user = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = state
        .auth
        .login(&rs.session, &req.email, &req.password, req.remember_me)
        .await;
    rs.respond(result).await
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    state.auth.logout(&rs.session).await;
    rs.respond(Ok(json!({ "message": "Logged out" }))).await
}

pub async fn refresh(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = state.auth.refresh(&rs.session).await;
    rs.respond(result).await
}

pub async fn me(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = state.auth.current_user(&rs.session).await;
    rs.respond(result).await
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<UpdateProfileRequest>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.auth.update_profile(&auth, req).await
    }
    .await;
    rs.respond(result).await
}

pub async fn update_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<UpdatePasswordRequest>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.auth.update_password(&auth, req).await
    }
    .await;
    rs.respond(result).await
}

pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.auth.delete_account(&rs.session, &auth, &id).await?;
        Ok::<_, AppError>(json!({ "message": "User account deleted successfully" }))
    }
    .await;
    rs.respond(result).await
}
