use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use super::RequestSession;
use crate::{
    dto::{
        admin::{ListUsersQuery, UpdateUserRequest},
        auth::RegisterRequest,
    },
    state::AppState,
};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ListUsersQuery>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.admin.list(&auth, query.into()).await
    }
    .await;
    rs.respond(result).await
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.admin.get(&auth, &id).await
    }
    .await;
    rs.respond(result).await
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.admin.create(&auth, req).await
    }
    .await;
    rs.respond(result).await
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.admin.update(&auth, &id, req).await
    }
    .await;
    rs.respond(result).await
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> (CookieJar, Response) {
    let rs = RequestSession::new(jar);
    let result = async {
        let auth = state.auth.authenticate(&rs.session).await?;
        state.admin.delete(&auth, &id).await
    }
    .await;
    rs.respond(result).await
}
