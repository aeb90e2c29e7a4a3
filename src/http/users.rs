//! User and login endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::error::from_rejection;
use super::{bearer_token, AppState, Caller};
use crate::error::{Error, Result};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|e| from_rejection(e.status(), e.body_text()))
}

/// `POST /users`
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let req = json_body(body)?;
    let user = state
        .users
        .register(&req.username, &req.password, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users`
pub async fn list(
    State(state): State<AppState>,
    Caller(_caller): Caller,
) -> Result<impl IntoResponse> {
    Ok(Json(state.users.list().await?))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let req = json_body(body)?;
    let issued = state.users.login(&req.username, &req.password).await?;
    Ok(Json(issued))
}

/// `POST /logout`
pub async fn logout(
    State(state): State<AppState>,
    Caller(_caller): Caller,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers).ok_or(Error::MissingToken)?;
    state.users.logout(token);
    Ok(StatusCode::NO_CONTENT)
}
