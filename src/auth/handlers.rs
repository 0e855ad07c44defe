use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::{cookie, credentials, token};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /register — create an account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> AppResult<Response> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("password is required".into()));
    }

    let account = credentials::register(&state.db, username, &req.password)?;
    tracing::info!(username = %account.username, "account registered");

    Ok((StatusCode::OK, Json(account)).into_response())
}

/// POST /login — check credentials, issue a token, set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> AppResult<Response> {
    let account = credentials::verify(&state.db, req.username.trim(), &req.password)?;

    let token = token::issue(
        &state.keys,
        &account.id,
        &account.username,
        state.config.auth.token_hours,
    )?;

    let body = serde_json::json!({
        "id": account.id,
        "username": account.username,
    });

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            cookie::session_cookie(
                &state.config.auth.cookie_name,
                &token,
                state.config.auth.token_hours,
            ),
        )],
        Json(body),
    )
        .into_response())
}

/// GET /profile — return the verified caller's identity claims.
pub async fn profile(user: CurrentUser) -> AppResult<Response> {
    let body = serde_json::json!({
        "id": user.id,
        "username": user.username,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

/// POST /logout — empty the session cookie. The token itself is not revoked;
/// there is no server-side session state to delete.
pub async fn logout(State(state): State<AppState>) -> AppResult<Response> {
    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            cookie::clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Json("ok"),
    )
        .into_response())
}
