use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::{cookie, token};
use crate::error::AppError;
use crate::state::AppState;

/// Represents the currently authenticated account.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// Extractor that requires authentication.
/// Verifies the session cookie's token signature; returns 401 when the
/// cookie is absent or the token fails verification.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = cookie::cookie_value(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let claims = token::verify(&state.keys, raw)?;

        Ok(CurrentUser {
            id: claims.sub,
            username: claims.username,
        })
    }
}
