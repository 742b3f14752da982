//! JWT-based caller extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gamerank_core::error::CoreError;
use gamerank_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
}

/// Optional caller for endpoints that also serve anonymous readers.
///
/// A missing `Authorization` header yields `None`; a present but malformed or
/// expired token is still rejected.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<DbId> {
        self.0.map(|u| u.user_id)
    }
}

fn unauthenticated(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthenticated(msg.into()))
}

/// Decode the bearer token, if any.
fn bearer_user(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(header) = parts.headers.get("authorization") else {
        return Ok(None);
    };
    let header = header
        .to_str()
        .map_err(|_| unauthenticated("Invalid Authorization header"))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        unauthenticated("Invalid Authorization format. Expected: Bearer <token>")
    })?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| unauthenticated("Invalid or expired token"))?;

    Ok(Some(AuthUser {
        user_id: claims.sub,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_user(parts, state)?.ok_or_else(|| unauthenticated("Missing Authorization header"))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_user(parts, state).map(MaybeAuthUser)
    }
}
