//! `AuthUser` extractor: validates the bearer token and builds the request context.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use papers_core::error::{AppError, ErrorKind};
use papers_core::types::UserId;
use papers_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }

    /// Fail unless the route's `{user_id}` is the caller.
    pub fn ensure_user(&self, user_id: UserId) -> Result<(), AppError> {
        if self.0.user_id != user_id {
            return Err(AppError::authorization(
                "Cannot act on another user's files",
            ));
        }
        Ok(())
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode(token)?;

        // A valid token for an account that no longer exists is rejected like a bad one.
        let user = match state.user_service.get(claims.user_id()).await {
            Ok(user) => user,
            Err(e) if e.kind == ErrorKind::NotFound => {
                return Err(AppError::authentication("Token refers to an unknown user").into());
            }
            Err(e) => return Err(e.into()),
        };

        let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
        Ok(AuthUser(RequestContext::new(user.id).with_timeout(timeout)))
    }
}
