//! Account registration handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use papers_entity::user::User;
use papers_service::RegisterUser;

use crate::dto::request::{RegisterRequest, validated};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let req = validated(req)?;
    let user = state
        .user_service
        .register(RegisterUser {
            fullname: req.fullname,
            email: req.email,
            password: req.password,
            password_conf: req.password_conf,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}
