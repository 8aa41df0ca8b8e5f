//! Login handler.

use axum::Json;
use axum::extract::State;

use papers_service::LoginResult;

use crate::dto::request::{LoginRequest, validated};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let req = validated(req)?;
    let result = state.user_service.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(result)))
}
