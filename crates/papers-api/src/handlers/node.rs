//! File and folder handlers under `/api/users/{user_id}`.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;

use papers_core::error::AppError;
use papers_entity::node::Node;
use papers_service::{DeleteSummary, NodeListing};

use crate::dto::request::{
    CreateFolderRequest, DeleteParams, ListParams, UpdateNodeRequest, validated,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_node_id, parse_parent, parse_user_id};
use crate::handlers::upload::UploadForm;
use crate::state::AppState;

/// GET /api/users/{user_id}/files
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<Node>>>, ApiError> {
    auth.ensure_user(parse_user_id(&user_id)?)?;
    let nodes = if params.all {
        state.hierarchy_service.list_all(&auth).await?
    } else {
        state.hierarchy_service.list_root(&auth).await?
    };
    Ok(Json(ApiResponse::ok(nodes)))
}

/// POST /api/users/{user_id}/files
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Node>>), ApiError> {
    auth.ensure_user(parse_user_id(&user_id)?)?;
    let form = UploadForm::read(multipart, &state.config.storage).await?;
    let node = state
        .hierarchy_service
        .upload(&auth, form.parent, &form.file_name, form.data)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node))))
}

/// POST /api/users/{user_id}/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Node>>), ApiError> {
    auth.ensure_user(parse_user_id(&user_id)?)?;
    let req = validated(req)?;
    let parent = parse_parent(req.parent_id.as_deref())?;
    let folder = state
        .hierarchy_service
        .create_folder(&auth, &req.name, parent)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// GET /api/users/{user_id}/files/{node_id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, node_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<NodeListing>>, ApiError> {
    auth.ensure_user(parse_user_id(&user_id)?)?;
    let listing = state
        .hierarchy_service
        .find(&auth, parse_node_id(&node_id)?, true)
        .await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// PUT /api/users/{user_id}/files/{node_id}
///
/// Renames when `name` is given and moves when `parent_id` is present.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, node_id)): Path<(String, String)>,
    Json(req): Json<UpdateNodeRequest>,
) -> Result<Json<ApiResponse<Node>>, ApiError> {
    auth.ensure_user(parse_user_id(&user_id)?)?;
    let id = parse_node_id(&node_id)?;
    let req = validated(req)?;
    let destination = match &req.parent_id {
        Some(parent) => Some(parse_parent(parent.as_deref())?),
        None => None,
    };

    let service = &state.hierarchy_service;
    let mut updated = None;
    if let Some(name) = &req.name {
        updated = Some(service.rename(&auth, id, name).await?);
    }
    if let Some(destination) = destination {
        updated = Some(service.move_node(&auth, id, destination).await?);
    }

    let node = updated.ok_or_else(|| AppError::validation("Nothing to update"))?;
    Ok(Json(ApiResponse::ok(node)))
}

/// DELETE /api/users/{user_id}/files/{node_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, node_id)): Path<(String, String)>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteSummary>>, ApiError> {
    auth.ensure_user(parse_user_id(&user_id)?)?;
    let summary = state
        .hierarchy_service
        .delete(&auth, parse_node_id(&node_id)?, params.hard)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}
