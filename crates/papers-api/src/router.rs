//! Route definitions for the Papers HTTP API.
//!
//! All routes are mounted under `/api`. Per-user file routes carry the
//! owner's id in the path and are checked against the bearer token.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the `parent_id` part on top of the file.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the router with every route and the body size limit.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.storage.max_upload_size_bytes as usize + FORM_OVERHEAD_BYTES;

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .merge(node_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(handlers::auth::login))
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(handlers::user::register))
}

/// File tree endpoints
fn node_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/files",
            get(handlers::node::list).post(handlers::node::upload),
        )
        .route(
            "/users/{user_id}/folders",
            post(handlers::node::create_folder),
        )
        .route(
            "/users/{user_id}/files/{node_id}",
            get(handlers::node::get)
                .put(handlers::node::update)
                .delete(handlers::node::delete),
        )
}
