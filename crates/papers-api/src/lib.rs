//! # papers-api
//!
//! HTTP API layer for Papers built on Axum.
//!
//! Provides the REST endpoints for accounts and the per-user file tree,
//! the bearer-token extractor, CORS and request logging middleware, DTOs,
//! and the mapping from [`AppError`](papers_core::AppError) to responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use state::AppState;
