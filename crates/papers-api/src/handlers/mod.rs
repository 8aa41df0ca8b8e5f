//! Route handlers organized by domain.

pub mod auth;
pub mod health;
pub mod node;
pub mod upload;
pub mod user;
