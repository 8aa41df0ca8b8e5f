//! # papers-database
//!
//! Entity store adapters for Papers. [`repositories::MemoryStore`] keeps
//! documents in a concurrent map and is used for development and tests;
//! the PostgreSQL repositories persist nodes and users in the tables
//! created by the bundled migrations.

pub mod connection;
pub mod migration;
pub mod query;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MemoryStore, PgNodeStore, PgUserStore};
