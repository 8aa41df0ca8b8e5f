//! User accounts.

pub mod service;

pub use service::{LoginResult, RegisterUser, UserService};
