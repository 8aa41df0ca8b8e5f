//! Application state shared across all handlers and extractors.

use std::sync::Arc;

use papers_auth::{JwtDecoder, JwtEncoder, PasswordHasher};
use papers_core::config::AppConfig;
use papers_core::traits::{BlobStore, EntityStore};
use papers_entity::node::Node;
use papers_entity::user::User;
use papers_service::{HierarchyService, UserService};

/// Shared dependencies, passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Account registration and login
    pub user_service: Arc<UserService>,
    /// File tree operations
    pub hierarchy_service: Arc<HierarchyService>,
}

impl AppState {
    /// Build the auth components and services on top of the given stores.
    pub fn assemble(
        config: AppConfig,
        nodes: Arc<dyn EntityStore<Node>>,
        users: Arc<dyn EntityStore<User>>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let password_hasher = Arc::new(PasswordHasher::new());
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let user_service = Arc::new(UserService::new(
            users,
            password_hasher,
            jwt_encoder,
            &config.auth,
        ));
        let hierarchy_service = Arc::new(HierarchyService::new(
            nodes,
            blobs,
            config.hierarchy.clone(),
        ));

        Self {
            config: Arc::new(config),
            jwt_decoder,
            user_service,
            hierarchy_service,
        }
    }
}
