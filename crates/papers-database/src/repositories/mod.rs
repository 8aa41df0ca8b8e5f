//! Entity store implementations.

pub mod memory;
pub mod node;
pub mod user;

pub use memory::MemoryStore;
pub use node::PgNodeStore;
pub use user::PgUserStore;
