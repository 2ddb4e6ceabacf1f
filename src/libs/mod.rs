pub mod config;
pub mod error;
pub mod migration;
pub mod schema;
pub mod store;

// Re-export them for easier access from the crate root
pub use config::*;
pub use error::MigrationError;
pub use migration::*;
pub use schema::*;
pub use store::*;
