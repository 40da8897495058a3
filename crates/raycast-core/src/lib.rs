//! raycast-core - Shared functionality for raycast-mcp
//!
//! Standard paths, configuration loading, process checks and the credential
//! store consumed by the tool router.

pub mod auth;
pub mod config;
pub mod process;
pub mod paths;

pub use auth::{Auth, AuthError, CredentialStore, Service, Validation};
pub use config::Config;
pub use paths::Paths;
