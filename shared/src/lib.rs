//! LND Shared Library
//!
//! Wire types, domain models and the authentication error taxonomy shared
//! between the backend and its clients.

pub mod errors;
pub mod models;
pub mod types;

// Re-export commonly used items
pub use errors::*;
pub use models::{AuthenticatedIdentity, Role, User};
pub use types::*;
