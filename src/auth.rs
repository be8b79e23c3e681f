//! Credential models: redacted token secrets, the access/refresh pair, and renewal grants.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
