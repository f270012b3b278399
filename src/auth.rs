//! Identifiers, scope sets, and secrets shared across the login pipeline.

pub mod id;
pub mod scope;
pub mod secret;

pub use id::*;
pub use scope::*;
pub use secret::*;
