//! Data models
//!
//! Shared between mesh-server and mesh-client (via API).

pub mod category;
pub mod listing;
pub mod price;
pub mod request;

// Re-exports
pub use category::*;
pub use listing::*;
pub use price::*;
pub use request::*;
