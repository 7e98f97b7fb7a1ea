//! mesh-server: HTTP gateway of the data marketplace
//!
//! Proxies purchase-request and dataset-listing records to the record store
//! and dataset uploads to the off-chain storage node.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod state;
pub mod storage;

pub use config::Config;
pub use state::{AppState, CredentialSource};
