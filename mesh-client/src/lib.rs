//! mesh-client: client side of the data marketplace
//!
//! Pipelines that drive the gateway, the contract and the wallet:
//! [`UploadPipeline`] for publishers and [`PurchasePipeline`] for buyers.
//! [`CatalogView`] and [`Feed`] derive what a dashboard shows.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod fake;
pub mod feed;
pub mod gateway;
pub mod purchase;
pub mod upload;

pub use catalog::{CatalogView, CategorySummary, CompanyGroup, GroupStats};
pub use client::{MarketApi, MarketClient, NetworkHttpClient, OneshotHttpClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, PurchaseError, UploadError};
pub use feed::Feed;
pub use purchase::{PurchasePipeline, PurchaseServices, Receipt};
pub use upload::{UploadForm, UploadPipeline, UploadStatus, UploadStep};
