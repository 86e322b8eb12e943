//! Shared building blocks for the campaign insights workspace: domain types,
//! the error taxonomy, configuration, the demo campaign catalog and display
//! formatting.

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod types;

pub use catalog::CampaignCatalog;
pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
