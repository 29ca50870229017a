pub mod config;
pub mod logging;
pub mod manifest;
pub mod review;
pub mod selector;

pub use config::{Settings, StrategyOverride};
pub use manifest::{run_batch, write_outputs, BatchItem, BatchReport, Manifest, ManifestEntry};
pub use review::{FileReview, RiskLevel};
pub use selector::ConfiguredSelector;
