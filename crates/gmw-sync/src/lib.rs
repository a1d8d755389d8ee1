//! Run orchestration: configuration, snapshot building, novelty detection,
//! filtering and the notification/persistence sequence.

pub mod config;
pub mod novelty;
pub mod pipeline;

pub const CRATE_NAME: &str = "gmw-sync";

pub use config::{ConfigError, MonitorConfig, DEFAULT_DATA_FILE};
pub use novelty::{detect_keyword_matches, diff_snapshots, filter_high_value};
pub use pipeline::{MonitorPipeline, RunSummary};
