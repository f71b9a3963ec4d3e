//! Startup errors
//!
//! The simulation itself never fails; only loading and validating settings can.

use std::path::PathBuf;

/// Fatal startup failures, reported once by the binary before exiting
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("failed to read settings from {}: {source}", path.display())]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON in {}: {source}", path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}
