//! Input directory configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where contract files are picked up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory scanned for contract files
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Name prefix marking a file as processed
    #[serde(default = "default_processed_prefix")]
    pub processed_prefix: String,
}

fn default_directory() -> PathBuf {
    PathBuf::from("files/csv")
}

fn default_processed_prefix() -> String {
    "processed_".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            processed_prefix: default_processed_prefix(),
        }
    }
}
