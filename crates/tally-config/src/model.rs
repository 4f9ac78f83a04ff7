use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DATA_FILE_NAME: &str = "tally.json";

/// Stores engine settings resolved once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `~/Documents/Tally`.
    pub data_dir: Option<PathBuf>,

    /// Obligations materialized for open-ended recurring commitments.
    #[serde(default = "Config::default_recurring_horizon")]
    pub recurring_horizon: u32,

    /// Ledger category for mirrored card installments without their own category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_ledger_category: Option<Uuid>,

    #[serde(default = "Config::default_mirror_card_installments")]
    pub mirror_card_installments: bool,

    #[serde(default = "Config::default_snapshot_retention")]
    pub snapshot_retention: usize,

    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            recurring_horizon: Self::default_recurring_horizon(),
            card_ledger_category: None,
            mirror_card_installments: Self::default_mirror_card_installments(),
            snapshot_retention: Self::default_snapshot_retention(),
            log_filter: Self::default_log_filter(),
        }
    }
}

impl Config {
    pub fn default_recurring_horizon() -> u32 {
        24
    }

    pub fn default_mirror_card_installments() -> bool {
        true
    }

    pub fn default_snapshot_retention() -> usize {
        5
    }

    pub fn default_log_filter() -> String {
        "tally=info".into()
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("Tally")
    }

    /// Location of the JSON data file inside the data directory.
    pub fn resolve_data_file(&self) -> PathBuf {
        self.resolve_data_dir().join(DATA_FILE_NAME)
    }
}
