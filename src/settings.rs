//! Run configuration: an optional `catalog-normalizer.toml` next to the
//! working directory, then `CATALOG_*` environment variables (nested keys
//! split on `__`, e.g. `CATALOG_VOCABULARY__SIZE_KEYWORDS`).

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::passes::overrides::FieldOverride;

pub const CONFIG_FILE: &str = "catalog-normalizer";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog_path: PathBuf,
    pub leadin_report_path: PathBuf,
    pub patch_path: PathBuf,
    pub backup_path: PathBuf,
    pub snapshot_dir: PathBuf,
    pub leadin_fields: Vec<String>,
    pub restore_fields: Vec<String>,
    pub vocabulary: Vocabulary,
    pub overrides: Vec<FieldOverride>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_path: PathBuf::from("data/products_organized.json"),
            leadin_report_path: PathBuf::from("data/leadin_review_report.json"),
            // the reviewed lead-in report doubles as the patch list
            patch_path: PathBuf::from("data/leadin_review_report.json"),
            backup_path: PathBuf::from("data/backups/products-live-backup.json"),
            snapshot_dir: PathBuf::from("data/backups"),
            leadin_fields: vec!["applications".to_string()],
            restore_fields: vec!["benefits".to_string()],
            vocabulary: Vocabulary::default(),
            overrides: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix("CATALOG")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

/// Keyword vocabularies handed to the passes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Packaging/size words that mark a field as holding sizing data.
    pub size_keywords: Vec<String>,
    /// Records settled by hand; reclassification and grammar leave them be.
    pub skip_ids: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            size_keywords: ["gallon", "pail", "drum", "cartridge", "sausage"]
                .into_iter()
                .map(String::from)
                .collect(),
            skip_ids: vec!["T-OS150".to_string(), "TU-FS10".to_string()],
        }
    }
}

impl Vocabulary {
    pub fn is_skipped(&self, product_id: &str) -> bool {
        self.skip_ids.iter().any(|id| id == product_id.trim())
    }

    /// Case-insensitive substring match against the size keywords.
    pub fn is_contaminated(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.size_keywords
            .iter()
            .any(|kw| !kw.is_empty() && lower.contains(&kw.to_lowercase()))
    }
}
