use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{CatalogError, Result};

/// Somewhere a whole tree can be read from.
pub trait TreeSource {
    fn load(&self) -> Result<Value>;
}

/// Somewhere a whole tree can be written to.
pub trait TreeSink {
    fn persist(&self, tree: &Value) -> Result<()>;
}

/// A JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and require a top-level array.
    pub fn load_array(&self, what: &'static str) -> Result<Vec<Value>> {
        match self.load()? {
            Value::Array(items) => Ok(items),
            _ => Err(CatalogError::NotAnArray {
                path: self.path.clone(),
                what,
            }),
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = to_pretty(value)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| CatalogError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        // write beside the target, then swap it in
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|source| CatalogError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| CatalogError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "wrote json");
        Ok(())
    }
}

impl TreeSource for JsonFile {
    fn load(&self) -> Result<Value> {
        let text = fs::read_to_string(&self.path).map_err(|source| CatalogError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl TreeSink for JsonFile {
    fn persist(&self, tree: &Value) -> Result<()> {
        self.write(tree)
    }
}

/// Two-space indented JSON, non-ASCII kept as is, trailing newline.
pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// `<dir>/<catalog stem>_<label>_<YYYYMMDD-HHMMSS>.json`
pub fn snapshot_path(dir: &Path, catalog: &Path, label: &str, at: DateTime<Local>) -> PathBuf {
    let stem = catalog
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    dir.join(format!("{}_{}_{}.json", stem, label, at.format("%Y%m%d-%H%M%S")))
}
