use std::collections::{BTreeSet, HashSet};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::{is_record, Catalog, ID_FIELD};
use crate::error::Result;
use crate::store::TreeSink;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// Identifiers that got at least one list back, sorted.
    pub restored: Vec<String>,
    /// Number of (record, field) lists replaced.
    pub lists: usize,
    pub duplicate_ids: Vec<String>,
}

/// Refill lists that are present but empty in `catalog` from the matching
/// backup record, when the backup's list is non-empty. The untouched catalog
/// goes to `snapshot` first.
pub fn run(
    catalog: &mut Catalog,
    backup: &[Value],
    fields: &[String],
    snapshot: &dyn TreeSink,
) -> Result<RestoreReport> {
    snapshot.persist(catalog.root())?;

    let index = catalog.index();

    let mut report = RestoreReport {
        duplicate_ids: index.duplicates().to_vec(),
        ..RestoreReport::default()
    };
    let mut restored = BTreeSet::new();
    let mut seen = HashSet::new();

    for item in backup {
        let Some(map) = item.as_object().filter(|m| is_record(m)) else {
            continue;
        };
        let id = map.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default();
        // only the first backup record for an id counts
        if !seen.insert(id) {
            warn!(product_id = id, "duplicate product_id in backup, ignoring later copy");
            continue;
        }
        let Some(mut record) = index.pointer(id).and_then(|ptr| catalog.record_mut(ptr)) else {
            debug!(product_id = id, "not in current catalog");
            continue;
        };
        for field in fields {
            let Some(saved) = map.get(field).and_then(Value::as_array) else {
                continue;
            };
            if saved.is_empty() {
                continue;
            }
            let Some(current) = record.list_or_warn(field) else {
                continue;
            };
            if current.is_empty() {
                *current = saved.clone();
                report.lists += 1;
                restored.insert(id.to_string());
                info!(
                    product_id = id,
                    field = %field,
                    items = saved.len(),
                    "restored list from backup"
                );
            }
        }
    }

    report.restored = restored.into_iter().collect();
    Ok(report)
}
