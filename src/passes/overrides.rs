use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::Catalog;

/// A value pinned by hand for one field of one record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldOverride {
    pub product_id: String,
    pub field: String,
    pub value: OverrideValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    Text(String),
    List(Vec<String>),
}

impl OverrideValue {
    fn to_json(&self) -> Value {
        match self {
            OverrideValue::Text(text) => Value::String(text.clone()),
            OverrideValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverrideReport {
    pub applied: usize,
    /// `product_id` values that matched no record.
    pub missing: Vec<String>,
}

pub fn run(catalog: &mut Catalog, overrides: &[FieldOverride]) -> OverrideReport {
    let index = catalog.index();
    let mut report = OverrideReport::default();
    for ov in overrides {
        let Some(mut record) = index
            .pointer(&ov.product_id)
            .and_then(|ptr| catalog.record_mut(ptr))
        else {
            warn!(product_id = %ov.product_id, field = %ov.field, "override target not found");
            report.missing.push(ov.product_id.clone());
            continue;
        };
        let value = ov.value.to_json();
        if record.get(&ov.field) != Some(&value) {
            info!(product_id = %ov.product_id, field = %ov.field, "applied override");
            record.set(&ov.field, value);
            report.applied += 1;
        }
    }
    report
}
