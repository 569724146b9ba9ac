use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::Catalog;
use crate::rules::RuleSet;
use crate::text::{complete_lead_in, is_lead_in_candidate};

/// One lead-in rewrite, written to the review report. A reviewed report is
/// loadable as a patch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInReviewEntry {
    pub product_id: String,
    pub field: String,
    pub index: usize,
    pub reason: String,
    pub before: String,
    pub after: String,
}

/// Complete lead-in items in the given list fields.
pub fn run(catalog: &mut Catalog, fields: &[String], rules: &RuleSet) -> Vec<LeadInReviewEntry> {
    let mut entries = Vec::new();
    catalog.for_each_record(|mut record| {
        let product_id = record.id().to_string();
        for field in fields {
            let Some(items) = record.list_or_warn(field) else {
                continue;
            };
            let last = items.len().saturating_sub(1);
            for (index, item) in items.iter_mut().enumerate() {
                let Value::String(text) = item else {
                    continue;
                };
                if !is_lead_in_candidate(text, &rules.lead_in) {
                    continue;
                }
                let before = text.trim().to_string();
                let Some((after, reason)) = complete_lead_in(&before, index < last, &rules.lead_in)
                else {
                    continue;
                };
                debug!(%product_id, field = %field, index, reason, "completed lead-in");
                *text = after.clone();
                entries.push(LeadInReviewEntry {
                    product_id: product_id.clone(),
                    field: field.clone(),
                    index,
                    reason: reason.to_string(),
                    before,
                    after,
                });
            }
        }
    });
    entries
}
