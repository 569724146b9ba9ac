//! Reviewed before/after edits applied to single list positions.
//!
//! Matching is tolerant: the stated index is tried first, then the first
//! exact occurrence of `before` anywhere in the same list. An entry whose
//! `after` text is already in place counts as already correct, so replaying a
//! patch list is harmless.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Record};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatchEntry {
    pub product_id: String,
    pub field: String,
    pub index: i64,
    pub before: String,
    pub after: String,
}

/// Keep the entries that carry all five keys with the right types.
pub fn parse_entries(raw: Vec<Value>) -> Vec<PatchEntry> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(position = i, %err, "ignoring incomplete patch entry");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    AlreadyCorrect,
    FallbackApplied { at: usize },
    NotFound(Miss),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    Record,
    Field,
    Content,
}

impl Miss {
    fn describe(self) -> &'static str {
        match self {
            Miss::Record => "record not found",
            Miss::Field => "field missing or not a list",
            Miss::Content => "no exact match",
        }
    }
}

/// Entry that could not be placed, kept for manual follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub entry: PatchEntry,
    pub miss: Miss,
}

impl Unresolved {
    pub fn describe(&self) -> String {
        format!(
            "{} [{}] index {}: {}",
            self.entry.product_id,
            self.entry.field,
            self.entry.index,
            self.miss.describe()
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Replacements made, fallbacks included.
    pub applied: usize,
    /// Of `applied`, how many needed the content search.
    pub fallback: usize,
    pub already_correct: usize,
    pub not_found: usize,
    pub unresolved: Vec<Unresolved>,
    /// Identifiers carried by more than one record; the first one is patched.
    pub duplicate_ids: Vec<String>,
}

pub fn run(catalog: &mut Catalog, entries: &[PatchEntry]) -> PatchReport {
    let index = catalog.index();
    let mut report = PatchReport {
        duplicate_ids: index.duplicates().to_vec(),
        ..PatchReport::default()
    };

    for entry in entries {
        let outcome = match index
            .pointer(&entry.product_id)
            .and_then(|ptr| catalog.record_mut(ptr))
        {
            Some(mut record) => apply(&mut record, entry),
            None => PatchOutcome::NotFound(Miss::Record),
        };

        match outcome {
            PatchOutcome::Applied => report.applied += 1,
            PatchOutcome::FallbackApplied { at } => {
                debug!(
                    product_id = %entry.product_id,
                    field = %entry.field,
                    from = entry.index,
                    at,
                    "patched by content"
                );
                report.applied += 1;
                report.fallback += 1;
            }
            PatchOutcome::AlreadyCorrect => report.already_correct += 1,
            PatchOutcome::NotFound(miss) => {
                warn!(
                    product_id = %entry.product_id,
                    field = %entry.field,
                    index = entry.index,
                    "{}",
                    miss.describe()
                );
                report.not_found += 1;
                report.unresolved.push(Unresolved {
                    entry: entry.clone(),
                    miss,
                });
            }
        }
    }
    report
}

/// Resolve one entry against its record.
pub fn apply(record: &mut Record<'_>, entry: &PatchEntry) -> PatchOutcome {
    let Some(values) = record.list_mut(&entry.field) else {
        return PatchOutcome::NotFound(Miss::Field);
    };
    let is = |v: &Value, s: &str| v.as_str() == Some(s);

    if let Some(current) = usize::try_from(entry.index)
        .ok()
        .and_then(|i| values.get_mut(i))
    {
        if is(&*current, &entry.after) {
            return PatchOutcome::AlreadyCorrect;
        }
        if is(&*current, &entry.before) {
            *current = Value::String(entry.after.clone());
            return PatchOutcome::Applied;
        }
    }

    if let Some(at) = values.iter().position(|v| is(v, &entry.before)) {
        values[at] = Value::String(entry.after.clone());
        return PatchOutcome::FallbackApplied { at };
    }

    if values.iter().any(|v| is(v, &entry.after)) {
        PatchOutcome::AlreadyCorrect
    } else {
        PatchOutcome::NotFound(Miss::Content)
    }
}
