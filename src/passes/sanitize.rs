use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::catalog::Catalog;

/// One list field and whether its items should be deduplicated.
#[derive(Debug, Clone, Copy)]
pub struct ListPlan<'a> {
    pub field: &'a str,
    pub dedupe: bool,
}

impl<'a> ListPlan<'a> {
    pub const fn keep(field: &'a str) -> Self {
        ListPlan {
            field,
            dedupe: false,
        }
    }

    pub const fn dedupe(field: &'a str) -> Self {
        ListPlan {
            field,
            dedupe: true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListOutcome {
    /// Items whose text changed.
    pub cleaned: usize,
    /// Items that became empty (or were null) and were removed.
    pub dropped: usize,
    /// Items removed as case-insensitive repeats.
    pub deduped: usize,
}

impl ListOutcome {
    fn add(&mut self, other: ListOutcome) {
        self.cleaned += other.cleaned;
        self.dropped += other.dropped;
        self.deduped += other.deduped;
    }
}

/// Clean every string item with `clean`, drop empties, optionally drop
/// case-insensitive repeats. Survivors keep their relative order and the
/// first occurrence keeps its casing. Non-string items are left as they are.
pub fn sanitize_list<F>(values: &mut Vec<Value>, dedupe: bool, clean: F) -> ListOutcome
where
    F: Fn(&str) -> String,
{
    let mut outcome = ListOutcome::default();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(values.len());

    for item in values.drain(..) {
        let text = match item {
            Value::String(text) => text,
            Value::Null => {
                outcome.dropped += 1;
                continue;
            }
            other => {
                kept.push(other);
                continue;
            }
        };
        let cleaned = clean(&text);
        if cleaned != text {
            outcome.cleaned += 1;
        }
        if cleaned.is_empty() {
            outcome.dropped += 1;
            continue;
        }
        if dedupe && !seen.insert(cleaned.to_lowercase()) {
            outcome.deduped += 1;
            continue;
        }
        kept.push(Value::String(cleaned));
    }

    *values = kept;
    outcome
}

/// Sanitize the planned list fields of every record.
pub fn run<F>(catalog: &mut Catalog, plan: &[ListPlan<'_>], clean: F) -> ListOutcome
where
    F: Fn(&str) -> String,
{
    let mut total = ListOutcome::default();
    catalog.for_each_record(|mut record| {
        for step in plan {
            if !record.has(step.field) {
                debug!(product_id = %record.id(), field = step.field, "no such list");
                continue;
            }
            let Some(values) = record.list_or_warn(step.field) else {
                continue;
            };
            total.add(sanitize_list(values, step.dedupe, &clean));
        }
    });
    total
}

/// Apply a text rule to plain string fields. Returns how many changed.
pub fn run_text_fields<F>(catalog: &mut Catalog, fields: &[&str], rule: F) -> usize
where
    F: Fn(&str) -> String,
{
    let mut changed = 0;
    catalog.for_each_record(|mut record| {
        for field in fields {
            let Some(text) = record.text(field) else {
                continue;
            };
            let updated = rule(text);
            if updated != text {
                record.set_text(field, updated);
                changed += 1;
            }
        }
    });
    changed
}
