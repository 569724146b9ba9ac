//! Sweeps over the catalog, composed into the named phases the CLI runs.
//!
//!   perfect  grammar, color -> sizing, leading bullets on benefit/application items
//!   polish   grammar, list cleanup (sizing deduped), color/cleanup text, reclassify both
//!   scrub    overrides, color/cleanup text, full list cleanup with dedupe, color fail-safe
//!   lead-in  lead-in completion, review entries returned for the report file
//!   patch    reviewed edits
//!   restore  empty lists refilled from a backup

pub mod grammar;
pub mod leadin;
pub mod overrides;
pub mod patch;
pub mod reclassify;
pub mod restore;
pub mod sanitize;

use serde_json::Value;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::metrics::RunSummary;
use crate::rules::RuleSet;
use crate::settings::Vocabulary;
use crate::store::TreeSink;
use crate::text::{clean_item, normalize_free_text, strip_bullets};

use leadin::LeadInReviewEntry;
use overrides::FieldOverride;
use patch::PatchEntry;
use reclassify::SIZING;
use sanitize::ListPlan;

pub const COLOR: &str = "color";
pub const CLEANUP: &str = "cleanup";
pub const BENEFITS: &str = "benefits";
pub const APPLICATIONS: &str = "applications";

fn start(title: &str, catalog: &Catalog) -> RunSummary {
    let mut summary = RunSummary::new(title);
    summary.count("records scanned", catalog.records().len());
    summary
}

pub fn perfect(catalog: &mut Catalog, rules: &RuleSet, vocab: &Vocabulary) -> RunSummary {
    let mut summary = start("Data perfection", catalog);

    let grammar = grammar::run(catalog, rules, vocab);
    let moved = reclassify::run(catalog, &[COLOR], vocab);
    let bullets = sanitize::run(
        catalog,
        &[ListPlan::keep(BENEFITS), ListPlan::keep(APPLICATIONS)],
        strip_bullets,
    );

    summary.count("grammar fixes", grammar.fixed);
    summary.count("field contamination fixes", moved.cleared);
    summary.count("sizes moved", moved.moved);
    summary.count("bullet formatting fixes", bullets.cleaned);
    summary.count("skip-listed records", grammar.skipped);
    summary
}

pub fn polish(catalog: &mut Catalog, rules: &RuleSet, vocab: &Vocabulary) -> RunSummary {
    let mut summary = start("Final polish", catalog);

    let grammar = grammar::run(catalog, rules, vocab);
    let lists = sanitize::run(
        catalog,
        &[
            ListPlan::dedupe(SIZING),
            ListPlan::keep(BENEFITS),
            ListPlan::keep(APPLICATIONS),
        ],
        clean_item,
    );
    let text = sanitize::run_text_fields(catalog, &[COLOR, CLEANUP], normalize_free_text);
    let moved = reclassify::run(catalog, &[COLOR, CLEANUP], vocab);

    summary.count("description fixes", grammar.fixed);
    summary.count("list item cleanups", lists.cleaned);
    summary.count("empty items dropped", lists.dropped);
    summary.count("sizing deduplications", lists.deduped);
    summary.count("color/cleanup formatting cleanups", text);
    summary.count("contaminated color/cleanup clears", moved.cleared);
    summary.count("sizes moved", moved.moved);
    summary
}

pub fn scrub(catalog: &mut Catalog, vocab: &Vocabulary, pinned: &[FieldOverride]) -> RunSummary {
    let mut summary = start("Scrub", catalog);

    let pins = overrides::run(catalog, pinned);
    let text = sanitize::run_text_fields(catalog, &[COLOR, CLEANUP], normalize_free_text);
    let lists = sanitize::run(
        catalog,
        &[
            ListPlan::dedupe(SIZING),
            ListPlan::dedupe(BENEFITS),
            ListPlan::dedupe(APPLICATIONS),
        ],
        clean_item,
    );
    let moved = reclassify::run(catalog, &[COLOR], vocab);

    summary.count("overrides applied", pins.applied);
    summary.count("text field cleanups", text);
    summary.count("list item cleanups", lists.cleaned);
    summary.count("empty items dropped", lists.dropped);
    summary.count("duplicates removed", lists.deduped);
    summary.count("sizing migrations", moved.cleared);
    for id in &pins.missing {
        summary.note(format!("override for {} matched no record", id));
    }
    summary
}

pub fn lead_in(
    catalog: &mut Catalog,
    rules: &RuleSet,
    fields: &[String],
) -> (RunSummary, Vec<LeadInReviewEntry>) {
    let mut summary = start("Lead-in normalization", catalog);
    let entries = leadin::run(catalog, fields, rules);
    summary.count("lead-in replacements", entries.len());
    (summary, entries)
}

pub fn apply_patches(catalog: &mut Catalog, entries: &[PatchEntry]) -> RunSummary {
    let mut summary = start("Patch reconciliation", catalog);
    summary.count("patches loaded", entries.len());

    let report = patch::run(catalog, entries);
    summary.count("applied", report.applied);
    summary.count("applied by content fallback", report.fallback);
    summary.count("already correct", report.already_correct);
    summary.count("not found", report.not_found);
    for id in &report.duplicate_ids {
        summary.note(format!("duplicate product_id {}", id));
    }
    for miss in &report.unresolved {
        summary.note(miss.describe());
    }
    summary
}

pub fn restore_backup(
    catalog: &mut Catalog,
    backup: &[Value],
    fields: &[String],
    snapshot: &dyn TreeSink,
) -> Result<RunSummary> {
    let mut summary = start("Backup restore", catalog);
    let report = restore::run(catalog, backup, fields, snapshot)?;
    summary.count("records restored", report.restored.len());
    summary.count("lists restored", report.lists);
    if !report.restored.is_empty() {
        summary.note(format!("restored: {}", report.restored.join(",")));
    }
    for id in &report.duplicate_ids {
        summary.note(format!("duplicate product_id {}", id));
    }
    Ok(summary)
}
