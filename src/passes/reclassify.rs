use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::catalog::{Catalog, Record};
use crate::settings::Vocabulary;
use crate::text::split_size_values;

pub const SIZING: &str = "sizing";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReclassifyReport {
    /// Fields found holding size vocabulary and cleared.
    pub cleared: usize,
    /// Tokens newly appended to `sizing`.
    pub moved: usize,
}

/// Move size/packaging text out of `fields` into `sizing`.
pub fn run(catalog: &mut Catalog, fields: &[&str], vocab: &Vocabulary) -> ReclassifyReport {
    let mut report = ReclassifyReport::default();
    catalog.for_each_record(|mut record| {
        if vocab.is_skipped(record.id()) {
            return;
        }
        for field in fields {
            if let Some(moved) = reclassify_field(&mut record, field, vocab) {
                report.cleared += 1;
                report.moved += moved;
            }
        }
    });
    report
}

/// Returns the number of tokens appended when the field was contaminated,
/// `None` when it was left alone. A contaminated field is always cleared,
/// even if nothing usable could be split out of it.
pub fn reclassify_field(record: &mut Record<'_>, field: &str, vocab: &Vocabulary) -> Option<usize> {
    let raw = record.text(field)?.trim();
    if raw.is_empty() || !vocab.is_contaminated(raw) {
        return None;
    }
    let tokens = split_size_values(raw);

    let sizing = record.ensure_list(SIZING);
    let mut existing: HashSet<String> = sizing
        .iter()
        .filter_map(Value::as_str)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let mut moved = 0;
    for token in tokens {
        if existing.insert(token.to_lowercase()) {
            sizing.push(Value::String(token));
            moved += 1;
        }
    }

    debug!(product_id = %record.id(), field, moved, "moved size text into sizing");
    record.set_text(field, "");
    Some(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vocab() -> Vocabulary {
        Vocabulary::default()
    }

    #[test]
    fn color_moves_into_empty_sizing() {
        let mut catalog = Catalog::new(json!({
            "product_id": "R-A2000",
            "color": "5 Gallon Pail, 55 Gallon Drum",
            "sizing": []
        }));
        let report = run(&mut catalog, &["color"], &vocab());
        assert_eq!(report, ReclassifyReport { cleared: 1, moved: 2 });
        assert_eq!(catalog.root()["color"], "");
        assert_eq!(catalog.root()["sizing"], json!(["5 Gallon Pail", "55 Gallon Drum"]));
    }

    #[test]
    fn existing_sizes_not_duplicated() {
        let mut catalog = Catalog::new(json!({
            "product_id": "A",
            "color": "5 gallon pail; Tote",
            "sizing": ["5 Gallon Pail"]
        }));
        let report = run(&mut catalog, &["color"], &vocab());
        assert_eq!(report.moved, 1);
        assert_eq!(catalog.root()["sizing"], json!(["5 Gallon Pail", "Tote"]));
    }

    #[test]
    fn missing_or_bad_sizing_is_created() {
        let mut catalog = Catalog::new(json!([
            { "product_id": "A", "color": "Cartridge" },
            { "product_id": "B", "color": "Drum", "sizing": "n/a" }
        ]));
        run(&mut catalog, &["color"], &vocab());
        assert_eq!(catalog.root()[0]["sizing"], json!(["Cartridge"]));
        assert_eq!(catalog.root()[1]["sizing"], json!(["Drum"]));
    }

    #[test]
    fn cleared_even_without_tokens() {
        let mut catalog = Catalog::new(json!({
            "product_id": "A",
            "cleanup": "pail",
            "sizing": ["PAIL"]
        }));
        let report = run(&mut catalog, &["color", "cleanup"], &vocab());
        assert_eq!(report, ReclassifyReport { cleared: 1, moved: 0 });
        assert_eq!(catalog.root()["cleanup"], "");
        assert_eq!(catalog.root()["sizing"], json!(["PAIL"]));
    }

    #[test]
    fn clean_colors_and_skip_list_untouched() {
        let mut catalog = Catalog::new(json!([
            { "product_id": "A", "color": "Gray" },
            { "product_id": "TU-FS10", "color": "1 Gallon Pail" }
        ]));
        let report = run(&mut catalog, &["color"], &vocab());
        assert_eq!(report.cleared, 0);
        assert_eq!(catalog.root()[0]["color"], "Gray");
        assert_eq!(catalog.root()[1]["color"], "1 Gallon Pail");
    }

    #[test]
    fn no_contaminated_color_survives() {
        let mut catalog = Catalog::new(json!({
            "group": [
                { "product_id": "A", "color": "Black\n* 20 oz Sausage" },
                { "product_id": "B", "color": "DRUM / tote" },
                { "product_id": "C", "color": "White" }
            ]
        }));
        let vocab = vocab();
        run(&mut catalog, &["color"], &vocab);
        for record in catalog.records() {
            let color = record["color"].as_str().unwrap();
            assert!(color.is_empty() || !vocab.is_contaminated(color));
        }
        assert_eq!(catalog.root()["group"][0]["sizing"], json!(["Black", "20 oz Sausage"]));
    }
}
