use tracing::debug;

use crate::catalog::Catalog;
use crate::rules::RuleSet;
use crate::settings::Vocabulary;
use crate::text::complete_grammar;

pub const DESCRIPTION: &str = "description";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GrammarReport {
    pub fixed: usize,
    pub skipped: usize,
}

/// Complete dangling description endings on every record not on the skip
/// list.
pub fn run(catalog: &mut Catalog, rules: &RuleSet, vocab: &Vocabulary) -> GrammarReport {
    let mut report = GrammarReport::default();
    catalog.for_each_record(|mut record| {
        if vocab.is_skipped(record.id()) {
            report.skipped += 1;
            return;
        }
        let Some(description) = record.text(DESCRIPTION) else {
            return;
        };
        if let Some(updated) = complete_grammar(description, &rules.grammar) {
            debug!(product_id = %record.id(), %updated, "completed description");
            record.set_text(DESCRIPTION, updated);
            report.fixed += 1;
        }
    });
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixes_descriptions_and_respects_skip_list() {
        let mut catalog = Catalog::new(json!([
            { "product_id": "IC932", "description": "Permanently bonds to." },
            { "product_id": "T-OS150", "description": "Sealant designed for." },
            { "product_id": "X1", "description": ["not", "text"] },
            { "product_id": "X2" }
        ]));
        let report = run(&mut catalog, &RuleSet::default(), &Vocabulary::default());
        assert_eq!(report, GrammarReport { fixed: 1, skipped: 1 });
        assert_eq!(
            catalog.root()[0]["description"],
            "Permanently bonds to a wide variety of substrates."
        );
        assert_eq!(catalog.root()[1]["description"], "Sealant designed for.");

        let again = run(&mut catalog, &RuleSet::default(), &Vocabulary::default());
        assert_eq!(again.fixed, 0);
    }
}
