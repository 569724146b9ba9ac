//! Text canonicalization. Every function here is idempotent: applying it to
//! its own output changes nothing.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{SuffixRules, COLON_PLAIN, COLON_WITH_CONTEXT};

static LEADING_BULLETS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*[\*\-\u{2022}]+)+\s*").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n|\r").unwrap());
static COMMA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SIZE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\n;/]+").unwrap());

const FOLLOWING: &str = "the following";
const FOLLOWING_ITEMS: &str = ". The following are typical applications:";

/// Remove a leading run of bullet markers (`*`, `-`, `•`) and the whitespace
/// after it.
pub fn strip_bullets(text: &str) -> String {
    LEADING_BULLETS_RE.replace(text, "").into_owned()
}

/// Flatten free text onto one line: newlines become ", ", asterisks go,
/// comma spacing and whitespace runs collapse, edge spaces and commas trim,
/// and a leading bullet run is dropped.
pub fn normalize_free_text(text: &str) -> String {
    settle(text, |s| strip_bullets(&free_text_pass(s)))
}

/// Cleanup for a single list item or size token. Items get the same
/// treatment as free-text fields.
pub fn clean_item(text: &str) -> String {
    normalize_free_text(text)
}

fn free_text_pass(text: &str) -> String {
    let text = NEWLINES_RE.replace_all(text, ", ");
    let text = text.replace('*', "");
    let text = space_commas(&text);
    let text = SPACE_RE.replace_all(&text, " ");
    text.trim_matches(|c: char| c.is_whitespace() || c == ',')
        .to_string()
}

// Rewrites every comma to ", " except digit grouping like "1,000".
fn space_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in COMMA_RE.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        let grouped = m.as_str() == ","
            && text[..m.start()].ends_with(|c: char| c.is_ascii_digit())
            && text[m.end()..].starts_with(|c: char| c.is_ascii_digit());
        out.push_str(if grouped { "," } else { ", " });
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

// Repeat a pass until it stops changing the text.
fn settle<F>(text: &str, pass: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut current = pass(text);
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Split a contaminated field into size tokens on `, ; / newline` runs. A
/// value with no separators yields itself.
pub fn split_size_values(raw: &str) -> Vec<String> {
    SIZE_SPLIT_RE
        .split(raw)
        .map(clean_item)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Replace a dangling ending with its canonical sentence. Returns `None`
/// when no rule applies.
pub fn complete_grammar(text: &str, rules: &SuffixRules) -> Option<String> {
    let m = rules.first_match(text)?;
    let prefix = text[..m.start].trim_end_matches([' ', '.', ',', ':', ';']);
    let updated = if prefix.is_empty() {
        capitalize(m.rule.completion)
    } else {
        format!("{} {}", prefix, m.rule.completion)
    };
    (updated != text).then_some(updated)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True when an item looks like an introduction to a following list.
pub fn is_lead_in_candidate(text: &str, rules: &SuffixRules) -> bool {
    let value = text.trim();
    value.ends_with(':') || rules.is_match(value)
}

/// Complete a lead-in item. Returns the new text and the id of the rule that
/// fired, or `None` when the item is left alone.
pub fn complete_lead_in(
    text: &str,
    has_following_items: bool,
    rules: &SuffixRules,
) -> Option<(String, &'static str)> {
    let value = text.trim();
    if value.to_lowercase().contains(FOLLOWING) {
        return None;
    }

    if let Some(m) = rules.first_match(value) {
        let updated = format!("{}{}", &value[..m.phrase_end], m.rule.completion);
        return (updated != value).then_some((updated, m.rule.id));
    }

    let stem = value.strip_suffix(':')?.trim_end();
    if has_following_items {
        Some((format!("{}{}", stem, FOLLOWING_ITEMS), COLON_WITH_CONTEXT))
    } else {
        Some((format!("{}.", stem), COLON_PLAIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn rules() -> RuleSet {
        RuleSet::default()
    }

    #[test]
    fn bullets_stripped() {
        assert_eq!(strip_bullets("- Fast cure"), "Fast cure");
        assert_eq!(strip_bullets("  ** Fast cure"), "Fast cure");
        assert_eq!(strip_bullets("\u{2022} Fast cure"), "Fast cure");
        assert_eq!(strip_bullets("- - Fast cure"), "Fast cure");
        assert_eq!(strip_bullets("Fast-cure"), "Fast-cure");
    }

    #[test]
    fn free_text_flattened() {
        assert_eq!(normalize_free_text("Gray\n*Black*"), "Gray, Black");
        assert_eq!(normalize_free_text("  Gray ,White,  Tan , "), "Gray, White, Tan");
        assert_eq!(
            normalize_free_text("Clean   with\tmineral spirits"),
            "Clean with mineral spirits"
        );
        assert_eq!(normalize_free_text(",,"), "");
    }

    #[test]
    fn free_text_loses_leading_bullets() {
        assert_eq!(normalize_free_text("- Gray"), "Gray");
        assert_eq!(normalize_free_text("\u{2022} Mineral spirits"), "Mineral spirits");
        assert_eq!(normalize_free_text(", - Gray\nBlack"), "Gray, Black");
        assert_eq!(normalize_free_text("Gray - Black"), "Gray - Black");
    }

    #[test]
    fn digit_grouping_kept() {
        assert_eq!(
            normalize_free_text("Rated to 1,000 psi,fast"),
            "Rated to 1,000 psi, fast"
        );
        assert_eq!(normalize_free_text("1 , 000"), "1, 000");
    }

    #[test]
    fn item_cleanup() {
        assert_eq!(clean_item("* Bonds to metal\n"), "Bonds to metal");
        assert_eq!(clean_item(", - Low VOC"), "Low VOC");
        assert_eq!(clean_item("- , Low VOC"), "Low VOC");
        assert_eq!(clean_item(" - "), "");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let samples = [
            "- * foo",
            ", - foo , bar\n- baz",
            "\u{2022}\u{2022} a,b ,c",
            "***",
            "x\r\n\r\ny",
            "1,000 , 2,000",
            "  - ,  - ,  end",
        ];
        for s in samples {
            let once = clean_item(s);
            assert_eq!(clean_item(&once), once, "clean_item not idempotent on {:?}", s);
            let once = normalize_free_text(s);
            assert_eq!(
                normalize_free_text(&once),
                once,
                "free text not idempotent on {:?}",
                s
            );
            let once = strip_bullets(s);
            assert_eq!(strip_bullets(&once), once, "bullets not idempotent on {:?}", s);
        }
    }

    #[test]
    fn size_split() {
        assert_eq!(
            split_size_values("5 Gallon Pail, 55 Gallon Drum"),
            vec!["5 Gallon Pail", "55 Gallon Drum"]
        );
        assert_eq!(
            split_size_values("10.1 oz Cartridge / 20 oz Sausage;Tote\n"),
            vec!["10.1 oz Cartridge", "20 oz Sausage", "Tote"]
        );
        assert_eq!(split_size_values("55 Gallon Drum"), vec!["55 Gallon Drum"]);
        assert!(split_size_values(" , / ").is_empty());
    }

    #[test]
    fn grammar_scenarios() {
        let r = rules();
        assert_eq!(
            complete_grammar("Permanently bonds to.", &r.grammar).as_deref(),
            Some("Permanently bonds to a wide variety of substrates.")
        );
        assert_eq!(
            complete_grammar("A sealant designed for.", &r.grammar).as_deref(),
            Some("A sealant formulated for demanding construction applications.")
        );
        assert_eq!(
            complete_grammar("A primer, formulated for", &r.grammar).as_deref(),
            Some("A primer formulated for demanding construction applications.")
        );
        assert_eq!(
            complete_grammar("Bonds to.", &r.grammar).as_deref(),
            Some("Bonds to a wide variety of substrates.")
        );
    }

    #[test]
    fn grammar_leaves_complete_text() {
        let r = rules();
        let done = "Permanently bonds to a wide variety of substrates.";
        assert_eq!(complete_grammar(done, &r.grammar), None);
        assert_eq!(complete_grammar("Bonds to glass, metal and wood.", &r.grammar), None);
        assert_eq!(complete_grammar("Rebonds to.", &r.grammar), None);
        let fixed = complete_grammar("Formulated for.", &r.grammar).unwrap();
        assert_eq!(complete_grammar(&fixed, &r.grammar), None);
    }

    #[test]
    fn lead_in_scenarios() {
        let r = rules();
        assert_eq!(
            complete_lead_in("Ideal for", true, &r.lead_in),
            Some(("Ideal for the following applications:".to_string(), "ideal_for"))
        );
        assert_eq!(
            complete_lead_in("Bonds to:", false, &r.lead_in),
            Some(("Bonds to the following substrates:".to_string(), "bonds_to"))
        );
        assert_eq!(
            complete_lead_in("Use on surfaces such as :", true, &r.lead_in),
            Some(("Use on surfaces such as the following:".to_string(), "such_as"))
        );
    }

    #[test]
    fn lead_in_colon_fallback() {
        let r = rules();
        assert_eq!(
            complete_lead_in("Recommended uses :", true, &r.lead_in),
            Some((
                "Recommended uses. The following are typical applications:".to_string(),
                COLON_WITH_CONTEXT
            ))
        );
        assert_eq!(
            complete_lead_in("Recommended uses:", false, &r.lead_in),
            Some(("Recommended uses.".to_string(), COLON_PLAIN))
        );
        assert_eq!(complete_lead_in("Wood", true, &r.lead_in), None);
    }

    #[test]
    fn lead_in_guard_and_idempotence() {
        let r = rules();
        for s in [
            "Bonds to THE FOLLOWING:",
            "The following substrates, such as",
            "Applications include the following",
        ] {
            assert_eq!(complete_lead_in(s, true, &r.lead_in), None, "{:?}", s);
        }
        let cases = [
            ("Such as", true),
            ("Uses:", true),
            ("Uses:", false),
            ("Made using:", false),
        ];
        for (s, ctx) in cases {
            let (once, _) = complete_lead_in(s, ctx, &r.lead_in).unwrap();
            assert_eq!(complete_lead_in(&once, ctx, &r.lead_in), None, "{:?}", once);
        }
    }

    #[test]
    fn candidates() {
        let r = rules();
        assert!(is_lead_in_candidate("Ideal for", &r.lead_in));
        assert!(is_lead_in_candidate("Notes: ", &r.lead_in));
        assert!(!is_lead_in_candidate("Concrete", &r.lead_in));
    }
}
