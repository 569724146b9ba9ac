//! Suffix rule tables for grammar and lead-in completion.
//!
//! Each table is an ordered list of (phrase, completion, id). Adding a rule
//! means adding a row here; the matchers in `text` never name a phrase.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixRule {
    pub phrase: &'static str,
    pub completion: &'static str,
    pub id: &'static str,
}

const fn rule(phrase: &'static str, completion: &'static str, id: &'static str) -> SuffixRule {
    SuffixRule {
        phrase,
        completion,
        id,
    }
}

/// Dangling description endings. The completion replaces the phrase.
pub const GRAMMAR_RULES: &[SuffixRule] = &[
    rule("bonds to", "bonds to a wide variety of substrates.", "bonds_to"),
    rule(
        "formulated for",
        "formulated for demanding construction applications.",
        "formulated_for",
    ),
    rule(
        "designed for",
        "formulated for demanding construction applications.",
        "designed_for",
    ),
];

/// Lead-in phrases in priority order. The completion is appended after the
/// phrase as written.
pub const LEAD_IN_RULES: &[SuffixRule] = &[
    rule("such as", " the following:", "such_as"),
    rule("including", " the following:", "including"),
    rule("applications include", " the following:", "applications_include"),
    rule("bonds to", " the following substrates:", "bonds_to"),
    rule("used for", " the following applications:", "used_for"),
    rule("ideal for", " the following applications:", "ideal_for"),
    rule("compatible with", " the following:", "compatible_with"),
    rule("designed for", " the following applications:", "designed_for"),
    rule("formulated for", " the following applications:", "formulated_for"),
    rule("using", " the following materials:", "using"),
    rule("this includes", " the following:", "this_includes"),
    rule("include", " the following:", "include"),
];

pub const COLON_WITH_CONTEXT: &str = "colon_fallback_with_context";
pub const COLON_PLAIN: &str = "colon_fallback_plain";

#[derive(Debug)]
pub struct CompiledRule {
    pub rule: SuffixRule,
    pub re: Regex,
}

/// Where a rule matched inside the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixMatch {
    pub rule: SuffixRule,
    /// Byte offset where the phrase starts.
    pub start: usize,
    /// Byte offset just past the phrase, before any trailing punctuation.
    pub phrase_end: usize,
}

/// A compiled, ordered rule table. `trailing` is the pattern allowed between
/// the phrase and the end of the text.
#[derive(Debug)]
pub struct SuffixRules {
    rules: Vec<CompiledRule>,
}

impl SuffixRules {
    pub fn compile(table: &[SuffixRule], trailing: &str) -> Self {
        let rules = table
            .iter()
            .map(|rule| CompiledRule {
                rule: *rule,
                re: Regex::new(&format!(
                    r"(?i)\b({}){}$",
                    regex::escape(rule.phrase),
                    trailing
                ))
                .expect("suffix rule pattern is valid"),
            })
            .collect();
        SuffixRules { rules }
    }

    /// Grammar table: phrase, optional period, trailing whitespace.
    pub fn grammar(table: &[SuffixRule]) -> Self {
        let mut compiled = Self::compile(table, r"\.?\s*");
        // longest phrase is the most specific one
        compiled
            .rules
            .sort_by(|a, b| b.rule.phrase.len().cmp(&a.rule.phrase.len()));
        compiled
    }

    /// Lead-in table: phrase, optional colon. Table order is priority.
    pub fn lead_in(table: &[SuffixRule]) -> Self {
        Self::compile(table, r"\s*:?\s*")
    }

    pub fn first_match(&self, text: &str) -> Option<SuffixMatch> {
        self.rules.iter().find_map(|c| {
            let phrase = c.re.captures(text)?.get(1)?;
            Some(SuffixMatch {
                rule: c.rule,
                start: phrase.start(),
                phrase_end: phrase.end(),
            })
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.rules.iter().any(|c| c.re.is_match(text))
    }
}

/// Both rule tables, compiled once per run and handed to the passes.
#[derive(Debug)]
pub struct RuleSet {
    pub grammar: SuffixRules,
    pub lead_in: SuffixRules,
}

impl RuleSet {
    pub fn new(grammar: &[SuffixRule], lead_in: &[SuffixRule]) -> Self {
        RuleSet {
            grammar: SuffixRules::grammar(grammar),
            lead_in: SuffixRules::lead_in(lead_in),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(GRAMMAR_RULES, LEAD_IN_RULES)
    }
}
