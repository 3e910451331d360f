// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic complexity classification.
//!
//! Each category owns a list of case-insensitive regex signatures. Categories
//! are tried in priority order (website, code, complex, analysis, translate)
//! and the first one with a matching signature wins. Messages that match
//! nothing fall back to word-count breakpoints. No LLM pre-call, no network.

use std::sync::LazyLock;

use frugal_core::Category;
use regex::Regex;

/// At or above this many words an unmatched message is `complex`.
pub const COMPLEX_WORDS: usize = 200;
/// At or above this many words an unmatched message is `analysis`.
pub const ANALYSIS_WORDS: usize = 80;
/// At or above this many words an unmatched message is `code`.
pub const CODE_WORDS: usize = 30;

/// Result of classifying a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    /// Which signal decided, for logs.
    pub reason: &'static str,
    pub word_count: usize,
}

/// Ordered `(category, signatures)` table. Order is priority.
static SIGNATURES: LazyLock<Vec<(Category, Vec<Regex>)>> = LazyLock::new(|| {
    let compile = |patterns: &[&str]| -> Vec<Regex> {
        patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
            .collect()
    };

    vec![
        (
            Category::Website,
            compile(&[
                r"\b(website|web ?site|landing ?page|web ?page|homepage|web app|portfolio site)\b",
                r"\b(html|css|tailwind|bootstrap|wordpress|shopify)\b",
                r"\b(build|create|make|design|code)\b.{0,40}\b(site|page)\b",
            ]),
        ),
        (
            Category::Code,
            compile(&[
                r"```",
                r"\b(function|class|method|variable|compile[rs]?|debug|refactor|stack ?trace|regex|sql|api|endpoint)\b",
                r"\b(python|javascript|typescript|rust|golang|java|kotlin|swift|php|ruby|bash|c\+\+|c#)\b",
                r"\b(write|fix|review)\b.{0,20}\b(code|script|program|bug)\b",
                r"\b(def|fn|func)\s+\w+\s*\(",
                r"\b(const|let|var)\s+\w+\s*=",
            ]),
        ),
        (
            Category::Complex,
            compile(&[
                r"\b(step[- ]by[- ]step|in[- ]depth|comprehensive|exhaustive)\b",
                r"\b(architecture|trade-?offs?|business plan|strategy|roadmap)\b",
                r"\b(prove|proof|derive|demonstrate that|research paper)\b",
            ]),
        ),
        (
            Category::Analysis,
            compile(&[
                r"\b(analy[sz]e|analysis|compare|comparison|evaluate|assess(ment)?)\b",
                r"\b(pros and cons|advantages and disadvantages|summari[sz]e|explain why)\b",
                r"\b(statistics|trend|forecast|review this|critique)\b",
            ]),
        ),
        (
            Category::Translate,
            compile(&[
                r"\b(translate|translation|traduis|traduire|traduction|traducir|traduce|übersetze)\b",
                r"\b(into|in|to) (english|french|spanish|german|italian|portuguese|japanese|chinese|arabic|russian)\b",
                r"\bhow do you say\b",
            ]),
        ),
    ]
});

/// Stateless message classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityClassifier;

impl ComplexityClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a message. Pure and deterministic.
    pub fn classify(&self, message: &str) -> Classification {
        let trimmed = message.trim();
        let word_count = trimmed.split_whitespace().count();
        if trimmed.is_empty() {
            return Classification {
                category: Category::Simple,
                reason: "empty message",
                word_count,
            };
        }

        for (category, patterns) in SIGNATURES.iter() {
            if patterns.iter().any(|p| p.is_match(trimmed)) {
                return Classification {
                    category: *category,
                    reason: "keyword signature",
                    word_count,
                };
            }
        }

        let (category, reason) = Self::by_length(word_count);
        Classification {
            category,
            reason,
            word_count,
        }
    }

    fn by_length(word_count: usize) -> (Category, &'static str) {
        match word_count {
            n if n >= COMPLEX_WORDS => (Category::Complex, "very long message"),
            n if n >= ANALYSIS_WORDS => (Category::Analysis, "long message"),
            n if n >= CODE_WORDS => (Category::Code, "medium-length message"),
            _ => (Category::Simple, "short message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify(message: &str) -> Category {
        ComplexityClassifier::new().classify(message).category
    }

    #[test]
    fn greetings_are_simple() {
        assert_eq!(classify("hi"), Category::Simple);
        assert_eq!(classify("hello there"), Category::Simple);
        assert_eq!(classify("What is your refund policy?"), Category::Simple);
    }

    #[test]
    fn empty_and_whitespace_are_simple() {
        let c = ComplexityClassifier::new();
        assert_eq!(c.classify("").category, Category::Simple);
        let r = c.classify("   \n\t");
        assert_eq!(r.category, Category::Simple);
        assert_eq!(r.reason, "empty message");
    }

    #[test]
    fn fenced_code_is_code() {
        let msg = "Why does this function panic?\n```rust\nfn main() { let v: Vec<u8> = vec![]; v[0]; }\n```";
        assert_eq!(classify(msg), Category::Code);
    }

    #[test]
    fn website_outranks_code() {
        assert_eq!(
            classify("Build me a landing page with HTML and a JavaScript function"),
            Category::Website
        );
    }

    #[test]
    fn code_outranks_complex() {
        assert_eq!(
            classify("Explain step by step how to refactor this python script"),
            Category::Code
        );
    }

    #[test]
    fn complex_signatures() {
        assert_eq!(
            classify("Give me a comprehensive go-to-market strategy"),
            Category::Complex
        );
    }

    #[test]
    fn analysis_signatures() {
        assert_eq!(
            classify("Compare renting and buying a flat"),
            Category::Analysis
        );
    }

    #[test]
    fn translate_signatures() {
        assert_eq!(classify("Translate 'good morning'"), Category::Translate);
        assert_eq!(
            classify("Say thank you in Japanese please"),
            Category::Translate
        );
    }

    #[test]
    fn word_count_breakpoints() {
        let words = |n: usize| vec!["lorem"; n].join(" ");
        assert_eq!(classify(&words(CODE_WORDS - 1)), Category::Simple);
        assert_eq!(classify(&words(CODE_WORDS)), Category::Code);
        assert_eq!(classify(&words(ANALYSIS_WORDS)), Category::Analysis);
        assert_eq!(classify(&words(COMPLEX_WORDS)), Category::Complex);
    }

    #[test]
    fn everyday_words_do_not_trigger_code() {
        assert_eq!(classify("What is your return policy?"), Category::Simple);
        assert_eq!(classify("let me know when you open"), Category::Simple);
        assert_eq!(classify("const x = 1;"), Category::Code);
    }

    #[test]
    fn reason_reports_deciding_signal() {
        let c = ComplexityClassifier::new();
        assert_eq!(c.classify("translate this").reason, "keyword signature");
        assert_eq!(c.classify("hello").reason, "short message");
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(msg in ".{0,300}") {
            let c = ComplexityClassifier::new();
            prop_assert_eq!(c.classify(&msg), c.classify(&msg));
        }

        #[test]
        fn short_plain_words_are_simple(words in proptest::collection::vec("[q-z]{1,3}", 1..10)) {
            // Lowercase q..z triples cannot spell any signature keyword.
            let msg = words.join(" ");
            prop_assert_eq!(classify(&msg), Category::Simple);
        }
    }
}
