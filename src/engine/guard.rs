//! Content Guard - sanitizes text crossing the trust boundary.
//!
//! Inbound candidate text has toxic language and PII redacted. Outbound
//! interviewer text has toxic language removed and its tone
//! professionalized. Off-topic detection is advisory only: it is logged
//! and reported, never used to block or rewrite a message.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::config::GuardConfig;

/// Replacement for toxic matches.
pub const FILTERED_MARKER: &str = "[filtered]";

/// Upper bound on redaction passes when converging on a fixpoint.
const MAX_FILTER_PASSES: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("EMAIL_RE regex should compile")
});

static CREDIT_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b")
        .expect("CREDIT_CARD_RE regex should compile")
});

static NATIONAL_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("NATIONAL_ID_RE regex should compile")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("PHONE_RE regex should compile")
});

static REPEATED_BANG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!{2,}").expect("REPEATED_BANG_RE regex should compile"));

static REPEATED_QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?{2,}").expect("REPEATED_QUESTION_RE regex should compile"));

/// Emoji blocks stripped from outbound text.
const EMOJI_RANGES: [(u32, u32); 4] = [
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x1F1E0, 0x1F1FF),
];

/// Categories of personally identifiable information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiCategory {
    Email,
    CreditCard,
    NationalId,
    Phone,
}

impl PiiCategory {
    /// Redaction order: most specific digit patterns before phone numbers.
    pub const ALL: [PiiCategory; 4] = [
        PiiCategory::Email,
        PiiCategory::CreditCard,
        PiiCategory::NationalId,
        PiiCategory::Phone,
    ];

    pub fn marker(&self) -> &'static str {
        match self {
            PiiCategory::Email => "[REDACTED_EMAIL]",
            PiiCategory::CreditCard => "[REDACTED_CREDIT_CARD]",
            PiiCategory::NationalId => "[REDACTED_NATIONAL_ID]",
            PiiCategory::Phone => "[REDACTED_PHONE]",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PiiCategory::Email => "email",
            PiiCategory::CreditCard => "credit card",
            PiiCategory::NationalId => "national id",
            PiiCategory::Phone => "phone",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            PiiCategory::Email => &*EMAIL_RE,
            PiiCategory::CreditCard => &*CREDIT_CARD_RE,
            PiiCategory::NationalId => &*NATIONAL_ID_RE,
            PiiCategory::Phone => &*PHONE_RE,
        }
    }
}

/// A configured pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid guard pattern '{pattern}': {source}")]
pub struct GuardConfigError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Result of a filter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Sanitized text.
    pub text: String,
    /// Whether filtering changed anything.
    pub was_modified: bool,
}

/// Word-count bounds violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LengthViolation {
    #[error("Response too short. Please provide more detail (minimum {min} words).")]
    TooShort { min: usize, actual: usize },
    #[error("Response too long. Please be more concise (maximum {max} words).")]
    TooLong { max: usize, actual: usize },
}

/// Stateless sanitizer and validator for interview text.
#[derive(Debug, Clone)]
pub struct ContentGuard {
    strict_mode: bool,
    toxic: Vec<Regex>,
    off_topic: Vec<Regex>,
    allowed_topics: HashSet<String>,
}

impl ContentGuard {
    /// Compile the configured pattern tables.
    pub fn new(config: &GuardConfig) -> Result<Self, GuardConfigError> {
        Ok(Self {
            strict_mode: config.strict_mode,
            toxic: compile_all(&config.toxic_patterns)?,
            off_topic: compile_all(&config.off_topic_patterns)?,
            allowed_topics: config
                .allowed_topics
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
        })
    }

    /// Sanitize candidate text: toxic language, then PII.
    ///
    /// Idempotent: filtering already-filtered text changes nothing.
    pub fn filter_input(&self, text: &str) -> FilterOutcome {
        let filtered = converge(text, |current| redact_pii(&self.remove_toxic(current)));

        if self.is_off_topic(&filtered) {
            tracing::warn!(
                words = filtered.split_whitespace().count(),
                "Off-topic content detected"
            );
        }

        let was_modified = filtered != text;
        if was_modified {
            tracing::debug!("Content was filtered by guardrails");
        }

        FilterOutcome {
            text: filtered.trim().to_string(),
            was_modified,
        }
    }

    /// Sanitize interviewer text: toxic language and tone.
    ///
    /// PII is not redacted since outbound text is system-authored.
    pub fn filter_output(&self, text: &str) -> FilterOutcome {
        let filtered = converge(text, |current| professionalize(&self.remove_toxic(current)));
        let was_modified = filtered != text;

        FilterOutcome {
            text: filtered.trim().to_string(),
            was_modified,
        }
    }

    /// Check that `text` has between `min_words` and `max_words` words.
    pub fn validate_length(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<(), LengthViolation> {
        let actual = text.split_whitespace().count();
        if actual < min_words {
            return Err(LengthViolation::TooShort {
                min: min_words,
                actual,
            });
        }
        if actual > max_words {
            return Err(LengthViolation::TooLong {
                max: max_words,
                actual,
            });
        }
        Ok(())
    }

    /// Advisory report of what the filters would act on.
    pub fn warnings(&self, text: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.toxic.iter().any(|re| re.is_match(text)) {
            warnings.push("Contains potentially inappropriate language".to_string());
        }

        if self.is_off_topic(text) {
            warnings.push("May be off-topic for an interview context".to_string());
        }

        for category in PiiCategory::ALL {
            if category.pattern().is_match(text) {
                warnings.push(format!("Contains {}", category.label()));
            }
        }

        warnings
    }

    /// Whether `text` looks unrelated to an interview.
    ///
    /// In strict mode a message with more than 10 distinct words that
    /// mentions none of the allowed topics is also flagged. Surrounding
    /// punctuation is ignored when comparing words.
    pub fn is_off_topic(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        if self.off_topic.iter().any(|re| re.is_match(&lower)) {
            return true;
        }

        if self.strict_mode {
            let tokens: HashSet<&str> = lower
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
                .filter(|w| !w.is_empty())
                .collect();
            let relevant = tokens.iter().any(|t| self.allowed_topics.contains(*t));
            if !relevant && tokens.len() > 10 {
                return true;
            }
        }

        false
    }

    fn remove_toxic(&self, text: &str) -> String {
        self.toxic.iter().fold(text.to_string(), |acc, re| {
            re.replace_all(&acc, FILTERED_MARKER).into_owned()
        })
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, GuardConfigError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| GuardConfigError {
                    pattern: p.clone(),
                    source,
                })
        })
        .collect()
}

fn redact_pii(text: &str) -> String {
    PiiCategory::ALL.iter().fold(text.to_string(), |acc, category| {
        category
            .pattern()
            .replace_all(&acc, category.marker())
            .into_owned()
    })
}

fn professionalize(text: &str) -> String {
    let collapsed = REPEATED_BANG_RE.replace_all(text, "!");
    let collapsed = REPEATED_QUESTION_RE.replace_all(&collapsed, "?");
    collapsed.chars().filter(|c| !is_emoji(*c)).collect()
}

fn is_emoji(c: char) -> bool {
    let code = c as u32;
    EMOJI_RANGES
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&code))
}

/// Apply `pass` until the text stops changing.
///
/// A redaction can expose a new word boundary next to another match, so a
/// single pass is not always stable.
fn converge(text: &str, pass: impl Fn(&str) -> String) -> String {
    let mut current = pass(text);
    for _ in 1..MAX_FILTER_PASSES {
        let next = pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_guard() -> ContentGuard {
        ContentGuard::new(&GuardConfig::default()).unwrap()
    }

    fn strict_guard() -> ContentGuard {
        ContentGuard::new(&GuardConfig {
            strict_mode: true,
            ..GuardConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_clean_input_untouched() {
        let guard = make_guard();
        let outcome = guard.filter_input("I designed the payment service.");
        assert_eq!(outcome.text, "I designed the payment service.");
        assert!(!outcome.was_modified);
    }

    #[test]
    fn test_email_and_phone_redacted() {
        let guard = make_guard();
        let outcome = guard.filter_input("Contact me at a@b.com or 555-123-4567");

        assert!(outcome.was_modified);
        assert!(!outcome.text.contains("a@b.com"));
        assert!(!outcome.text.contains("555-123-4567"));
        assert!(outcome.text.contains("[REDACTED_EMAIL]"));
        assert!(outcome.text.contains("[REDACTED_PHONE]"));
    }

    #[test]
    fn test_national_id_and_card_redacted() {
        let guard = make_guard();
        let outcome = guard.filter_input("id 123-45-6789 card 4111 1111 1111 1111");
        assert_eq!(
            outcome.text,
            "id [REDACTED_NATIONAL_ID] card [REDACTED_CREDIT_CARD]"
        );
    }

    #[test]
    fn test_toxic_language_filtered_case_insensitive() {
        let guard = make_guard();
        let outcome = guard.filter_input("That manager was an IDIOT, honestly.");
        assert_eq!(outcome.text, "That manager was an [filtered], honestly.");
        assert!(outcome.was_modified);
    }

    #[test]
    fn test_filter_input_idempotent() {
        let guard = make_guard();
        let inputs = [
            "Contact me at a@b.com or 555-123-4567",
            "I hate this stupid 123-45-6789 form!!",
            "die123-45-6789 is an odd token",
            "  padded text with spaces  ",
            "plain text",
            "",
        ];
        for input in inputs {
            let once = guard.filter_input(input).text;
            let twice = guard.filter_input(&once);
            assert_eq!(twice.text, once, "not idempotent for {:?}", input);
            assert!(!twice.was_modified);
        }
    }

    #[test]
    fn test_filter_output_professionalizes() {
        let guard = make_guard();
        let outcome = guard.filter_output("Great answer!!! Really??? 😀🚀");
        assert_eq!(outcome.text, "Great answer! Really?");
        assert!(outcome.was_modified);
    }

    #[test]
    fn test_filter_output_keeps_pii() {
        let guard = make_guard();
        let outcome = guard.filter_output("Email recruiting@example.com with questions.");
        assert!(outcome.text.contains("recruiting@example.com"));
        assert!(!outcome.was_modified);
    }

    #[test]
    fn test_filter_output_converges_when_emoji_separates_punctuation() {
        let guard = make_guard();
        let outcome = guard.filter_output("Wow!😀!");
        assert_eq!(outcome.text, "Wow!");
        assert_eq!(guard.filter_output(&outcome.text).text, outcome.text);
    }

    #[test]
    fn test_validate_length() {
        let guard = make_guard();
        assert_eq!(
            guard.validate_length("too short", 3, 500),
            Err(LengthViolation::TooShort { min: 3, actual: 2 })
        );
        assert!(guard.validate_length("this is fine", 3, 500).is_ok());

        let err = guard.validate_length("one two three four", 1, 3).unwrap_err();
        assert!(err.to_string().contains("maximum 3 words"));
    }

    #[test]
    fn test_off_topic_is_advisory() {
        let guard = make_guard();
        let text = "Let's talk about politics instead.";
        assert!(guard.is_off_topic(text));

        let outcome = guard.filter_input(text);
        assert_eq!(outcome.text, text);
        assert!(!outcome.was_modified);
    }

    #[test]
    fn test_strict_mode_flags_long_irrelevant_text() {
        let text = "I really enjoyed the long drive over here this morning with my dog";
        assert!(!make_guard().is_off_topic(text));
        assert!(strict_guard().is_off_topic(text));

        let relevant = "I really enjoyed the long drive over here thinking about the project";
        assert!(!strict_guard().is_off_topic(relevant));

        let short = "nice weather here";
        assert!(!strict_guard().is_off_topic(short));
    }

    #[test]
    fn test_strict_mode_counts_distinct_words() {
        let repeated = "dog dog dog dog dog cat cat cat cat cat bird bird bird";
        assert!(!strict_guard().is_off_topic(repeated));

        let punctuated = "Honestly, the drive over here, the traffic, the rain, the radio, the coffee!";
        assert!(!strict_guard().is_off_topic(punctuated));

        let varied = "one two three four five six seven eight nine ten eleven";
        assert!(strict_guard().is_off_topic(varied));
    }

    #[test]
    fn test_warnings_report_categories() {
        let guard = make_guard();
        let warnings = guard.warnings("You idiot, mail me at a@b.com about politics");
        assert!(warnings.contains(&"Contains potentially inappropriate language".to_string()));
        assert!(warnings.contains(&"May be off-topic for an interview context".to_string()));
        assert!(warnings.contains(&"Contains email".to_string()));
        assert!(!warnings.contains(&"Contains phone".to_string()));

        assert!(guard.warnings("I designed the cache layer.").is_empty());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = ContentGuard::new(&GuardConfig {
            toxic_patterns: vec!["(unclosed".to_string()],
            ..GuardConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.pattern, "(unclosed");
    }
}
