//! Scorer - deterministic transcript evaluation.
//!
//! Scores the candidate's side of a finished transcript on three
//! dimensions and combines them into a weighted total:
//! - Persuasion (30%): confident language, no hedging, detailed answers
//! - Technical Fit (40%): technical vocabulary, role relevance, depth
//! - Communication (30%): structuring phrases, sentence variety
//!
//! All averages and the variance check are evaluated with exact integer
//! arithmetic, so the same transcript and tables always yield the same
//! evaluation.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ScoringConfig;
use crate::domain::{Evaluation, EvaluationFeedback, Phase, Session, TranscriptEntry};

static SENTENCE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("SENTENCE_SPLIT_RE regex should compile"));

const BASE_SCORE: i64 = 50;
const CONFIDENCE_BONUS: i64 = 5;
const HEDGE_PENALTY: i64 = 3;
const TECHNICAL_KEYWORD_BONUS: i64 = 4;
const ROLE_BONUS: i64 = 10;
const SHALLOW_TECHNICAL_PENALTY: i64 = 15;
const STRUCTURE_BONUS: i64 = 4;
const VARIETY_BONUS: i64 = 10;
const WEAK_LANGUAGE_PENALTY: i64 = 2;

/// Mean words per response above which persuasion gets the large bonus.
const DETAILED_RESPONSE_WORDS: usize = 50;
/// Mean words per response above which persuasion gets the small bonus.
const ADEQUATE_RESPONSE_WORDS: usize = 30;
/// Technical-phase answers shorter than this on average are penalised.
const SHALLOW_TECHNICAL_WORDS: usize = 20;
/// Sentence-length variance above which communication gets a bonus.
const VARIETY_VARIANCE: i128 = 50;

/// Lowest sub-score that does not get called out as an improvement area.
const IMPROVEMENT_THRESHOLD: u32 = 70;

/// Pure transcript scorer over configurable phrase tables.
#[derive(Debug, Clone)]
pub struct Scorer {
    tables: ScoringConfig,
}

impl Scorer {
    /// Create a scorer. Table entries are matched case-insensitively.
    pub fn new(config: ScoringConfig) -> Self {
        let lower = |items: Vec<String>| -> Vec<String> {
            items.into_iter().map(|s| s.to_lowercase()).collect()
        };

        Self {
            tables: ScoringConfig {
                passing_score: config.passing_score,
                confidence_phrases: lower(config.confidence_phrases),
                weak_indicators: lower(config.weak_indicators),
                technical_keywords: lower(config.technical_keywords),
                structure_phrases: lower(config.structure_phrases),
                engineer_terms: lower(config.engineer_terms),
                manager_terms: lower(config.manager_terms),
            },
        }
    }

    /// Evaluate the candidate's responses in `session`.
    pub fn evaluate(&self, session: &Session) -> Evaluation {
        let responses: Vec<&TranscriptEntry> = session.candidate_entries().collect();
        if responses.is_empty() {
            return Evaluation::empty();
        }

        let text = responses
            .iter()
            .map(|r| r.text.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        let feedback = EvaluationFeedback {
            persuasion: self.score_persuasion(&text, responses.len()),
            technical_fit: self.score_technical_fit(&text, &session.target_role, &responses),
            communication: self.score_communication(&text),
        };

        let score = weighted_total(&feedback);
        let passed = score >= self.tables.passing_score;
        let summary = self.summary(&feedback, passed);

        tracing::info!(
            session_id = %session.id,
            score,
            passed,
            persuasion = feedback.persuasion,
            technical_fit = feedback.technical_fit,
            communication = feedback.communication,
            "Evaluation complete"
        );

        Evaluation {
            score,
            passed,
            feedback,
            summary,
        }
    }

    fn score_persuasion(&self, text: &str, response_count: usize) -> u32 {
        let word_count = text.split_whitespace().count();
        if word_count == 0 {
            return 0;
        }

        let mut score = BASE_SCORE;

        score += CONFIDENCE_BONUS * present_count(text, &self.tables.confidence_phrases);

        // Every occurrence counts here, unlike the presence check in communication.
        let hedges: usize = self
            .tables
            .weak_indicators
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| text.matches(w.as_str()).count())
            .sum();
        score -= HEDGE_PENALTY * hedges as i64;

        // mean > N  <=>  total > N * count
        if word_count > DETAILED_RESPONSE_WORDS * response_count {
            score += 10;
        } else if word_count > ADEQUATE_RESPONSE_WORDS * response_count {
            score += 5;
        }

        clamp(score)
    }

    fn score_technical_fit(
        &self,
        text: &str,
        target_role: &str,
        responses: &[&TranscriptEntry],
    ) -> u32 {
        let mut score = BASE_SCORE;

        score += TECHNICAL_KEYWORD_BONUS * present_count(text, &self.tables.technical_keywords);

        let role = target_role.to_lowercase();
        if role.contains("engineer") && present_count(text, &self.tables.engineer_terms) > 0 {
            score += ROLE_BONUS;
        }
        if role.contains("manager") && present_count(text, &self.tables.manager_terms) > 0 {
            score += ROLE_BONUS;
        }

        let technical: Vec<&&TranscriptEntry> = responses
            .iter()
            .filter(|r| r.phase == Phase::Technical)
            .collect();
        if !technical.is_empty() {
            let words: usize = technical.iter().map(|r| r.word_count()).sum();
            if words < SHALLOW_TECHNICAL_WORDS * technical.len() {
                score -= SHALLOW_TECHNICAL_PENALTY;
            }
        }

        clamp(score)
    }

    fn score_communication(&self, text: &str) -> u32 {
        let mut score = BASE_SCORE;

        score += STRUCTURE_BONUS * present_count(text, &self.tables.structure_phrases);

        let lengths: Vec<i128> = SENTENCE_SPLIT_RE
            .split(text)
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.split_whitespace().count() as i128)
            .collect();
        if sentence_variance_exceeds(&lengths, VARIETY_VARIANCE) {
            score += VARIETY_BONUS;
        }

        score -= WEAK_LANGUAGE_PENALTY * present_count(text, &self.tables.weak_indicators);

        clamp(score)
    }

    fn summary(&self, feedback: &EvaluationFeedback, passed: bool) -> String {
        let mut parts = Vec::with_capacity(3);

        if passed {
            parts.push("Congratulations! You've passed the interview.".to_string());
        } else {
            parts.push(format!(
                "Unfortunately, you did not meet the passing threshold of {}.",
                self.tables.passing_score
            ));
        }

        let dimensions = [
            ("persuasion", feedback.persuasion),
            ("technical knowledge", feedback.technical_fit),
            ("communication", feedback.communication),
        ];

        // Ties resolve to the earliest dimension.
        let mut strongest = dimensions[0];
        let mut weakest = dimensions[0];
        for dimension in &dimensions[1..] {
            if dimension.1 > strongest.1 {
                strongest = *dimension;
            }
            if dimension.1 < weakest.1 {
                weakest = *dimension;
            }
        }

        parts.push(format!(
            "Your strongest area was {} ({}/100).",
            strongest.0, strongest.1
        ));
        if weakest.1 < IMPROVEMENT_THRESHOLD {
            parts.push(format!(
                "Consider improving your {} skills ({}/100).",
                weakest.0, weakest.1
            ));
        }

        parts.join(" ")
    }
}

/// `floor(0.3 * persuasion + 0.4 * technical_fit + 0.3 * communication)`.
fn weighted_total(feedback: &EvaluationFeedback) -> u32 {
    (3 * feedback.persuasion + 4 * feedback.technical_fit + 3 * feedback.communication) / 10
}

/// Number of distinct table entries that occur in `text`.
fn present_count(text: &str, phrases: &[String]) -> i64 {
    phrases
        .iter()
        .filter(|p| !p.is_empty() && text.contains(p.as_str()))
        .count() as i64
}

/// Population variance of `lengths` compared against `threshold`.
///
/// With n samples summing to s, variance > t  <=>  sum((n*x - s)^2) > t * n^3.
fn sentence_variance_exceeds(lengths: &[i128], threshold: i128) -> bool {
    if lengths.is_empty() {
        return false;
    }
    let n = lengths.len() as i128;
    let sum: i128 = lengths.iter().sum();
    let scaled: i128 = lengths.iter().map(|x| (n * x - sum).pow(2)).sum();
    scaled > threshold * n * n * n
}

fn clamp(score: i64) -> u32 {
    score.clamp(0, 100) as u32
}
