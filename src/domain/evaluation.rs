//! Evaluation-related domain types.
//!
//! Represents the final score produced once an interview ends.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-dimension sub-scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EvaluationFeedback {
    /// Confidence and compelling arguments.
    pub persuasion: u32,
    /// Depth and relevance of technical answers.
    pub technical_fit: u32,
    /// Structure and articulation.
    pub communication: u32,
}

impl EvaluationFeedback {
    pub fn zero() -> Self {
        Self {
            persuasion: 0,
            technical_fit: 0,
            communication: 0,
        }
    }
}

/// Final interview evaluation. Produced once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Evaluation {
    /// Weighted total in `[0, 100]`.
    pub score: u32,

    /// Whether `score` reached the passing threshold.
    pub passed: bool,

    /// Sub-scores.
    pub feedback: EvaluationFeedback,

    /// Human-readable summary.
    pub summary: String,
}

impl Evaluation {
    /// Evaluation for a transcript without candidate input.
    pub fn empty() -> Self {
        Self {
            score: 0,
            passed: false,
            feedback: EvaluationFeedback::zero(),
            summary: "No candidate responses to evaluate.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_evaluation() {
        let evaluation = Evaluation::empty();
        assert_eq!(evaluation.score, 0);
        assert!(!evaluation.passed);
        assert_eq!(evaluation.feedback, EvaluationFeedback::zero());
        assert_eq!(evaluation.summary, "No candidate responses to evaluate.");
    }

    #[test]
    fn test_feedback_serialization() {
        let feedback = EvaluationFeedback {
            persuasion: 60,
            technical_fit: 74,
            communication: 58,
        };
        let json = serde_json::to_value(feedback).unwrap();
        assert_eq!(json["technical_fit"], 74);
    }
}
