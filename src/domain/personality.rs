//! Interviewer personality types.
//!
//! A personality is a swappable persona: it changes how the interviewer
//! speaks, never how the interview is run or scored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Voice and communication tone, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ToneParameters {
    /// 0 = casual, 1 = formal.
    pub formality: f64,
    /// 0 = cold, 1 = warm.
    pub warmth: f64,
    /// 0 = indirect, 1 = direct.
    pub directness: f64,
    /// 0 = slow, 1 = fast.
    pub pace: f64,
}

impl Default for ToneParameters {
    fn default() -> Self {
        Self {
            formality: 0.7,
            warmth: 0.6,
            directness: 0.7,
            pace: 0.5,
        }
    }
}

/// Behavioral rules for the persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BehaviorRules {
    pub max_follow_up_questions: u8,
    pub allow_hints: bool,
    pub challenge_weak_answers: bool,
    pub praise_strong_answers: bool,
}

impl Default for BehaviorRules {
    fn default() -> Self {
        Self {
            max_follow_up_questions: 2,
            allow_hints: true,
            challenge_weak_answers: true,
            praise_strong_answers: true,
        }
    }
}

/// Per-phase directives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PhasePrompts {
    pub greeting: String,
    pub technical_intro: String,
    pub evaluation_intro: String,
}

impl Default for PhasePrompts {
    fn default() -> Self {
        Self {
            greeting: "Warmly greet the candidate and introduce yourself.".to_string(),
            technical_intro: "Transition to technical questions with a brief explanation."
                .to_string(),
            evaluation_intro: "Thank the candidate and explain you'll now evaluate.".to_string(),
        }
    }
}

/// An interviewer persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Personality {
    /// Unique identifier.
    pub id: String,

    /// Display name the interviewer introduces themselves with.
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_background")]
    pub persona_background: String,

    #[serde(default = "default_style")]
    pub interviewing_style: String,

    #[serde(default)]
    pub tone: ToneParameters,

    #[serde(default)]
    pub behavior: BehaviorRules,

    #[serde(default)]
    pub phase_prompts: PhasePrompts,

    #[serde(default)]
    pub company_values: Vec<String>,
}

fn default_background() -> String {
    "You are an experienced technical interviewer with 10+ years in the industry.".to_string()
}

fn default_style() -> String {
    "You ask thoughtful questions and listen actively to responses.".to_string()
}

impl Personality {
    /// Create a persona with default tone, behavior and prompts.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        persona_background: impl Into<String>,
        interviewing_style: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            persona_background: persona_background.into(),
            interviewing_style: interviewing_style.into(),
            tone: ToneParameters::default(),
            behavior: BehaviorRules::default(),
            phase_prompts: PhasePrompts::default(),
            company_values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_company_values(mut self, values: &[&str]) -> Self {
        self.company_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Check field bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() || self.id.chars().count() > 50 {
            return Err("Personality id must be between 1 and 50 characters".to_string());
        }
        if self.name.trim().is_empty() || self.name.chars().count() > 100 {
            return Err("Personality name must be between 1 and 100 characters".to_string());
        }
        if self.description.chars().count() > 500 {
            return Err("Personality description must be at most 500 characters".to_string());
        }
        let tone = [
            ("formality", self.tone.formality),
            ("warmth", self.tone.warmth),
            ("directness", self.tone.directness),
            ("pace", self.tone.pace),
        ];
        for (name, value) in tone {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("Tone parameter '{}' must be within [0, 1]", name));
            }
        }
        if self.behavior.max_follow_up_questions > 5 {
            return Err("max_follow_up_questions must be at most 5".to_string());
        }
        Ok(())
    }

    /// Render the persona as an LLM system prompt.
    pub fn system_prompt(&self) -> String {
        let values = if self.company_values.is_empty() {
            "excellence".to_string()
        } else {
            self.company_values.join(", ")
        };

        format!(
            "You are an interviewer named {name}.\n\n\
             Background: {background}\n\n\
             Style: {style}\n\n\
             Tone Guidelines:\n\
             - Formality level: {formality:.0}%\n\
             - Warmth level: {warmth:.0}%\n\
             - Directness level: {directness:.0}%\n\n\
             Company Values: {values}\n\n\
             Behavioral Rules:\n\
             - Maximum follow-up questions per topic: {follow_ups}\n\
             - Provide hints when candidate struggles: {hints}\n\
             - Challenge weak or incomplete answers: {challenge}\n\
             - Acknowledge strong answers: {praise}\n\n\
             Remember to maintain this persona consistently throughout the interview.",
            name = self.name,
            background = self.persona_background,
            style = self.interviewing_style,
            formality = self.tone.formality * 100.0,
            warmth = self.tone.warmth * 100.0,
            directness = self.tone.directness * 100.0,
            values = values,
            follow_ups = self.behavior.max_follow_up_questions,
            hints = self.behavior.allow_hints,
            challenge = self.behavior.challenge_weak_answers,
            praise = self.behavior.praise_strong_answers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let personality: Personality = serde_json::from_str(
            r#"{"id": "calm", "name": "Noor", "company_values": ["clarity"]}"#,
        )
        .unwrap();
        assert_eq!(personality.tone, ToneParameters::default());
        assert_eq!(personality.behavior.max_follow_up_questions, 2);
        assert!(personality.phase_prompts.greeting.contains("greet"));
        assert!(personality.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_tone() {
        let mut personality = Personality::new("p", "Pat", "bg", "style");
        personality.tone.warmth = 1.5;
        let err = personality.validate().unwrap_err();
        assert!(err.contains("warmth"));
    }

    #[test]
    fn test_system_prompt_mentions_persona() {
        let personality = Personality::new("p", "Pat", "A staff engineer.", "Direct.")
            .with_company_values(&["ownership", "craft"]);
        let prompt = personality.system_prompt();
        assert!(prompt.contains("named Pat"));
        assert!(prompt.contains("A staff engineer."));
        assert!(prompt.contains("ownership, craft"));
        assert!(prompt.contains("Formality level: 70%"));
    }
}
