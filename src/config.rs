//! Configuration module for Interview Core.
//!
//! Loads configuration from YAML files and environment variables.
//! Every section has defaults, so the service boots without any file.

use std::path::PathBuf;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub guard: GuardConfig,
    pub scoring: ScoringConfig,
    pub responder: ResponderConfig,
    pub history: HistoryConfig,
    pub personalities: PersonalitiesConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Content guard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Also flag long messages that mention no interview topic.
    pub strict_mode: bool,
    /// Case-insensitive regexes whose matches are replaced with `[filtered]`.
    pub toxic_patterns: Vec<String>,
    /// Case-insensitive regexes marking a message as off-topic (advisory).
    pub off_topic_patterns: Vec<String>,
    /// Topic words used by strict mode.
    pub allowed_topics: Vec<String>,
    pub min_words: usize,
    pub max_words: usize,
    /// Reject candidate messages outside `[min_words, max_words]` at the boundary.
    pub enforce_length: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            toxic_patterns: strings(&[
                r"\b(hate|kill|die|attack|violent)\b",
                r"\b(stupid|idiot|dumb|loser)\b",
                r"\bfuck\b|\bshit\b|\bdamn\b|\bass\b",
            ]),
            off_topic_patterns: strings(&[
                r"\b(politics|religion|dating|gossip)\b",
                r"\b(what time is it|weather today|sports score)\b",
            ]),
            allowed_topics: strings(&[
                "experience",
                "skills",
                "project",
                "team",
                "challenge",
                "problem",
                "solution",
                "technology",
                "code",
                "design",
                "leadership",
                "communication",
                "goal",
                "achievement",
                "company",
                "role",
                "career",
                "learning",
                "growth",
            ]),
            min_words: 3,
            max_words: 500,
            enforce_length: false,
        }
    }
}

/// Scoring tables and threshold.
///
/// The phrase tables are placeholders for a richer assessment and are kept
/// here so scoring policy can change without touching the state machine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub passing_score: u32,
    /// +5 each when present.
    pub confidence_phrases: Vec<String>,
    /// Hedging language; penalised in persuasion and communication.
    pub weak_indicators: Vec<String>,
    /// +4 each when present.
    pub technical_keywords: Vec<String>,
    /// +4 each when present.
    pub structure_phrases: Vec<String>,
    /// Role bonus terms when the role mentions "engineer".
    pub engineer_terms: Vec<String>,
    /// Role bonus terms when the role mentions "manager".
    pub manager_terms: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            passing_score: 80,
            confidence_phrases: strings(&[
                "i achieved",
                "i led",
                "i delivered",
                "we succeeded",
                "resulted in",
            ]),
            weak_indicators: strings(&[
                "i don't know",
                "not sure",
                "maybe",
                "i guess",
                "um",
                "uh",
                "kind of",
                "sort of",
                "i think so",
            ]),
            technical_keywords: strings(&[
                "implemented",
                "designed",
                "architected",
                "optimized",
                "scaled",
                "tested",
                "deployed",
                "monitored",
                "debugged",
                "refactored",
                "algorithm",
                "data structure",
                "api",
                "database",
                "performance",
            ]),
            structure_phrases: strings(&[
                "for example",
                "specifically",
                "in particular",
                "as a result",
                "because",
                "therefore",
                "first",
                "second",
                "finally",
                "i believe",
                "in my experience",
                "we achieved",
            ]),
            engineer_terms: strings(&["code", "programming", "development"]),
            manager_terms: strings(&["team", "leadership", "project"]),
        }
    }
}

/// LLM responder configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Use the LLM; otherwise template replies are used.
    pub enabled: bool,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "anthropic/claude-sonnet-4".to_string(),
            timeout_secs: 15,
            max_tokens: 300,
        }
    }
}

/// Where exchanges are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBackend {
    Memory,
    Sqlite,
}

/// History store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    /// Used by the `sqlite` backend.
    pub database_url: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::Memory,
            database_url: "sqlite:interview.db?mode=rwc".to_string(),
        }
    }
}

/// Personality catalog configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonalitiesConfig {
    /// Directory of `*.json` persona files loaded on startup.
    pub directory: Option<PathBuf>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (INTERVIEW_*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml (if exists)
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            // Start with default config
            .add_source(File::with_name("config/default").required(false))
            // Layer on local overrides
            .add_source(File::with_name("config/local").required(false))
            // Layer on environment variables with INTERVIEW_ prefix
            .add_source(
                Environment::with_prefix("INTERVIEW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.passing_score, 80);
        assert_eq!(config.confidence_phrases.len(), 5);
        assert!(config.weak_indicators.contains(&"i don't know".to_string()));
        assert!(config.technical_keywords.contains(&"data structure".to_string()));
    }

    #[test]
    fn test_default_guard_config() {
        let config = GuardConfig::default();
        assert!(!config.strict_mode);
        assert_eq!(config.min_words, 3);
        assert_eq!(config.max_words, 500);
        assert!(!config.toxic_patterns.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let loaded: Config = ConfigLoader::builder()
            .add_source(config::File::from_str(
                "scoring:\n  passing_score: 70\nhistory:\n  backend: sqlite\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.scoring.passing_score, 70);
        assert_eq!(loaded.scoring.confidence_phrases.len(), 5);
        assert_eq!(loaded.history.backend, HistoryBackend::Sqlite);
        assert_eq!(loaded.server.port, 8000);
        assert!(!loaded.responder.enabled);
    }

    #[test]
    fn test_shipped_default_file_parses() {
        let loaded: Config = ConfigLoader::builder()
            .add_source(File::with_name("config/default"))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.server.port, 8000);
        assert_eq!(loaded.history.backend, HistoryBackend::Memory);
        assert_eq!(loaded.scoring.technical_keywords.len(), 15);
        assert!(loaded.personalities.directory.is_none());
    }
}
