//! Personality catalog.
//!
//! Holds the interviewer personas available to sessions. Three personas are
//! built in; more can be loaded from a directory of JSON files on startup or
//! registered at runtime.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{Personality, DEFAULT_PERSONALITY_ID};
use crate::error::{InterviewError, InterviewResult};

/// Thread-safe registry of interviewer personas.
pub struct PersonalityCatalog {
    personalities: RwLock<BTreeMap<String, Personality>>,
}

impl PersonalityCatalog {
    /// Create a catalog containing the built-in personas.
    pub fn new() -> Self {
        let personalities: BTreeMap<String, Personality> = builtin_personalities()
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        tracing::info!(count = personalities.len(), "Loaded built-in personalities");

        Self {
            personalities: RwLock::new(personalities),
        }
    }

    /// Look up a persona, falling back to the default for unknown ids.
    pub fn resolve(&self, id: &str) -> Personality {
        let personalities = self.read();
        if let Some(personality) = personalities.get(id) {
            return personality.clone();
        }

        tracing::warn!(personality_id = %id, "Personality not found, using default");
        personalities
            .get(DEFAULT_PERSONALITY_ID)
            .cloned()
            .unwrap_or_else(default_personality)
    }

    /// Exact lookup.
    pub fn get(&self, id: &str) -> Option<Personality> {
        self.read().get(id).cloned()
    }

    /// All personas ordered by id.
    pub fn list(&self) -> Vec<Personality> {
        self.read().values().cloned().collect()
    }

    /// Add a persona. Ids are unique; re-registering an id is a conflict.
    pub fn register(&self, personality: Personality) -> InterviewResult<()> {
        personality.validate().map_err(InterviewError::BadRequest)?;

        let mut personalities = self.write();
        if personalities.contains_key(&personality.id) {
            return Err(InterviewError::Conflict(format!(
                "Personality '{}' already exists",
                personality.id
            )));
        }

        tracing::info!(personality_id = %personality.id, "Registered personality");
        personalities.insert(personality.id.clone(), personality);
        Ok(())
    }

    /// Load every `*.json` file in `dir`.
    ///
    /// Files in the directory replace built-ins with the same id. Unreadable
    /// or invalid files are logged and skipped. Returns the number loaded.
    pub fn load_directory(&self, dir: &Path) -> InterviewResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            InterviewError::Config(format!(
                "Cannot read personality directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match load_file(&path) {
                Ok(personality) => {
                    tracing::info!(
                        personality_id = %personality.id,
                        path = %path.display(),
                        "Loaded custom personality"
                    );
                    self.write().insert(personality.id.clone(), personality);
                    loaded += 1;
                }
                Err(reason) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %reason,
                        "Failed to load personality"
                    );
                }
            }
        }

        Ok(loaded)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Personality>> {
        self.personalities
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Personality>> {
        self.personalities
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PersonalityCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file(path: &Path) -> Result<Personality, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let personality: Personality = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    personality.validate()?;
    Ok(personality)
}

fn default_personality() -> Personality {
    Personality::new(
        DEFAULT_PERSONALITY_ID,
        "Sarah",
        "You are Sarah, a Senior Engineering Manager with 12 years of experience \
         in tech. You've conducted hundreds of interviews and are known for putting \
         candidates at ease while still maintaining high standards.",
        "You ask clear, direct questions and give candidates time to think. \
         You're encouraging but honest, and you probe deeper when answers are vague.",
    )
    .with_description("A friendly and professional technical interviewer")
    .with_company_values(&["innovation", "collaboration", "excellence", "integrity"])
}

fn builtin_personalities() -> Vec<Personality> {
    let strict = Personality::new(
        "strict",
        "Michael",
        "You are Michael, a Principal Engineer with 15 years of experience. \
         You're known for your rigorous technical assessments and high expectations.",
        "You ask challenging technical questions and expect precise answers. \
         You don't accept vague responses and will push for specifics.",
    )
    .with_description("A demanding and thorough technical interviewer")
    .with_company_values(&["technical excellence", "precision", "accountability"]);

    let friendly = Personality::new(
        "friendly",
        "Emma",
        "You are Emma, a People Operations Lead with a background in psychology. \
         You specialize in assessing culture fit and soft skills.",
        "You create a comfortable atmosphere and focus on understanding \
         the whole person. You use behavioral questions and listen actively.",
    )
    .with_description("A warm and encouraging interviewer focused on culture fit")
    .with_company_values(&["empathy", "growth mindset", "teamwork", "authenticity"]);

    vec![default_personality(), strict, friendly]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_present() {
        let catalog = PersonalityCatalog::new();
        let ids: Vec<String> = catalog.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["default", "friendly", "strict"]);
        assert_eq!(catalog.get("strict").unwrap().name, "Michael");
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_default() {
        let catalog = PersonalityCatalog::new();
        let personality = catalog.resolve("does-not-exist");
        assert_eq!(personality.id, DEFAULT_PERSONALITY_ID);
        assert_eq!(personality.name, "Sarah");
        assert!(catalog.get("does-not-exist").is_none());
    }

    #[test]
    fn test_register_and_conflict() {
        let catalog = PersonalityCatalog::new();
        let custom = Personality::new("calm", "Noor", "A quiet staff engineer.", "Patient.");
        catalog.register(custom.clone()).unwrap();
        assert_eq!(catalog.resolve("calm").name, "Noor");

        let err = catalog.register(custom).unwrap_err();
        assert!(matches!(err, InterviewError::Conflict(_)));

        let err = catalog
            .register(Personality::new("friendly", "Other", "bg", "style"))
            .unwrap_err();
        assert!(matches!(err, InterviewError::Conflict(_)));
    }

    #[test]
    fn test_register_rejects_invalid() {
        let catalog = PersonalityCatalog::new();
        let err = catalog
            .register(Personality::new("", "Nameless", "bg", "style"))
            .unwrap_err();
        assert!(matches!(err, InterviewError::BadRequest(_)));
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("calm.json"),
            r#"{"id": "calm", "name": "Noor", "description": "Quiet and patient"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = PersonalityCatalog::new();
        let loaded = catalog.load_directory(dir.path()).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(catalog.get("calm").unwrap().description, "Quiet and patient");
        assert_eq!(catalog.list().len(), 4);
    }

    #[test]
    fn test_load_directory_missing_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = PersonalityCatalog::new();
        let err = catalog
            .load_directory(&dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, InterviewError::Config(_)));
    }

    #[test]
    fn test_shipped_personalities_load() {
        let catalog = PersonalityCatalog::new();
        let loaded = catalog
            .load_directory(Path::new("config/personalities"))
            .unwrap();
        assert_eq!(loaded, 1);
        let mentor = catalog.get("mentor").unwrap();
        assert_eq!(mentor.name, "Priya");
        assert_eq!(mentor.behavior.max_follow_up_questions, 3);
    }
}
