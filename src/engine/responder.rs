//! Responder - produces interviewer utterances.
//!
//! The state machine calls a [`Responder`] from the Greeting and Technical
//! handlers. Two implementations are provided:
//! - [`TemplateResponder`]: deterministic keyword-driven replies, no I/O
//! - [`LlmResponder`]: OpenAI-compatible chat completions over HTTP
//!
//! Implementations report failures as [`ResponderError`]; the state machine
//! owns the fallback text so every responder degrades the same way.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ResponderConfig;
use crate::domain::{Personality, Phase, Session, Speaker};

/// Number of most recent transcript entries sent as chat history.
const HISTORY_WINDOW: usize = 10;

/// Failure to produce an interviewer reply.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("responder request timed out")]
    Timeout,

    #[error("responder transport error: {0}")]
    Transport(String),

    #[error("responder API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("responder returned a malformed reply: {0}")]
    Malformed(String),

    #[error("responder returned an empty reply")]
    EmptyReply,

    #[error("responder is not configured: {0}")]
    NotConfigured(String),
}

impl ResponderError {
    /// Whether the same request may succeed if tried again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ResponderError::Timeout | ResponderError::Transport(_) => true,
            ResponderError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            ResponderError::Malformed(_)
            | ResponderError::EmptyReply
            | ResponderError::NotConfigured(_) => false,
        }
    }
}

impl From<reqwest::Error> for ResponderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ResponderError::Timeout
        } else if e.is_decode() {
            ResponderError::Malformed(e.to_string())
        } else {
            ResponderError::Transport(e.to_string())
        }
    }
}

/// Source of interviewer replies.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce the interviewer's reply to `latest`, the candidate's most
    /// recent (already filtered) message.
    async fn generate(
        &self,
        session: &Session,
        personality: &Personality,
        latest: &str,
    ) -> Result<String, ResponderError>;
}

/// Deterministic reply used when a responder fails.
pub fn fallback_response(phase: Phase) -> &'static str {
    match phase {
        Phase::Greeting => {
            "Thank you for that introduction. Let's move on to some technical questions."
        }
        Phase::Technical => {
            "That's an interesting perspective. Can you tell me more about your approach?"
        }
        _ => "Thank you for your time today.",
    }
}

// ============================================================================
// Template responder
// ============================================================================

/// Keyword-driven replies. Used when no LLM is configured.
#[derive(Debug, Clone, Default)]
pub struct TemplateResponder;

impl TemplateResponder {
    pub fn new() -> Self {
        Self
    }

    fn reply(personality: &Personality, latest: &str) -> String {
        let lower = latest.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |candidates: &[&str]| words.iter().any(|w| candidates.contains(w));

        if has_word(&["hello", "hi", "hey"]) {
            return format!("Great to meet you! {}", personality.phase_prompts.greeting);
        }
        if has_word(&["experience", "worked", "project"]) {
            return "That's interesting. Can you tell me more about the specific challenges you faced?"
                .to_string();
        }
        if has_word(&["team", "collaborate"]) || lower.contains("work with") {
            return "Collaboration is important. How do you handle disagreements with team members?"
                .to_string();
        }
        "Thank you for that response. Let's move to the next question.".to_string()
    }
}

#[async_trait]
impl Responder for TemplateResponder {
    async fn generate(
        &self,
        session: &Session,
        personality: &Personality,
        latest: &str,
    ) -> Result<String, ResponderError> {
        tracing::debug!(session_id = %session.id, "Generating template response");
        Ok(Self::reply(personality, latest))
    }
}

// ============================================================================
// LLM responder
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Responder backed by an OpenAI-compatible chat-completions endpoint.
pub struct LlmResponder {
    config: ResponderConfig,
    client: Client,
}

impl LlmResponder {
    pub fn new(config: ResponderConfig) -> Result<Self, ResponderError> {
        if config.api_key.trim().is_empty() {
            return Err(ResponderError::NotConfigured("api_key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResponderError::NotConfigured(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn system_prompt(session: &Session, personality: &Personality) -> String {
        let instructions = match session.phase() {
            Phase::Greeting => {
                "You are in the GREETING phase.\n\
                 - Warmly acknowledge the candidate's introduction\n\
                 - Show genuine interest in their background\n\
                 - Keep responses concise (2-3 sentences max)"
            }
            Phase::Technical => {
                "You are in the TECHNICAL phase.\n\
                 - Ask relevant technical questions for the role\n\
                 - Acknowledge the candidate's answer before the next question\n\
                 - Ask follow-up questions and probe deeper if answers are vague\n\
                 - Don't repeat the same question"
            }
            Phase::Evaluation => {
                "You are wrapping up the interview.\n\
                 - Thank the candidate for their time\n\
                 - Keep it brief and professional"
            }
            Phase::Idle | Phase::Completed => "",
        };

        let mut prompt = personality.system_prompt();
        prompt.push_str(&format!(
            "\n\nCURRENT PHASE: {phase}\n{instructions}\n\n\
             ROLE BEING INTERVIEWED FOR: {role}\n\
             CANDIDATE NAME: {name}\n",
            phase = session.phase(),
            instructions = instructions,
            role = session.target_role,
            name = session.candidate_name,
        ));
        if let Some(context) = &session.company_context {
            prompt.push_str(&format!("COMPANY CONTEXT: {}\n", context));
        }
        prompt.push_str(
            "\nIMPORTANT RULES:\n\
             - Keep responses SHORT (2-3 sentences max)\n\
             - Speak naturally, without bullet points or lists\n\
             - Never repeat the exact same question",
        );
        prompt
    }

    fn build_messages(session: &Session, personality: &Personality, latest: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: Self::system_prompt(session, personality),
        }];

        let transcript = session.transcript();
        let start = transcript.len().saturating_sub(HISTORY_WINDOW);
        for entry in &transcript[start..] {
            let role = match entry.speaker {
                Speaker::Interviewer => "assistant",
                Speaker::Candidate => "user",
            };
            messages.push(ChatMessage {
                role,
                content: entry.text.clone(),
            });
        }

        let already_sent = messages
            .last()
            .is_some_and(|m| m.role == "user" && m.content == latest);
        if !already_sent {
            messages.push(ChatMessage {
                role: "user",
                content: latest.to_string(),
            });
        }

        messages
    }
}

#[async_trait]
impl Responder for LlmResponder {
    async fn generate(
        &self,
        session: &Session,
        personality: &Personality,
        latest: &str,
    ) -> Result<String, ResponderError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: Self::build_messages(session, personality, latest),
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(
            session_id = %session.id,
            phase = %session.phase(),
            messages = request.messages.len(),
            "Requesting LLM response"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ResponderError::Api { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ResponderError::EmptyReply);
        }
        Ok(content)
    }
}
