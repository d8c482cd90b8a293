//! Interview engine for Interview Core.
//!
//! This module contains the conversation pipeline:
//! - Content Guard: sanitizes text crossing the trust boundary
//! - Scorer: deterministic evaluation of a finished transcript
//! - Responder: interviewer replies (templates or an LLM)
//! - Session State Machine: phase rules and the message pipeline
//! - Session Registry: concurrent session lookup
//! - Interview Coordinator: validated, id-keyed entry point

mod coordinator;
mod guard;
mod machine;
mod personality;
mod registry;
mod responder;
mod scorer;

pub use coordinator::*;
pub use guard::*;
pub use machine::*;
pub use personality::*;
pub use responder::*;
pub use scorer::*;
