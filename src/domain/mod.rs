//! Domain types for Interview Core.
//!
//! This module contains the session aggregate and its value objects.

mod evaluation;
mod personality;
mod phase;
mod session;
mod transcript;

pub use evaluation::*;
pub use personality::*;
pub use phase::*;
pub use session::*;
pub use transcript::*;
