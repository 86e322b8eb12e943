//! Campaign co-pilot: a scripted chat session attached to one campaign and
//! a character-by-character text reveal.
//!
//! All timing runs on tokio and is tied to a cancellation token owned by
//! the view, so closing a view stops every pending reply and animation.

pub mod session;
pub mod typewriter;

pub use session::{ChatMessage, CopilotView, Role, CANNED_REPLY, PRESET_PROMPTS};
pub use typewriter::{RevealFrame, RevealOutcome, Typewriter};
