//! Narration - LLM client, empire context, and the narrator port

pub mod client;
pub mod context;
pub mod narrator;

pub use client::LlmClient;
pub use context::EmpireContext;
pub use narrator::{narrate, LlmNarrator, Narration, NarrativeRequest, Narrator, SilentNarrator};
