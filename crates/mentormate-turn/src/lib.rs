//! The conversation turn pipeline for Mentormate.
//!
//! Composes the message store with the text-generation and speech-synthesis
//! adapters into a single server-side operation: persist the user's
//! utterance, obtain the mentor's reply, persist it, and synthesize audio.

pub mod error;
pub mod generation;
pub mod orchestrator;
pub mod synthesis;

pub use error::TurnError;
pub use generation::{
    GenerationClient, GenerationError, HttpGenerationClient, MockGenerationClient,
};
pub use orchestrator::{TurnOrchestrator, TurnReply, PERSONA_INSTRUCTION};
pub use synthesis::{HttpSynthesisClient, MockSynthesisClient, SynthesisClient, SynthesisError};
