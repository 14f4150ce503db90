//! Shared foundation for the Mentormate system.
//!
//! Defines the message data model, the top-level error taxonomy, and the
//! TOML configuration shared by the server and client crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::MentormateConfig;
pub use error::{MentorError, Result};
pub use types::{Message, Role};
