//! Children's bedtime-story assistant built on a small state-machine graph.
//!
//! This crate provides:
//! - A generic graph engine with typed node ids, conditional edges and cycles
//! - The story graph: intent classification, specification building, story
//!   generation and an appropriateness judge with a revision loop
//! - `StorySession`, a driver carrying history and story state across turns
//! - Scripted test utilities
//!
//! # Quick Start
//!
//! ```ignore
//! use storyteller_core::{StoryConfig, StorySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryConfig::from_env()?;
//!     let mut session = StorySession::from_env(&config)?;
//!
//!     let reply = session.send("Tell me a story about a brave mouse").await?;
//!     println!("{}", reply.text());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod debug;
pub mod graph;
pub mod intent;
pub mod llm;
pub mod nodes;
pub mod prompts;
pub mod routing;
pub mod session;
pub mod specification;
pub mod state;
pub mod story_graph;
pub mod testing;

// Primary public API
pub use config::{ConfigError, StoryConfig};
pub use intent::Intent;
pub use llm::{GenerationError, TextGenerator};
pub use session::{SessionError, StorySession, TurnReply};
pub use specification::StorySpecification;
pub use state::{Carry, StoryState, Turn};
pub use story_graph::{build_story_graph, StoryGraph};
pub use testing::{ScriptedGenerator, TestHarness};
