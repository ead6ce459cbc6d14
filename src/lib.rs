//! # Paradox Machine
//!
//! Runs a fixed four-stage reasoning pipeline against an OpenAI-compatible
//! chat-completion endpoint to surface logical paradoxes in a statement.
//!
//! ## Stages
//!
//! - **S1 Knowledge Retrieval**: domain mechanisms and trade-offs the model knows
//! - **Phase I Premise Extraction**: goal, variables, hidden assumptions, reality gaps
//! - **Phase II Branch Expansion**: distinct outcomes and their impact on the goal
//! - **Phase III Contradiction Diagnosis**: Antinomy, Falsidical, Veridical or None
//!
//! ## Architecture
//!
//! ```text
//! CLI → ParadoxDetector → ChatClient (HTTP) → JSON extractor
//!                 ↓
//!        Report (normalized + raw phases) → text formatter
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use paradox_machine::config::ConfigLoader;
//! use paradox_machine::pipeline::{format_report, ParadoxDetector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::from_env().load(Some("deepseek-chat"))?;
//!     let detector = ParadoxDetector::from_config(config, "English")?;
//!     let report = detector.analyze("We will cut costs by hiring more staff.").await?;
//!     println!("{}", format_report(&report));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line commands.
pub mod cli;
/// Model and logging configuration.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Chat-completion client and wire types.
pub mod llm;
/// The paradox detection pipeline and report types.
pub mod pipeline;
/// Prompt templates for the pipeline stages.
pub mod prompts;

pub use config::{ConfigLoader, ModelConfig};
pub use error::{ApiError, AppError, AppResult, ParseError};
pub use pipeline::{format_report, ParadoxDetector, Report};
