#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! gitagent - chunked LLM review of GitHub repositories
//!
//! The crate walks a repository through the GitHub contents API, fetches the
//! eligible files concurrently, splits them into small ordered chunks and asks
//! a language model to review each chunk before merging the reviews into one
//! report.
//!
//! ## Usage
//! ```rust,ignore
//! use gitagent::{analyze_repository, AnalysisOutcome};
//!
//! async fn example() -> gitagent::Result<()> {
//!     match analyze_repository("https://github.com/rust-lang/log", None).await? {
//!         AnalysisOutcome::Report(report) => println!("{}", report),
//!         other => eprintln!("{}", other),
//!     }
//!     Ok(())
//! }
//! ```

/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// Logging configuration and utilities
pub mod logging;
/// GitHub locator, contents client and shared repository types
pub mod github;
/// Depth-first repository tree walk
pub mod walker;
/// Bounded concurrent content retrieval
pub mod parallel;
/// Ordered partitioning of retrieved files
pub mod chunking;
/// Prompt templates for chunk review and consolidation
pub mod prompts;
/// Language model backends
pub mod llm;
/// The end-to-end analysis pipeline
pub mod analyzer;
/// In-memory store of analysis results
pub mod cache;
/// Webhook signature checks and push-event handling
pub mod webhook;
/// HTML rendering for the web front end
pub mod render;
/// HTTP routes for the web front end and webhook receiver
pub mod api;

// Re-export common types
pub use analyzer::{analyze_repository, analyze_repository_with_config, AnalysisOutcome, Analyzer};
pub use cache::{AnalysisRecord, ResultStore};
pub use config::Config;
pub use error::{AnalysisError, Result};
pub use github::{FileContentMap, RepositoryRef};
pub use llm::LanguageModel;
