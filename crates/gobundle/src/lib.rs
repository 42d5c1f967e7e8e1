//! Merge the source files of one Go package into a single compilable file.
//!
//! The binary in `main.rs` is a thin layer over [`orchestrator::BundleOrchestrator`].

pub mod code_generator;
pub mod config;
pub mod dirs;
pub mod error;
pub mod extractor;
pub mod import_aggregator;
pub mod orchestrator;
pub mod parser;
pub mod printer;
pub mod resolver;
pub mod types;

pub use config::Config;
pub use error::{BundleError, ErrorCategory};
pub use orchestrator::{Bundle, BundleOrchestrator};
