//! solgen scaffolds a solution tree from a template whose file names and
//! contents contain `[[GROUP.PROPERTY|modifier]]` tokens.

/// Command-line interface module for the solgen application
pub mod cli;

/// Context file loading and command line overrides
/// Supports JSON and YAML formats
pub mod config;

/// Generation context: target directory and value providers
pub mod context;

/// Token substitution engine
pub mod engine;

/// Error types and handling for the solgen application
pub mod error;

/// Identifiers generated for `guid` modifiers
pub mod guid;

/// File ignore patterns
/// Processes .solgenignore files to exclude specific paths
pub mod ignore;

pub mod logger;

/// Core generation orchestration
/// Materializes template resources into the target directory
pub mod processor;

/// Template resources and their sources
pub mod resource;

/// Value providers and built-in template models
pub mod value;
