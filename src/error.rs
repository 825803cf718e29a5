//! Error handling for the solgen application.
//! Defines the crate-wide error type and result alias.

use thiserror::Error;

/// Errors that can occur while generating a solution from a template.
///
/// Token and modifier failures abort the whole generation run; I/O failures
/// are propagated unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// A token prefix was found without a closing `]]` marker.
    ///
    /// `position` is the byte offset of the prefix in the text handed to the
    /// engine, before any token of that text was replaced.
    #[error("Can't find end of key '{key}' at position '{position}'.")]
    UnterminatedToken { key: String, position: usize },

    /// A token used a modifier outside the recognized set.
    #[error("Modifier '{modifier}' is not supported.")]
    UnsupportedModifier { modifier: String },

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// Represents errors that occur while walking the template directory
    #[error("Template walk error: {0}.")]
    WalkDirError(#[from] walkdir::Error),

    /// Represents errors in the context file or command line overrides
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents errors in processing .solgenignore files
    #[error("Ignore file error: {0}.")]
    IgnoreError(String),

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    #[error("Template directory does not exist: {template_dir}.")]
    TemplateDoesNotExistError { template_dir: String },

    #[error("Output directory already exists: {output_dir}. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    /// The resource source has no resource with the requested name.
    #[error("Resource not found: {relative_name}.")]
    ResourceNotFoundError { relative_name: String },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
