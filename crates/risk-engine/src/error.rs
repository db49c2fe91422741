//! Error types for template generation and rendering

use thiserror::Error;

/// Failure to reach the completion service at all.
///
/// A reply that arrives but lacks the expected shape is not an error; it is
/// turned into literal error text in place of the template.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion API key is not configured")]
    MissingApiKey,

    #[error("Completion request timed out after {0}ms")]
    Timeout(u64),

    #[error("Completion request failed: {0}")]
    Http(String),
}

/// Why a template could not be read as CSV
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateParseError {
    #[error("No header row found in template")]
    MissingHeader,

    #[error("{0}")]
    Csv(String),
}

impl From<csv::Error> for TemplateParseError {
    fn from(err: csv::Error) -> Self {
        TemplateParseError::Csv(err.to_string())
    }
}
