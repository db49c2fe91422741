use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The payload could not be opened or read as a PDF
    #[error("Failed to decode '{filename}': {reason}")]
    Decode { filename: String, reason: String },
}

impl ExtractError {
    pub fn decode(filename: &str, reason: impl Into<String>) -> Self {
        ExtractError::Decode {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the upload that failed
    pub fn filename(&self) -> &str {
        match self {
            ExtractError::Decode { filename, .. } => filename,
        }
    }
}
