//! Error types for the commonforms Lambda handler

use thiserror::Error;

/// Result type alias for the commonforms Lambda handler
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers that omit the PDF payload
pub const MISSING_INPUT_MESSAGE: &str = "pdf_base64 is required in event";

/// Error types for the commonforms Lambda handler
#[derive(Error, Debug)]
pub enum Error {
    /// `pdf_base64` absent, null or empty
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,

    /// Event is not an object or an option has the wrong type
    #[error("Invalid event: {reason}")]
    InvalidEvent { reason: String },

    /// Base64 decode error
    #[error("Invalid base64 data: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scratch directory could not be created
    #[error("Failed to create work directory: {source}")]
    WorkDir {
        #[source]
        source: std::io::Error,
    },

    /// The conversion routine reported a failure
    #[error("{reason}")]
    Conversion { reason: String },
}

impl Error {
    /// HTTP-style status code reported in the response envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingInput => 400,
            _ => 500,
        }
    }

    /// Message placed in the response body.
    /// Caller errors get a fixed string; internal errors carry the error's
    /// display text only, never the debug representation or source chain.
    pub fn client_message(&self) -> String {
        match self {
            Error::MissingInput => MISSING_INPUT_MESSAGE.to_string(),
            other => format!("Conversion failed: {}", other),
        }
    }
}
