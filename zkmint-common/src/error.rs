//! Error types for calldata transcoding and artwork extraction.

use thiserror::Error;

/// Errors raised while turning prover output into verifier call arguments.
#[derive(Debug, Error)]
pub enum CalldataError {
    /// The blob is not a sequence of well-formed JSON values.
    #[error("malformed calldata json: {0}")]
    Json(String),

    /// The top-level values do not match the expected verifier grammar.
    #[error("unexpected calldata shape: {0}")]
    Shape(String),

    /// A hex string could not be decoded.
    #[error("invalid hex in calldata: {0}")]
    Hex(String),

    /// A token that should have been an unsigned integer was not.
    #[error("invalid integer in calldata: {0}")]
    Integer(String),

    /// The verifier expects a fixed number of public inputs.
    #[error("signal count mismatch: verifier expects {expected}, calldata carries {actual}")]
    SignalCount { expected: usize, actual: usize },

    /// Calldata signals disagree with the public signals of the proof artifact.
    #[error("calldata signal {index} does not match proof artifact public signal")]
    SignalMismatch { index: usize },
}

impl CalldataError {
    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            CalldataError::Json(_) => "CALLDATA_JSON",
            CalldataError::Shape(_) => "CALLDATA_SHAPE",
            CalldataError::Hex(_) => "CALLDATA_HEX",
            CalldataError::Integer(_) => "CALLDATA_INTEGER",
            CalldataError::SignalCount { .. } => "SIGNAL_COUNT",
            CalldataError::SignalMismatch { .. } => "SIGNAL_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for CalldataError {
    fn from(err: serde_json::Error) -> Self {
        CalldataError::Json(err.to_string())
    }
}

impl From<hex::FromHexError> for CalldataError {
    fn from(err: hex::FromHexError) -> Self {
        CalldataError::Hex(err.to_string())
    }
}

/// Errors raised while decoding the contract-generated artwork.
#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("token metadata is not valid json: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("token metadata has no string `image` field")]
    MissingImage,

    #[error("unsupported image data uri: {0}")]
    UnsupportedImage(String),

    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image payload is not utf-8 text")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}
