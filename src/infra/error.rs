//! Error types and result definitions for the VBA signing pipeline.

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Comprehensive error types for signing operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SigningError {
    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Dir stream error: {0}")]
    DirStream(String),

    #[error("PROJECT stream error: {0}")]
    ProjectStream(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Cryptographic error: {0}")]
    Cryptographic(String),

    #[error("Internal inconsistency: {0}")]
    Internal(String),

    #[error("Signature file error: {0}")]
    SignatureFile(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("ZIP error: {0}")]
    Zip(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SigningError {
    fn from(error: std::io::Error) -> Self {
        SigningError::Io(error.to_string())
    }
}

impl From<openssl::error::ErrorStack> for SigningError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        SigningError::Cryptographic(error.to_string())
    }
}

impl From<zip::result::ZipError> for SigningError {
    fn from(error: zip::result::ZipError) -> Self {
        SigningError::Zip(error.to_string())
    }
}

impl From<quick_xml::DeError> for SigningError {
    fn from(error: quick_xml::DeError) -> Self {
        SigningError::Xml(error.to_string())
    }
}
