//! # Error Handling
//!
//! Error types shared by all Retort components.
//!
//! ## Design Principles
//!
//! 1. **Actionable**: every error carries the context needed to fix it
//!    (the offending path, the observed value type)
//! 2. **Loud where it matters**: archival integrity problems are fatal,
//!    never silently dropped
//! 3. **Recoverable where it doesn't**: shape mismatches on write are
//!    self-healed by the store and never surface here; missing paths on
//!    read yield the caller's default

use thiserror::Error;

/// Result type alias for Retort operations
pub type Result<T> = std::result::Result<T, Error>;

/// Primary error type for Retort
#[derive(Error, Debug)]
pub enum Error {
    // Flattening errors
    #[error("invalid identifier at '{path}': {message}")]
    Identifier { path: String, message: String },

    #[error("duplicate identifier '{identifier}' produces colliding path '{path}'")]
    DuplicateIdentifier { path: String, identifier: String },

    // Encoding errors
    #[error("cannot encode {type_name} at '{path}': {message}")]
    Encoding {
        path: String,
        type_name: &'static str,
        message: String,
    },

    // Container errors
    #[error("container error: {message}")]
    Container { message: String },

    // System errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Identifier { .. } => false,
            Error::DuplicateIdentifier { .. } => false,
            Error::Encoding { .. } => false,
            Error::Container { .. } => false,
            Error::Io { .. } => false,
            Error::Configuration { .. } => true,
            Error::Internal { .. } => false,
        }
    }

    /// Get error code for monitoring
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Identifier { .. } => "IDENTIFIER_ERROR",
            Error::DuplicateIdentifier { .. } => "DUPLICATE_IDENTIFIER",
            Error::Encoding { .. } => "ENCODING_ERROR",
            Error::Container { .. } => "CONTAINER_ERROR",
            Error::Io { .. } => "IO_ERROR",
            Error::Configuration { .. } => "CONFIG_ERROR",
            Error::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Extension trait for adding context to results
pub trait ResultExt<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Internal {
            message: format!("{}: {}", f(), e),
        })
    }
}
