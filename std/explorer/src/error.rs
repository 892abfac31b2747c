//! Error type shared by the sandbox, resolver and operation handlers.

use thiserror::Error;

/// Failure modes of an explorer operation.
///
/// None of these cross the dispatch boundary: [`crate::dispatch::Dispatcher`]
/// renders each variant into a text result.
#[derive(Error, Debug)]
pub enum Error {
    /// The path resolves outside every allowed root, or could not be resolved.
    #[error("access denied: {0} is outside the allowed directories")]
    AccessDenied(String),
    /// The path passed the sandbox but nothing exists there.
    #[error("path does not exist: {0}")]
    NotFound(String),
    /// A directory was required.
    #[error("path is not a directory: {0}")]
    NotADirectory(String),
    /// A required argument is missing or has the wrong type.
    #[error("invalid arguments: {0}")]
    InvalidArgument(String),
    /// No operation is registered under this name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    /// The resource locator does not use the `file://` scheme.
    #[error("unsupported URI type: {0}")]
    UnsupportedUri(String),
    /// An I/O error occurred while reading a validated path.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// An unexpected fault inside a handler.
    #[error("internal fault: {0}")]
    Internal(String),
}
