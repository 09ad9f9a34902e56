//! Error types for the skypost client.
//!
//! Every operation on [`ApiClient`](crate::ApiClient) fails with one of the
//! variants of [`Error`]. Callers should match on the variant rather than on
//! the rendered message; transport details are carried only where a caller
//! may need them for diagnostics.

use thiserror::Error;

/// The unified error type for skypost operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport failure (DNS, connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The operation was cancelled through the client's cancellation token.
    #[error("operation cancelled")]
    Cancelled,

    /// The service rejected the login or refresh attempt.
    #[error("authentication failed (HTTP {status}){}", fmt_message(.message))]
    AuthenticationFailed {
        /// HTTP status code returned by the service.
        status: u16,
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// No session is stored; the call was rejected before any request was made.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The profile lookup returned a non-success status.
    #[error("profile fetch failed (HTTP {status})")]
    ProfileFetchFailed {
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// The post submission returned a non-success status.
    #[error("post failed (HTTP {status})")]
    PostFailed {
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// A response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Input rejected locally (empty text, malformed DID or URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The credential store could not be read or written.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Returns true for failures that may succeed when retried unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // Only the client's own deadline produces `Timeout`, with the
        // configured duration.
        if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

/// A response payload that could not be decoded into the expected shape.
#[derive(Debug, Error)]
#[error("{shape}: {details}")]
pub struct DecodeError {
    /// Name of the expected shape, e.g. `"profile"`.
    pub shape: &'static str,
    /// Decoder diagnostics (missing field, wrong type, malformed JSON).
    pub details: String,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid DID format.
    #[error("invalid DID '{value}': {reason}")]
    Did { value: String, reason: String },

    /// Invalid service URL format.
    #[error("invalid service URL '{value}': {reason}")]
    ServiceUrl { value: String, reason: String },

    /// A required argument was empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Credential store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error while reading or writing the store.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted store could not be parsed.
    #[error("corrupt store {path}: {message}")]
    Corrupt { path: String, message: String },

    /// The in-process guard was poisoned by a panicking writer.
    #[error("credential store lock poisoned")]
    Poisoned,
}
