//! Error types for Basecamp requests

/// Result type for Basecamp operations
pub type Result<T> = std::result::Result<T, BasecampError>;

/// Errors that can occur while talking to Basecamp
#[derive(Debug, thiserror::Error)]
pub enum BasecampError {
    /// The request never produced a response
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The response body is not well-formed XML
    #[error("Malformed XML response: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Credentials or endpoint were refused
    #[error("Authentication failed (HTTP {0})")]
    Unauthorized(u16),

    /// Basecamp answered with validation errors
    #[error("Request rejected: {}", describe_errors(.0))]
    Rejected(Vec<String>),

    /// A successful response lacked an expected piece of data
    #[error("Response is missing {0}")]
    MissingField(&'static str),

    /// Any other status code on a read request
    #[error("Unexpected HTTP status {status} for {path}")]
    UnexpectedStatus {
        /// Status code returned by the server
        status: u16,
        /// Request path
        path: String,
    },
}

fn describe_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        "a non-specific error occurred".to_owned()
    } else {
        errors.join("; ")
    }
}
