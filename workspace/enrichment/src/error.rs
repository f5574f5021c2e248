use thiserror::Error;

/// Failures talking to an external metadata service.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Transport failure, timeout or non-success status
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a body we could not read
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The movie service needs an API key and none is configured
    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),
}

/// Type alias for Result with LookupError
pub type Result<T> = std::result::Result<T, LookupError>;
