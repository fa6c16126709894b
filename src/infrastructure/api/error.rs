use std::error::Error;
use std::fmt;

/// Error type for the profile enrichment client
#[derive(Debug)]
pub enum ProfileApiError {
    /// Error from the reqwest HTTP client
    HttpError(reqwest::Error),
    /// Error parsing JSON
    JsonError(serde_json::Error),
    /// Non-success status returned by the provider
    ApiError { status: u16, message: String },
    /// Other error
    Other(String),
}

impl fmt::Display for ProfileApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileApiError::HttpError(e) => write!(f, "HTTP error: {}", e),
            ProfileApiError::JsonError(e) => write!(f, "JSON error: {}", e),
            ProfileApiError::ApiError { status, message } => {
                write!(f, "Profile API returned {}: {}", status, message)
            }
            ProfileApiError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Error for ProfileApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProfileApiError::HttpError(e) => Some(e),
            ProfileApiError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProfileApiError {
    fn from(error: reqwest::Error) -> Self {
        ProfileApiError::HttpError(error)
    }
}

impl From<serde_json::Error> for ProfileApiError {
    fn from(error: serde_json::Error) -> Self {
        ProfileApiError::JsonError(error)
    }
}
