use thiserror::Error;

use crate::domain::models::ContentRefError;
use crate::domain::services::InvalidIdentifier;
use crate::infrastructure::api::ProfileApiError;
use crate::infrastructure::persistence::DbError;

/// Failure of an analytics query. No partial result accompanies an error.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// Caused by the request rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidIdentifier(_) | AnalyticsError::NotFound(_)
        )
    }

    /// HTTP status an outer layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            AnalyticsError::InvalidIdentifier(_) => 400,
            AnalyticsError::NotFound(_) => 404,
            AnalyticsError::Upstream(_) => 502,
            AnalyticsError::Database(_) | AnalyticsError::Internal(_) => 500,
        }
    }
}

impl From<DbError> for AnalyticsError {
    fn from(err: DbError) -> Self {
        AnalyticsError::Database(err.to_string())
    }
}

impl From<ProfileApiError> for AnalyticsError {
    fn from(err: ProfileApiError) -> Self {
        AnalyticsError::Upstream(err.to_string())
    }
}

impl From<InvalidIdentifier> for AnalyticsError {
    fn from(err: InvalidIdentifier) -> Self {
        AnalyticsError::InvalidIdentifier(err.0)
    }
}

impl From<ContentRefError> for AnalyticsError {
    fn from(err: ContentRefError) -> Self {
        AnalyticsError::InvalidIdentifier(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let invalid: AnalyticsError = InvalidIdentifier("!!".to_string()).into();
        assert!(invalid.is_client_error());
        assert_eq!(invalid.status_code(), 400);

        let missing = AnalyticsError::NotFound("@ghost".to_string());
        assert!(missing.is_client_error());
        assert_eq!(missing.status_code(), 404);

        let db: AnalyticsError = DbError::ConnectionError("refused".to_string()).into();
        assert!(!db.is_client_error());
        assert_eq!(db.status_code(), 500);
    }
}
