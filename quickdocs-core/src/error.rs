//! Error types for QuickDocs.

use thiserror::Error;

/// The main error type for QuickDocs operations.
#[derive(Debug, Error)]
pub enum QuickdocsError {
    /// Failed to open or connect to the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query failed while running.
    #[error("Execution error: {0}")]
    Execution(String),
}

/// Result type alias for QuickDocs operations.
pub type QuickdocsResult<T> = Result<T, QuickdocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuickdocsError::Execution("no such table: nowhere".to_string());
        assert_eq!(err.to_string(), "Execution error: no such table: nowhere");
    }
}
