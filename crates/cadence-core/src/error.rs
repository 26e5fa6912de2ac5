//! Error types for cadence.

use thiserror::Error;

/// Result type alias using cadence's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cadence operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Recurrence rule or request input rejected before reaching the engine
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Reminder not found
    #[error("Reminder not found: {0}")]
    ReminderNotFound(uuid::Uuid),

    /// Suggestion not found
    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(uuid::Uuid),

    /// Suggestion status change that violates the monotonic transition order
    #[error("Invalid suggestion status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// The suggestion-phrasing service could not be reached
    #[error("Assist service unavailable: {0}")]
    AssistUnavailable(String),

    /// The suggestion-phrasing service did not answer in time
    #[error("Assist service timed out: {0}")]
    AssistTimeout(String),

    /// The suggestion-phrasing service answered with an unusable payload
    #[error("Assist response parse failure: {0}")]
    AssistParse(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cron expression or schedule setup error
    #[error("Schedule error: {0}")]
    Schedule(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Whether a retry at a higher layer can reasonably succeed.
    ///
    /// Only transient upstream failures qualify; validation and not-found
    /// errors are stable and must not be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::AssistUnavailable(_) | Error::AssistTimeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("interval must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: interval must be at least 1"
        );
    }

    #[test]
    fn test_error_display_reminder_not_found() {
        let id = Uuid::nil();
        let err = Error::ReminderNotFound(id);
        assert_eq!(err.to_string(), format!("Reminder not found: {}", id));
    }

    #[test]
    fn test_error_display_suggestion_not_found() {
        let id = Uuid::new_v4();
        let err = Error::SuggestionNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let err = Error::InvalidTransition {
            from: "accepted".to_string(),
            to: "primary".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid suggestion status transition: accepted -> primary"
        );
    }

    #[test]
    fn test_error_display_schedule() {
        let err = Error::Schedule("bad cron expression".to_string());
        assert_eq!(err.to_string(), "Schedule error: bad cron expression");
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::AssistUnavailable("conn refused".into()).is_transient());
        assert!(Error::AssistTimeout("30s elapsed".into()).is_transient());
        // A malformed answer will stay malformed — retrying is pointless.
        assert!(!Error::AssistParse("truncated JSON".into()).is_transient());
        assert!(!Error::Validation("bad".into()).is_transient());
        assert!(!Error::NotFound("setting".into()).is_transient());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
