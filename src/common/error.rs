//! Error types for the academy API check
//!
//! Every step of the workflow reports failure through [`Error`]. The runner
//! decides whether an error aborts the run or is only recorded in the report.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the API check
#[derive(Error, Debug)]
pub enum Error {
    // === HTTP Errors ===
    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Response from {path} has no '{field}'")]
    MissingField { path: String, field: &'static str },

    #[error("Could not decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    // === Workflow Errors ===
    #[error("Cannot proceed without {step}: {reason}")]
    Aborted { step: &'static str, reason: String },

    #[error("Strict mode: {failed} step(s) failed, {warned} warned")]
    Unclean { failed: usize, warned: usize },

    #[error("Cannot raise maxMarks {marks} by {step} without overflowing")]
    MarksOverflow { marks: i32, step: i32 },

    #[error("Invalid deadlines: late submission {late} is not after deadline {deadline}")]
    DeadlineOrder { deadline: String, late: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a non-success status error
    pub fn status(path: &str, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            path: path.to_string(),
            status,
            body: body.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(path: &str, field: &'static str) -> Self {
        Self::MissingField {
            path: path.to_string(),
            field,
        }
    }

    /// Create an abort error for one of the fatal steps
    pub fn aborted(step: &'static str, reason: impl ToString) -> Self {
        Self::Aborted {
            step,
            reason: reason.to_string(),
        }
    }

    /// HTTP status of the response, if the server answered at all
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Transport { source, .. } | Error::Client(source) => {
                source.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    /// Short form used in step lines of the console report
    pub fn summary(&self) -> String {
        match self {
            Error::Status { status, body, .. } if body.is_empty() => format!("HTTP {}", status),
            Error::Status { status, body, .. } => format!("HTTP {} - {}", status, body),
            Error::MissingField { field, .. } => format!("response has no '{}'", field),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_summary_includes_body() {
        let err = Error::status("/auth/login", 401, r#"{"error":"Bad credentials"}"#);
        assert_eq!(err.http_status(), Some(401));
        assert_eq!(err.summary(), r#"HTTP 401 - {"error":"Bad credentials"}"#);
    }

    #[test]
    fn test_status_summary_without_body() {
        let err = Error::status("/test", 503, "");
        assert_eq!(err.summary(), "HTTP 503");
    }

    #[test]
    fn test_missing_field_message() {
        let err = Error::missing_field("/courses", "id");
        assert_eq!(err.http_status(), None);
        assert_eq!(err.to_string(), "Response from /courses has no 'id'");
    }

    #[test]
    fn test_aborted_message() {
        let err = Error::aborted("admin token", "HTTP 401");
        assert_eq!(err.to_string(), "Cannot proceed without admin token: HTTP 401");
    }
}
