// src/core/error.rs

use thiserror::Error;

/// Every way a call against the scan backend can fail.
///
/// The variants map one-to-one onto what the user can do about them:
/// fix the input (`Validation`), wait (`NotReady`), pick another task
/// (`NotFound`), try again later (`Transport`, `Render`) or report a bug
/// in the backend (`Protocol`).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScanError {
    /// Bad input caught before any network call, or rejected by the backend.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The task id is unknown to the backend.
    #[error("task {0} not found")]
    NotFound(String),

    /// The task has not completed yet, so it has no result or report.
    #[error("task {0} has not completed yet")]
    NotReady(String),

    /// The backend could not be reached or answered with a server failure.
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend failed while rendering a report.
    #[error("report rendering failed: {0}")]
    Render(String),

    /// The backend answered with a payload that breaks the data model.
    #[error("malformed backend response: {0}")]
    Protocol(String),
}

impl ScanError {
    /// Only transport failures are worth an automatic retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::Transport(_))
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ScanError::Protocol(e.to_string())
        } else {
            ScanError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::Protocol(e.to_string())
    }
}

pub type ScanOutcome<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_is_retryable() {
        assert!(ScanError::Transport("timeout".into()).is_retryable());
        assert!(!ScanError::NotReady("1".into()).is_retryable());
        assert!(!ScanError::NotFound("1".into()).is_retryable());
        assert!(!ScanError::Render("boom".into()).is_retryable());
        assert!(!ScanError::Validation("empty".into()).is_retryable());
        assert!(!ScanError::Protocol("bad json".into()).is_retryable());
    }

    #[test]
    fn json_errors_are_protocol_errors() {
        let err = serde_json::from_str::<u32>("not a number").unwrap_err();
        assert!(matches!(ScanError::from(err), ScanError::Protocol(_)));
    }
}
