//! Typed fetch errors and per-request outcomes shared by every pipeline

use std::fmt;

/// Failure of a single upstream request.
///
/// `Exhausted` is only produced by the retry driver once the attempt ceiling
/// is reached; it wraps the last underlying failure.
#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure (no HTTP status)
    Transport { url: String, message: String },
    /// Server answered with a non-success status
    Status { url: String, status: u16 },
    /// Body did not decode as the expected JSON envelope
    Decode { url: String, message: String },
    /// Retry ceiling reached
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { url, message } => write!(f, "request failed: {message} ({url})"),
            Self::Status { url, status } => write!(f, "HTTP {status}: {url}"),
            Self::Decode { url, message } => write!(f, "invalid JSON from {url}: {message}"),
            Self::Exhausted {
                url,
                attempts,
                last,
            } => write!(
                f,
                "failed after {attempts} attempts: {url} (last error: {last})"
            ),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Build from a reqwest error, keeping the status when the error carries one.
    pub fn from_reqwest(url: &str, e: &reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None => Self::Transport {
                url: url.to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Every single-request failure is retried; only exhaustion is final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Exhausted { .. })
    }

    /// URL of the failing request
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::Exhausted { url, .. } => url,
        }
    }

    /// HTTP status of the (last) failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Exhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

/// Result of one fetch.
///
/// Callers match on this instead of treating "no data" as an error signal:
/// `Retryable` means another attempt may succeed, `Terminal` means the caller
/// should give up on this request.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Success(T),
    Retryable(FetchError),
    Terminal(FetchError),
}

impl<T> FetchOutcome<T> {
    /// Classify an error by its retryability
    pub fn from_error(e: FetchError) -> Self {
        if e.is_retryable() {
            Self::Retryable(e)
        } else {
            Self::Terminal(e)
        }
    }

    /// Error carried by a failed outcome
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Success(_) => None,
            Self::Retryable(e) | Self::Terminal(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<T, FetchError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Retryable(e) | Self::Terminal(e) => Err(e),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_err(status: u16) -> FetchError {
        FetchError::Status {
            url: "https://api.test/works".to_string(),
            status,
        }
    }

    #[test]
    fn single_request_failures_are_retryable() {
        assert!(status_err(500).is_retryable());
        assert!(status_err(404).is_retryable());
        assert!(FetchError::Transport {
            url: "u".into(),
            message: "connection reset".into()
        }
        .is_retryable());
        assert!(FetchError::Decode {
            url: "u".into(),
            message: "eof".into()
        }
        .is_retryable());
    }

    #[test]
    fn exhausted_is_final() {
        let err = FetchError::Exhausted {
            url: "u".into(),
            attempts: 3,
            last: Box::new(status_err(503)),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(503));
        assert!(matches!(
            FetchOutcome::<()>::from_error(err),
            FetchOutcome::Terminal(_)
        ));
    }

    #[test]
    fn display_status() {
        assert_eq!(
            format!("{}", status_err(429)),
            "HTTP 429: https://api.test/works"
        );
    }

    #[test]
    fn display_exhausted_mentions_last_error() {
        let err = FetchError::Exhausted {
            url: "https://api.test/works".into(),
            attempts: 3,
            last: Box::new(status_err(500)),
        };
        let msg = format!("{err}");
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("HTTP 500"));
    }

    #[test]
    fn outcome_failure_has_no_data() {
        let out: FetchOutcome<i32> = FetchOutcome::Terminal(status_err(404));
        assert_eq!(out.error().and_then(FetchError::status), Some(404));
        assert_eq!(out.into_result().unwrap_err().status(), Some(404));
    }
}
