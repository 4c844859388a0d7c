//! Breakdown error types.
//!
//! Every way a breakdown can fail collapses into one `BreakdownError`; the
//! kind tells callers (and logs) what went wrong. No kind is retried.

/// Error from a breakdown call.
#[derive(Debug, Clone)]
pub struct BreakdownError {
    /// The kind of error
    pub kind: BreakdownErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
}

impl BreakdownError {
    /// The title was blank; nothing was sent.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: BreakdownErrorKind::InvalidInput,
            status_code: None,
            message: message.into(),
        }
    }

    /// The remote answered with a non-success status.
    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: BreakdownErrorKind::Status,
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Connection refused, reset, or similar transport failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: BreakdownErrorKind::Network,
            status_code: None,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: BreakdownErrorKind::Timeout,
            status_code: None,
            message: message.into(),
        }
    }

    /// The body could not be used as a subtask list.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: BreakdownErrorKind::Malformed,
            status_code: None,
            message: message.into(),
        }
    }

    /// Map a reqwest transport error to the matching kind.
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            Self::network(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            Self::malformed(format!("Failed to decode response: {}", error))
        } else {
            Self::network(format!("Request failed: {}", error))
        }
    }
}

impl std::fmt::Display for BreakdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for BreakdownError {}

/// Classification of breakdown errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownErrorKind {
    InvalidInput,
    /// Non-success HTTP status
    Status,
    /// Connection failed
    Network,
    Timeout,
    /// Body was not `{ "subtasks": [non-empty strings] }` or the list was empty
    Malformed,
}

impl std::fmt::Display for BreakdownErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakdownErrorKind::InvalidInput => write!(f, "Invalid input"),
            BreakdownErrorKind::Status => write!(f, "Breakdown request failed"),
            BreakdownErrorKind::Network => write!(f, "Network error"),
            BreakdownErrorKind::Timeout => write!(f, "Timeout"),
            BreakdownErrorKind::Malformed => write!(f, "Malformed response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_code_when_present() {
        let error = BreakdownError::status(503, "unavailable");
        assert_eq!(
            error.to_string(),
            "Breakdown request failed (HTTP 503): unavailable"
        );

        let error = BreakdownError::malformed("missing subtasks");
        assert_eq!(error.to_string(), "Malformed response: missing subtasks");
    }
}
