//! Fetch error types

/// Errors reported by the remote collaborator for one query.
///
/// The coordinator stores the error alongside the query that produced it, so
/// the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The remote answered with a failure.
    #[error("Remote error{}: {message}", http_suffix(.status))]
    Remote {
        /// HTTP status code, when the collaborator speaks HTTP.
        status: Option<u16>,
        /// Error message.
        message: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be decoded into rows.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The query cannot be expressed as a request.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl FetchError {
    /// Creates a remote error without a status code.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a remote error for an HTTP status.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code if there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if a collaborator may reasonably retry this request.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { status, .. } => {
                matches!(status, Some(429 | 500 | 502 | 503 | 504))
            }
            Self::Transport(_) => true,
            Self::Decode(_) | Self::InvalidQuery(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16(), err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        assert_eq!(
            FetchError::http(503, "busy").to_string(),
            "Remote error (HTTP 503): busy"
        );
        assert_eq!(FetchError::remote("nope").to_string(), "Remote error: nope");
    }

    #[test]
    fn test_retryable() {
        assert!(FetchError::http(429, "slow down").is_retryable());
        assert!(FetchError::Transport("reset".into()).is_retryable());
        assert!(!FetchError::http(404, "missing").is_retryable());
        assert!(!FetchError::Decode("bad json".into()).is_retryable());
    }
}
