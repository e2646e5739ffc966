use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// A successfully fetched and decoded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub html: String,
    pub encoding_label: String,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether repeating the same request later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            FailureKind::Network => true,
            FailureKind::HttpStatus(code) => code >= 500 || code == 429,
            FailureKind::InvalidUrl
            | FailureKind::InvalidContentType { .. }
            | FailureKind::TooLarge { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    InvalidContentType { content_type: String },
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// DNS, TLS, connection reset, client-side timeout, redirect loops.
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidContentType { content_type } => {
                write!(f, "invalid content type {content_type}")
            }
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = FetchError::new(FailureKind::HttpStatus(404), "404 Not Found");
        assert_eq!(err.to_string(), "http status 404: 404 Not Found");
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(FetchError::new(FailureKind::Network, "reset").is_retryable());
        assert!(FetchError::new(FailureKind::HttpStatus(503), "").is_retryable());
        assert!(!FetchError::new(FailureKind::HttpStatus(404), "").is_retryable());
        let json = FailureKind::InvalidContentType {
            content_type: "application/json".into(),
        };
        assert!(!FetchError::new(json, "").is_retryable());
    }
}
