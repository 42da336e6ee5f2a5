use thiserror::Error;

/// Failure talking to the authoring backend, classified so callers can decide
/// whether a retry makes sense.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned {status} for {endpoint}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("backend rejected {endpoint}: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("deployment did not return a GitHub Pages URL (got {got:?})")]
    UnexpectedDeployUrl { got: Option<String> },
}

impl BackendError {
    pub fn malformed(endpoint: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.to_owned(),
            reason: reason.into(),
        }
    }

    pub fn rejected(endpoint: &str, message: Option<String>) -> Self {
        Self::Rejected {
            endpoint: endpoint.to_owned(),
            message: message.unwrap_or_else(|| "request was not successful".to_owned()),
        }
    }

    /// Client errors (4xx) and deploy-shape mismatches are not worth repeating.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Rejected { .. } | Self::MalformedResponse { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::UnexpectedDeployUrl { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_side_statuses_retry() {
        let server = BackendError::Status {
            endpoint: "/x".to_owned(),
            status: 502,
            message: String::new(),
        };
        let client = BackendError::Status {
            endpoint: "/x".to_owned(),
            status: 422,
            message: String::new(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(BackendError::malformed("/x", "bad").is_retryable());
        assert!(!BackendError::UnexpectedDeployUrl { got: None }.is_retryable());
    }
}
