use std::time::Duration;

/// Typed error hierarchy for generation endpoint operations.
///
/// Every variant belongs to the upstream-unavailable class: the operation that hit it
/// fails as a whole and nothing is retried.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("model {model} not found on endpoint")]
    ModelNotFound { model: String },
    #[error("invalid response from endpoint: {0}")]
    InvalidResponse(String),
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// All generation failures are fatal to the current operation.
    pub fn is_upstream(&self) -> bool {
        true
    }

    /// True for failures where the response arrived but had the wrong shape.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::InvalidResponse(_) => "invalid_response",
            Self::ServerError { .. } => "server_error",
            Self::Network(_) => "network_error",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Classify a non-success HTTP status from the endpoint.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::Unavailable(format!("endpoint returned 404: {body}")),
            500..=599 => Self::ServerError { status, body },
            _ => Self::InvalidResponse(format!("unexpected status {status}: {body}")),
        }
    }
}
