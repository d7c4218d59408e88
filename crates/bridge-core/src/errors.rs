/// Typed errors for the wire protocol. The client carries no retry logic;
/// callers decide how to handle each failure.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransportError {
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("stream interrupted: {0}")]
    Interrupted(String),
}

impl TransportError {
    pub fn from_status(status: u16, body: String) -> Self {
        Self::Status { status, body }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Network(_) => "network",
            Self::Interrupted(_) => "interrupted",
        }
    }
}
