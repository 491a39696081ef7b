pub type ScrubResult<T> = Result<T, ScrubError>;

#[derive(thiserror::Error, Debug)]
pub enum ScrubError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("not ready: {0}")]
    NotReady(String),

    #[error("missing target: {0}")]
    MissingTarget(String),

    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrubError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    pub fn missing_target(msg: impl Into<String>) -> Self {
        Self::MissingTarget(msg.into())
    }

    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Errors the per-frame path absorbs instead of surfacing.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotReady(_) | Self::MissingTarget(_))
    }
}

impl From<serde_json::Error> for ScrubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
