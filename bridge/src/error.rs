use link::LinkError;

/// Why a telemetry session ended. Every variant is fatal to the current
/// connection and sends the supervisor back to reconnecting.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to connect to telemetry server at {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: LinkError,
    },

    #[error("Telemetry request {request_id} rejected: {message}")]
    Rejected { request_id: u32, message: String },

    #[error("Telemetry request {request_id} failed: {source}")]
    Transport {
        request_id: u32,
        #[source]
        source: LinkError,
    },
}

/// Coarse classification of a [`SessionError`] for logging and backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The connection could not be opened
    Connect,
    /// The source answered with an error or something undecodable
    Protocol,
    /// The connection broke mid-session
    Transport,
}

impl SessionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SessionError::Connect { .. } => FailureKind::Connect,
            SessionError::Rejected { .. } => FailureKind::Protocol,
            SessionError::Transport {
                source: LinkError::Protocol(_),
                ..
            } => FailureKind::Protocol,
            SessionError::Transport { .. } => FailureKind::Transport,
        }
    }
}

/// Invalid bridge settings
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid refresh rate {0} Hz: must be positive and finite")]
    InvalidRefreshRate(f64),

    #[error("Invalid retry interval {0} s: must be non-negative and finite")]
    InvalidRetryInterval(f64),
}
