/// Errors raised by telemetry and command transports.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed by peer")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Outgoing queue is full")]
    QueueFull,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
