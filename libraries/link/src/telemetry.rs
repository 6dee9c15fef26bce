use async_trait::async_trait;

use crate::{LinkError, QuaternionSample};

/// Reply to one telemetry request.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryReply {
    /// Current pose and whether the ride is in play
    Sample {
        quaternion: QuaternionSample,
        in_play: bool,
    },
    /// The source rejected the request
    Error { request_id: u32, message: String },
}

/// Opens telemetry connections.
///
/// Held by the supervisor for the life of the process and asked for a
/// fresh [`TelemetrySource`] after every failure.
#[async_trait]
pub trait TelemetryConnector: Send + Sync {
    type Source: TelemetrySource;

    /// Human-readable address for logs
    fn endpoint(&self) -> String;

    async fn connect(&self) -> Result<Self::Source, LinkError>;
}

/// One live request/reply telemetry connection.
///
/// Requests are strictly sequential: each call sends one request and waits
/// for its reply.
#[async_trait]
pub trait TelemetrySource: Send {
    async fn request(&mut self, request_id: u32) -> Result<TelemetryReply, LinkError>;

    async fn close(&mut self) -> Result<(), LinkError>;
}
