//! Client for the NoLimits 2 telemetry server.

pub mod client;
pub mod codec;

pub use client::{Nl2Client, Nl2Connector, DEFAULT_PORT};
pub use codec::{Message, MessageType, TelemetryData};
