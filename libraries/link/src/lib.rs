//! Interfaces to the two external collaborators of the bridge: the
//! telemetry source it polls and the command sink it feeds.

mod command;
mod error;
mod telemetry;

pub use command::{Command, CommandSink};
pub use error::LinkError;
pub use telemetry::{TelemetryConnector, TelemetryReply, TelemetrySource};

pub use orientation::QuaternionSample;
