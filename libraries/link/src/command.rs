use std::fmt;

use async_trait::async_trait;

use crate::LinkError;

/// A single actuator command, sent on the wire as `key,value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub key: &'static str,
    pub value: String,
}

impl Command {
    /// Alias for `setRollTarget` on the actuator side
    pub const ROLL_TARGET: &'static str = "r";
    /// Alias for `setPitchTarget` on the actuator side
    pub const PITCH_TARGET: &'static str = "p";

    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn roll_target(degrees: i32) -> Self {
        Self::new(Self::ROLL_TARGET, degrees.to_string())
    }

    pub fn pitch_target(degrees: i32) -> Self {
        Self::new(Self::PITCH_TARGET, degrees.to_string())
    }

    pub fn to_message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.key, self.value)
    }
}

/// Fire-and-forget outbound command channel.
///
/// There is no acknowledgement. An `Err` means this one command was not
/// handed to the transport; callers drop it and move on.
///
/// The channel may be shared with other senders, so it is only ever
/// borrowed.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send(&self, command: Command) -> Result<(), LinkError>;
}
