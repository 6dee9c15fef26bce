//! # Bridge
//!
//! Polls ride telemetry at a fixed rate, turns each quaternion into
//! continuous roll/pitch targets and pushes them to the motion platform.
//! Lost telemetry connections are retried forever; only an explicit
//! shutdown ends the run.
//!
//! - [`ConnectionSupervisor`]: connection lifecycle and retry
//! - [`TelemetryLoop`]: one tick of request → track → publish
//! - [`CadenceScheduler`]: fixed-rate pacing of the ticks

pub mod config;
pub mod error;
pub mod scheduler;
pub mod shutdown;
pub mod supervisor;
pub mod telemetry_loop;

pub use config::{BridgeConfig, CadenceMode};
pub use error::{ConfigError, FailureKind, SessionError};
pub use scheduler::{CadenceScheduler, CadenceTask};
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};
pub use supervisor::{ConnectionSupervisor, SupervisorStats};
pub use telemetry_loop::TelemetryLoop;
