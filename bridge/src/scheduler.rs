use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::config::{BridgeConfig, CadenceMode};
use crate::error::ConfigError;
use crate::shutdown::Shutdown;

/// Periodic unit of work driven by a [`CadenceScheduler`].
#[async_trait]
pub trait CadenceTask: Send {
    type Error;

    async fn tick(&mut self) -> Result<(), Self::Error>;
}

/// Runs a task at a fixed rate until it fails or shutdown is requested.
///
/// A tick that overruns the period is followed by the next one straight
/// away; there is no catch-up burst.
#[derive(Debug, Clone, Copy)]
pub struct CadenceScheduler {
    period: Duration,
    mode: CadenceMode,
}

impl CadenceScheduler {
    pub fn new(period: Duration, mode: CadenceMode) -> Self {
        Self { period, mode }
    }

    pub fn from_config(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.period()?, config.cadence_mode))
    }

    /// `Ok` when cancelled, `Err` with the first tick failure otherwise.
    pub async fn run<T: CadenceTask>(
        &self,
        task: &mut T,
        shutdown: &mut Shutdown,
    ) -> Result<(), T::Error> {
        let mut next_start = Instant::now();

        loop {
            if shutdown.is_triggered() {
                return Ok(());
            }

            let started = Instant::now();
            tokio::select! {
                biased;
                _ = shutdown.triggered() => return Ok(()),
                result = task.tick() => result?,
            }

            let delay = match self.mode {
                CadenceMode::PerTick => self.period.saturating_sub(started.elapsed()),
                CadenceMode::DriftCompensated => {
                    next_start += self.period;
                    let now = Instant::now();
                    if next_start < now {
                        // overrun, the grid restarts here
                        next_start = now;
                    }
                    next_start - now
                }
            };

            tokio::select! {
                biased;
                _ = shutdown.triggered() => return Ok(()),
                _ = sleep(delay) => {}
            }
        }
    }
}
