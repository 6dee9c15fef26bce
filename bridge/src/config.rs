use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_REFRESH_RATE_HZ: f64 = 30.0;
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// How the scheduler sizes the sleep after each tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CadenceMode {
    /// Sleep for whatever is left of the period after this tick's work.
    /// Small per-tick errors accumulate over long runs.
    #[default]
    PerTick,
    /// Aim every start at `first_start + n * period`
    DriftCompensated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Telemetry requests per second
    pub refresh_rate_hz: f64,
    /// Delay between a failure and the next connection attempt
    pub retry_interval: Duration,
    pub cadence_mode: CadenceMode,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: DEFAULT_REFRESH_RATE_HZ,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            cadence_mode: CadenceMode::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new(
        refresh_rate_hz: f64,
        retry_interval_secs: f64,
        cadence_mode: CadenceMode,
    ) -> Result<Self, ConfigError> {
        let retry_interval = if retry_interval_secs >= 0.0 {
            Duration::try_from_secs_f64(retry_interval_secs)
                .map_err(|_| ConfigError::InvalidRetryInterval(retry_interval_secs))?
        } else {
            return Err(ConfigError::InvalidRetryInterval(retry_interval_secs));
        };

        let config = Self {
            refresh_rate_hz,
            retry_interval,
            cadence_mode,
        };
        config.period()?;
        Ok(config)
    }

    /// Target time between tick starts, `1 / refresh_rate_hz`
    pub fn period(&self) -> Result<Duration, ConfigError> {
        let hz = self.refresh_rate_hz;
        if !(hz.is_finite() && hz > 0.0) {
            return Err(ConfigError::InvalidRefreshRate(hz));
        }
        Duration::try_from_secs_f64(1.0 / hz).map_err(|_| ConfigError::InvalidRefreshRate(hz))
    }
}
