use std::sync::Arc;
use std::time::Duration;

use link::{CommandSink, TelemetryConnector, TelemetrySource};
use log::{debug, error, info, warn};
use tokio::time::sleep;

use crate::config::BridgeConfig;
use crate::error::{ConfigError, FailureKind, SessionError};
use crate::scheduler::CadenceScheduler;
use crate::shutdown::Shutdown;
use crate::telemetry_loop::TelemetryLoop;

/// Counters reported when the supervisor exits
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SupervisorStats {
    pub connect_attempts: u32,
    pub sessions: u32,
    pub failures: u32,
    pub last_failure: Option<FailureKind>,
}

enum State<T> {
    Connecting,
    Running(T),
    Disconnected,
    Terminated,
}

/// Keeps a telemetry session alive until shutdown.
///
/// Failures of any kind close the connection, wait `retry_interval` and
/// start over with a fresh [`TelemetryLoop`]. There is no retry limit.
pub struct ConnectionSupervisor<C, S> {
    connector: C,
    sink: Arc<S>,
    scheduler: CadenceScheduler,
    retry_interval: Duration,
    stats: SupervisorStats,
}

impl<C, S> ConnectionSupervisor<C, S>
where
    C: TelemetryConnector,
    S: CommandSink,
{
    pub fn new(connector: C, sink: Arc<S>, config: &BridgeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            connector,
            sink,
            scheduler: CadenceScheduler::from_config(config)?,
            retry_interval: config.retry_interval,
            stats: SupervisorStats::default(),
        })
    }

    pub async fn run(mut self, mut shutdown: Shutdown) -> SupervisorStats {
        let mut state = State::Connecting;

        loop {
            state = match state {
                State::Connecting => self.connect(&mut shutdown).await,
                State::Running(source) => self.run_session(source, &mut shutdown).await,
                State::Disconnected => self.wait_before_retry(&mut shutdown).await,
                State::Terminated => break,
            };
        }

        info!(
            "Bridge stopped after {} session(s) and {} failure(s)",
            self.stats.sessions, self.stats.failures
        );
        self.stats
    }

    async fn connect(&mut self, shutdown: &mut Shutdown) -> State<C::Source> {
        if shutdown.is_triggered() {
            return State::Terminated;
        }

        self.stats.connect_attempts += 1;
        let endpoint = self.connector.endpoint();
        info!("Connecting to telemetry server at {}", endpoint);

        let result = tokio::select! {
            biased;
            _ = shutdown.triggered() => return State::Terminated,
            result = self.connector.connect() => result,
        };

        match result {
            Ok(source) => State::Running(source),
            Err(source) => {
                self.record_failure(&SessionError::Connect { endpoint, source });
                State::Disconnected
            }
        }
    }

    async fn run_session(
        &mut self,
        source: C::Source,
        shutdown: &mut Shutdown,
    ) -> State<C::Source> {
        self.stats.sessions += 1;
        info!("Telemetry session {} started", self.stats.sessions);

        let mut session = TelemetryLoop::new(source, Arc::clone(&self.sink));
        let outcome = self.scheduler.run(&mut session, shutdown).await;

        let next = match outcome {
            Ok(()) => {
                info!("Telemetry session cancelled");
                State::Terminated
            }
            Err(failure) => {
                self.record_failure(&failure);
                State::Disconnected
            }
        };

        let mut source = session.into_source();
        if let Err(e) = source.close().await {
            debug!("Error while closing telemetry connection: {}", e);
        }
        next
    }

    async fn wait_before_retry(&mut self, shutdown: &mut Shutdown) -> State<C::Source> {
        info!("Attempting reconnection in {:?}", self.retry_interval);
        tokio::select! {
            biased;
            _ = shutdown.triggered() => State::Terminated,
            _ = sleep(self.retry_interval) => State::Connecting,
        }
    }

    fn record_failure(&mut self, failure: &SessionError) {
        let kind = failure.kind();
        self.stats.failures += 1;
        self.stats.last_failure = Some(kind);

        match kind {
            FailureKind::Connect => warn!("{}", failure),
            FailureKind::Protocol | FailureKind::Transport => error!("{}", failure),
        }
    }
}
