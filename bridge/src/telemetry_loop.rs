use std::sync::Arc;

use async_trait::async_trait;
use link::{Command, CommandSink, TelemetryReply, TelemetrySource};
use log::debug;
use orientation::{OrientationOutput, OrientationTracker};

use crate::error::SessionError;
use crate::scheduler::CadenceTask;

/// Per-connection telemetry pipeline.
///
/// Owns the source and a fresh [`OrientationTracker`], so continuity
/// offsets never survive a reconnect.
pub struct TelemetryLoop<T, S> {
    source: T,
    sink: Arc<S>,
    tracker: OrientationTracker,
    next_request_id: u32,
}

impl<T: TelemetrySource, S: CommandSink> TelemetryLoop<T, S> {
    pub fn new(source: T, sink: Arc<S>) -> Self {
        Self {
            source,
            sink,
            tracker: OrientationTracker::new(),
            next_request_id: 0,
        }
    }

    /// Hand the connection back so the caller can close it
    pub fn into_source(self) -> T {
        self.source
    }

    /// One request → track → publish cycle.
    ///
    /// Commands go out while the ride is in play, plus once more on the
    /// tick it stops so the platform is sent back to neutral.
    pub async fn step(&mut self) -> Result<OrientationOutput, SessionError> {
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);

        let reply = self
            .source
            .request(request_id)
            .await
            .map_err(|source| SessionError::Transport { request_id, source })?;

        let (quaternion, in_play) = match reply {
            TelemetryReply::Sample {
                quaternion,
                in_play,
            } => (quaternion, in_play),
            TelemetryReply::Error {
                request_id,
                message,
            } => return Err(SessionError::Rejected { request_id, message }),
        };

        let was_active = self.tracker.is_active();
        let output = self.tracker.update(&quaternion, in_play);
        if output.active || was_active {
            publish(&*self.sink, output).await;
        }

        Ok(output)
    }
}

async fn publish<S: CommandSink>(sink: &S, output: OrientationOutput) {
    // platform roll axis is mirrored
    let commands = [
        Command::roll_target(-output.roll),
        Command::pitch_target(output.pitch),
    ];

    for command in commands {
        let key = command.key;
        if let Err(e) = sink.send(command).await {
            debug!("Dropped {} command: {}", key, e);
        }
    }
}

#[async_trait]
impl<T: TelemetrySource, S: CommandSink> CadenceTask for TelemetryLoop<T, S> {
    type Error = SessionError;

    async fn tick(&mut self) -> Result<(), SessionError> {
        self.step().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::Mutex;

    use link::{LinkError, QuaternionSample};

    /// Send but not Sync; in play for the first two requests
    struct CountingSource {
        served: Cell<u32>,
    }

    #[async_trait]
    impl TelemetrySource for CountingSource {
        async fn request(&mut self, _request_id: u32) -> Result<TelemetryReply, LinkError> {
            self.served.set(self.served.get() + 1);
            Ok(TelemetryReply::Sample {
                quaternion: QuaternionSample::IDENTITY,
                in_play: self.served.get() < 3,
            })
        }

        async fn close(&mut self) -> Result<(), LinkError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink(Mutex<Vec<String>>);

    #[async_trait]
    impl CommandSink for CollectingSink {
        async fn send(&self, command: Command) -> Result<(), LinkError> {
            self.0.lock().unwrap().push(command.to_message());
            Ok(())
        }
    }

    fn require_send<F: Send>(future: F) -> F {
        future
    }

    #[tokio::test]
    async fn test_step_with_source_that_is_not_sync() {
        let sink = Arc::new(CollectingSink::default());
        let source = CountingSource {
            served: Cell::new(0),
        };
        let mut telemetry = TelemetryLoop::new(source, sink.clone());

        for _ in 0..4 {
            require_send(telemetry.step()).await.unwrap();
        }
        require_send(telemetry.tick()).await.unwrap();

        // two ticks in play, one neutral on the stop, then silence
        let sent = sink.0.lock().unwrap().clone();
        assert_eq!(sent, ["r,0", "p,0", "r,0", "p,0", "r,0", "p,0"]);
        assert_eq!(telemetry.into_source().served.get(), 5);
    }
}
