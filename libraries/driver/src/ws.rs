use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use link::{Command, CommandSink, LinkError};
use log::{debug, info, trace, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Commands waiting to go out on the socket
const QUEUE_DEPTH: usize = 32;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Best-effort WebSocket command channel.
///
/// A background task keeps a connection to the actuator controller open,
/// reconnecting every `retry_interval` when it drops. [`send`](CommandSink::send)
/// only enqueues and never waits for the network.
pub struct WsCommandSink {
    queue: mpsc::Sender<String>,
    connected: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl WsCommandSink {
    /// Start connecting in the background. Must be called inside a tokio runtime.
    pub fn spawn(url: impl Into<String>, retry_interval: Duration) -> Self {
        let url = url.into();
        let (queue, pending) = mpsc::channel(QUEUE_DEPTH);
        let connected = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(maintain_connection(
            url,
            pending,
            connected.clone(),
            retry_interval,
        ));

        Self {
            queue,
            connected,
            task,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for WsCommandSink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl CommandSink for WsCommandSink {
    async fn send(&self, command: Command) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }

        self.queue
            .try_send(command.to_message())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => LinkError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => LinkError::NotConnected,
            })
    }
}

async fn maintain_connection(
    url: String,
    mut pending: mpsc::Receiver<String>,
    connected: Arc<AtomicBool>,
    retry_interval: Duration,
) {
    loop {
        match connect_async(url.as_str()).await {
            Ok((socket, _response)) => {
                info!("Command sink connected to {}", url);

                // targets queued for a dead session are stale
                while pending.try_recv().is_ok() {}

                connected.store(true, Ordering::Release);
                let result = forward(socket, &mut pending).await;
                connected.store(false, Ordering::Release);

                match result {
                    Ok(SessionEnd::QueueClosed) => return,
                    Ok(SessionEnd::PeerClosed) => warn!("Command sink {} closed by peer", url),
                    Err(e) => warn!("Command sink {} disconnected: {}", url, e),
                }
            }
            Err(e) => warn!("Command sink failed to connect to {}: {}", url, e),
        }

        debug!("Reconnecting command sink in {:?}", retry_interval);
        tokio::time::sleep(retry_interval).await;
    }
}

enum SessionEnd {
    QueueClosed,
    PeerClosed,
}

async fn forward(
    socket: Socket,
    pending: &mut mpsc::Receiver<String>,
) -> Result<SessionEnd, tungstenite::Error> {
    let (mut outgoing, mut incoming) = socket.split();

    loop {
        tokio::select! {
            message = pending.recv() => match message {
                Some(text) => outgoing.send(Message::Text(text)).await?,
                None => {
                    let _ = outgoing.close().await;
                    return Ok(SessionEnd::QueueClosed);
                }
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::PeerClosed),
                Some(Ok(other)) => trace!("Ignoring inbound frame {:?}", other),
                Some(Err(e)) => return Err(e),
            },
        }
    }
}
