use async_trait::async_trait;
use link::{LinkError, TelemetryConnector, TelemetryReply, TelemetrySource};
use log::{info, trace};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;

use super::codec::{read_message, Message, MessageType, TelemetryData};

/// Default port of the NoLimits 2 telemetry server
pub const DEFAULT_PORT: u16 = 15151;

/// Opens TCP connections to a NoLimits 2 telemetry server.
#[derive(Debug, Clone)]
pub struct Nl2Connector {
    host: String,
    port: u16,
}

impl Nl2Connector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl TelemetryConnector for Nl2Connector {
    type Source = Nl2Client<TcpStream>;

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn connect(&self) -> Result<Self::Source, LinkError> {
        let endpoint = self.endpoint();
        let stream = TcpStream::connect(endpoint.as_str())
            .await
            .map_err(|e| LinkError::ConnectionFailed(format!("{}: {}", endpoint, e)))?;
        stream.set_nodelay(true)?;
        info!("NL2 connection to {} successful", endpoint);
        Ok(Nl2Client::new(stream))
    }
}

/// Request/reply client over any byte stream.
pub struct Nl2Client<S> {
    stream: BufStream<S>,
}

impl<S> Nl2Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufStream::new(stream),
        }
    }

    async fn exchange(&mut self, request: Message) -> Result<Message, LinkError> {
        self.stream.write_all(&request.encode()?).await?;
        self.stream.flush().await?;

        let reply = read_message(&mut self.stream).await?;
        if reply.request_id != request.request_id {
            return Err(LinkError::Protocol(format!(
                "reply for request {} while waiting for {}",
                reply.request_id, request.request_id
            )));
        }
        Ok(reply)
    }
}

#[async_trait]
impl<S> TelemetrySource for Nl2Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn request(&mut self, request_id: u32) -> Result<TelemetryReply, LinkError> {
        let reply = self
            .exchange(Message::new(MessageType::GetTelemetry, request_id, Vec::new()))
            .await?;

        match reply.message_type() {
            Some(MessageType::Telemetry) => {
                let data = TelemetryData::parse(&reply.payload)?;
                trace!(
                    "frame {} in_play={} braking={} paused={} speed={:.1}",
                    data.frame,
                    data.in_play(),
                    data.braking(),
                    data.paused(),
                    data.speed
                );
                Ok(data.into())
            }
            Some(MessageType::Error) => Ok(TelemetryReply::Error {
                request_id,
                message: String::from_utf8_lossy(&reply.payload).into_owned(),
            }),
            _ => Err(LinkError::Protocol(format!(
                "unexpected reply type {} to telemetry request",
                reply.type_id
            ))),
        }
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
