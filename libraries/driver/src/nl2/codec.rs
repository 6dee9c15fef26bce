//! NoLimits 2 telemetry server framing.
//!
//! Every message, in both directions, is laid out big-endian as
//!
//! ```text
//! 'N' | u16 type | u32 request id | u16 payload size | payload | 'L'
//! ```

use std::io;

use link::{LinkError, QuaternionSample, TelemetryReply};
use tokio::io::{AsyncRead, AsyncReadExt};

pub const START_MARKER: u8 = b'N';
pub const END_MARKER: u8 = b'L';

/// Size of a telemetry payload in bytes
pub const TELEMETRY_PAYLOAD_LEN: usize = 76;

const STATE_IN_PLAY: u32 = 1 << 0;
const STATE_BRAKING: u32 = 1 << 1;
const STATE_PAUSED: u32 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Idle,
    Ok,
    Error,
    GetVersion,
    Version,
    GetTelemetry,
    Telemetry,
}

impl MessageType {
    pub fn id(self) -> u16 {
        match self {
            MessageType::Idle => 0,
            MessageType::Ok => 1,
            MessageType::Error => 2,
            MessageType::GetVersion => 3,
            MessageType::Version => 4,
            MessageType::GetTelemetry => 5,
            MessageType::Telemetry => 6,
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(MessageType::Idle),
            1 => Some(MessageType::Ok),
            2 => Some(MessageType::Error),
            3 => Some(MessageType::GetVersion),
            4 => Some(MessageType::Version),
            5 => Some(MessageType::GetTelemetry),
            6 => Some(MessageType::Telemetry),
            _ => None,
        }
    }
}

/// One framed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub type_id: u16,
    pub request_id: u32,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(message_type: MessageType, request_id: u32, payload: Vec<u8>) -> Self {
        Self {
            type_id: message_type.id(),
            request_id,
            payload,
        }
    }

    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_id(self.type_id)
    }

    pub fn encode(&self) -> Result<Vec<u8>, LinkError> {
        let size = u16::try_from(self.payload.len()).map_err(|_| {
            LinkError::Protocol(format!(
                "payload of {} bytes does not fit a frame",
                self.payload.len()
            ))
        })?;

        let mut frame = Vec::with_capacity(self.payload.len() + 10);
        frame.push(START_MARKER);
        frame.extend_from_slice(&self.type_id.to_be_bytes());
        frame.extend_from_slice(&self.request_id.to_be_bytes());
        frame.extend_from_slice(&size.to_be_bytes());
        frame.extend_from_slice(&self.payload);
        frame.push(END_MARKER);
        Ok(frame)
    }
}

/// Read exactly one framed message.
///
/// A clean end of stream surfaces as [`LinkError::Closed`].
pub async fn read_message<R>(reader: &mut R) -> Result<Message, LinkError>
where
    R: AsyncRead + Unpin,
{
    let start = reader.read_u8().await.map_err(read_error)?;
    if start != START_MARKER {
        return Err(LinkError::Protocol(format!(
            "bad start marker 0x{:02x}",
            start
        )));
    }

    let type_id = reader.read_u16().await.map_err(read_error)?;
    let request_id = reader.read_u32().await.map_err(read_error)?;
    let size = reader.read_u16().await.map_err(read_error)?;

    let mut payload = vec![0u8; usize::from(size)];
    reader.read_exact(&mut payload).await.map_err(read_error)?;

    let end = reader.read_u8().await.map_err(read_error)?;
    if end != END_MARKER {
        return Err(LinkError::Protocol(format!("bad end marker 0x{:02x}", end)));
    }

    Ok(Message {
        type_id,
        request_id,
        payload,
    })
}

fn read_error(e: io::Error) -> LinkError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        LinkError::Closed
    } else {
        LinkError::Io(e)
    }
}

/// Decoded telemetry payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: u32,
    pub frame: i32,
    pub view_mode: i32,
    pub coaster: i32,
    pub coaster_style: i32,
    pub train: i32,
    pub car: i32,
    pub seat: i32,
    /// m/s
    pub speed: f32,
    pub position: [f32; 3],
    pub quaternion: QuaternionSample,
    pub g_force: [f32; 3],
}

impl TelemetryData {
    pub fn parse(payload: &[u8]) -> Result<Self, LinkError> {
        if payload.len() < TELEMETRY_PAYLOAD_LEN {
            return Err(LinkError::Protocol(format!(
                "telemetry payload is {} bytes, expected {}",
                payload.len(),
                TELEMETRY_PAYLOAD_LEN
            )));
        }

        let mut fields = payload
            .chunks_exact(4)
            .map(|chunk| [chunk[0], chunk[1], chunk[2], chunk[3]]);
        let mut next = || fields.next().unwrap_or_default();

        let state = u32::from_be_bytes(next());
        let frame = i32::from_be_bytes(next());
        let view_mode = i32::from_be_bytes(next());
        let coaster = i32::from_be_bytes(next());
        let coaster_style = i32::from_be_bytes(next());
        let train = i32::from_be_bytes(next());
        let car = i32::from_be_bytes(next());
        let seat = i32::from_be_bytes(next());
        let speed = f32::from_be_bytes(next());
        let position = [
            f32::from_be_bytes(next()),
            f32::from_be_bytes(next()),
            f32::from_be_bytes(next()),
        ];
        let qx = f32::from_be_bytes(next());
        let qy = f32::from_be_bytes(next());
        let qz = f32::from_be_bytes(next());
        let qw = f32::from_be_bytes(next());
        let g_force = [
            f32::from_be_bytes(next()),
            f32::from_be_bytes(next()),
            f32::from_be_bytes(next()),
        ];

        Ok(Self {
            state,
            frame,
            view_mode,
            coaster,
            coaster_style,
            train,
            car,
            seat,
            speed,
            position,
            quaternion: QuaternionSample::new(qx.into(), qy.into(), qz.into(), qw.into()),
            g_force,
        })
    }

    pub fn in_play(&self) -> bool {
        self.state & STATE_IN_PLAY != 0
    }

    pub fn braking(&self) -> bool {
        self.state & STATE_BRAKING != 0
    }

    pub fn paused(&self) -> bool {
        self.state & STATE_PAUSED != 0
    }
}

impl From<TelemetryData> for TelemetryReply {
    fn from(data: TelemetryData) -> Self {
        TelemetryReply::Sample {
            quaternion: data.quaternion,
            in_play: data.in_play(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a telemetry payload the way the server does
    pub(crate) fn telemetry_payload(state: u32, frame: i32, quaternion: [f32; 4]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(TELEMETRY_PAYLOAD_LEN);
        payload.extend_from_slice(&state.to_be_bytes());
        payload.extend_from_slice(&frame.to_be_bytes());
        for int_field in [0i32, 1, 2, 0, 3, 1] {
            payload.extend_from_slice(&int_field.to_be_bytes());
        }
        for float_field in [12.5f32, 1.0, 2.0, 3.0] {
            payload.extend_from_slice(&float_field.to_be_bytes());
        }
        for component in quaternion {
            payload.extend_from_slice(&component.to_be_bytes());
        }
        for g in [0.0f32, 1.0, 0.0] {
            payload.extend_from_slice(&g.to_be_bytes());
        }
        payload
    }

    #[test]
    fn test_encode_get_telemetry() {
        let frame = Message::new(MessageType::GetTelemetry, 0x0102_0304, Vec::new())
            .encode()
            .unwrap();
        assert_eq!(
            frame,
            vec![b'N', 0x00, 0x05, 0x01, 0x02, 0x03, 0x04, 0x00, 0x00, b'L']
        );
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let message = Message::new(MessageType::Ok, 1, vec![0; 70_000]);
        assert!(matches!(message.encode(), Err(LinkError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_read_error_message() {
        let frame = Message::new(MessageType::Error, 7, b"not in play".to_vec())
            .encode()
            .unwrap();
        let message = read_message(&mut frame.as_slice()).await.unwrap();
        assert_eq!(message.message_type(), Some(MessageType::Error));
        assert_eq!(message.request_id, 7);
        assert_eq!(message.payload, b"not in play");
    }

    #[tokio::test]
    async fn test_read_rejects_bad_markers() {
        let mut frame = Message::new(MessageType::Ok, 1, Vec::new()).encode().unwrap();
        frame[0] = b'X';
        assert!(matches!(
            read_message(&mut frame.as_slice()).await,
            Err(LinkError::Protocol(_))
        ));

        let mut frame = Message::new(MessageType::Ok, 1, Vec::new()).encode().unwrap();
        let last = frame.len() - 1;
        frame[last] = b'X';
        assert!(matches!(
            read_message(&mut frame.as_slice()).await,
            Err(LinkError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_frame_reads_as_closed() {
        let frame = Message::new(MessageType::Ok, 1, vec![1, 2, 3]).encode().unwrap();
        let truncated = &frame[..6];
        assert!(matches!(
            read_message(&mut &truncated[..]).await,
            Err(LinkError::Closed)
        ));
    }

    #[test]
    fn test_parse_telemetry_payload() {
        let payload = telemetry_payload(STATE_IN_PLAY | STATE_PAUSED, 1234, [0.0, 0.5, 0.0, 0.5]);
        let data = TelemetryData::parse(&payload).unwrap();
        assert!(data.in_play());
        assert!(data.paused());
        assert!(!data.braking());
        assert_eq!(data.frame, 1234);
        assert_eq!(data.coaster_style, 2);
        assert_eq!(data.speed, 12.5);
        assert_eq!(data.position, [1.0, 2.0, 3.0]);
        assert_eq!(data.quaternion, QuaternionSample::new(0.0, 0.5, 0.0, 0.5));
        assert_eq!(data.g_force, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_parse_short_payload_fails() {
        let payload = telemetry_payload(0, 0, [0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            TelemetryData::parse(&payload[..40]),
            Err(LinkError::Protocol(_))
        ));
    }

    #[test]
    fn test_telemetry_into_reply() {
        let payload = telemetry_payload(0, 0, [0.0, 0.0, 0.0, 1.0]);
        let reply: TelemetryReply = TelemetryData::parse(&payload).unwrap().into();
        assert_eq!(
            reply,
            TelemetryReply::Sample {
                quaternion: QuaternionSample::IDENTITY,
                in_play: false
            }
        );
    }
}
