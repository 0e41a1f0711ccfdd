//! Bridge protocol message types.
//!
//! Every exchange with the daemon is a framed message:
//! event type (1 byte), request id (16 bytes), payload length (4 bytes LE),
//! JSON payload. Responses reuse the id of the request they answer;
//! `SignChallenge` frames carry a daemon-chosen id which the matching
//! `SignResponse` echoes back.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Protocol version negotiated in the Hello handshake.
pub const PROTOCOL_VERSION: u16 = 1;

/// Fixed frame header size: type (1) + request id (16) + payload length (4).
pub const FRAME_HEADER_LEN: usize = 21;

/// Bridge protocol event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Trust handshake (client -> daemon, carries the certificate)
    Hello = 0,
    /// Handshake accepted (daemon -> client)
    HelloAck = 1,
    /// Signing challenge (daemon -> client, out-of-band)
    SignChallenge = 2,
    /// Signature over a challenge (client -> daemon)
    SignResponse = 3,
    /// Printer discovery request
    FindPrinters = 4,
    /// Printer discovery result
    PrinterList = 5,
    /// Print job submission
    PrintRequest = 6,
    /// Print job accepted
    PrintAck = 7,
    /// Request refused or failed daemon-side
    Error = 8,
}

impl TryFrom<u8> for EventType {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, FrameError> {
        match value {
            0 => Ok(EventType::Hello),
            1 => Ok(EventType::HelloAck),
            2 => Ok(EventType::SignChallenge),
            3 => Ok(EventType::SignResponse),
            4 => Ok(EventType::FindPrinters),
            5 => Ok(EventType::PrinterList),
            6 => Ok(EventType::PrintRequest),
            7 => Ok(EventType::PrintAck),
            8 => Ok(EventType::Error),
            other => Err(FrameError::UnknownEventType(other)),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Hello => write!(f, "hello"),
            EventType::HelloAck => write!(f, "hello_ack"),
            EventType::SignChallenge => write!(f, "sign_challenge"),
            EventType::SignResponse => write!(f, "sign_response"),
            EventType::FindPrinters => write!(f, "find_printers"),
            EventType::PrinterList => write!(f, "printer_list"),
            EventType::PrintRequest => write!(f, "print_request"),
            EventType::PrintAck => write!(f, "print_ack"),
            EventType::Error => write!(f, "error"),
        }
    }
}

/// Framing / payload errors
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("unknown event type: {0}")]
    UnknownEventType(u8),

    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A single framed protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeMessage {
    pub event_type: EventType,
    pub request_id: Uuid,
    /// JSON-serialized payload
    pub payload: Vec<u8>,
}

impl BridgeMessage {
    /// Create a request message with a fresh request id.
    pub fn request<T: Serialize>(event_type: EventType, data: &T) -> Result<Self, FrameError> {
        Ok(Self {
            event_type,
            request_id: Uuid::new_v4(),
            payload: serde_json::to_vec(data)?,
        })
    }

    /// Create a response message reusing the id of the request it answers.
    pub fn response<T: Serialize>(
        event_type: EventType,
        request_id: Uuid,
        data: &T,
    ) -> Result<Self, FrameError> {
        Ok(Self {
            event_type,
            request_id,
            payload: serde_json::to_vec(data)?,
        })
    }

    /// Deserialize the payload into a typed value.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, FrameError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }

    /// Encode header + payload into a single byte buffer for transmission.
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(FRAME_HEADER_LEN + self.payload.len());
        data.push(self.event_type as u8);
        data.extend_from_slice(self.request_id.as_bytes());
        data.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&self.payload);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trip() {
        for raw in 0u8..=8 {
            let et = EventType::try_from(raw).expect("valid event type");
            assert_eq!(et as u8, raw);
        }
        assert!(EventType::try_from(9).is_err());
    }

    #[test]
    fn encode_layout() {
        let msg = BridgeMessage::request(
            EventType::FindPrinters,
            &payload::FindPrintersPayload {},
        )
        .unwrap();
        let bytes = msg.encode();

        assert_eq!(bytes[0], EventType::FindPrinters as u8);
        assert_eq!(&bytes[1..17], msg.request_id.as_bytes());
        let len = u32::from_le_bytes(bytes[17..21].try_into().unwrap()) as usize;
        assert_eq!(len, msg.payload.len());
        assert_eq!(&bytes[FRAME_HEADER_LEN..], &msg.payload[..]);
    }

    #[test]
    fn response_keeps_request_id() {
        let req = BridgeMessage::request(EventType::FindPrinters, &FindPrintersPayload {}).unwrap();
        let resp = BridgeMessage::response(
            EventType::PrinterList,
            req.request_id,
            &PrinterListPayload { printers: vec![] },
        )
        .unwrap();
        assert_eq!(resp.request_id, req.request_id);
    }
}
