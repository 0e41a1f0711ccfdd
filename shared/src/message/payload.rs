//! Typed payloads for bridge protocol messages.

use serde::{Deserialize, Serialize};

use crate::job::JobConfig;

// ==================== Handshake ====================

/// Trust handshake (client -> daemon)
///
/// Carries the PEM certificate the daemon uses to recognize this client
/// as trusted for silent printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    pub version: u16,
    pub certificate: String,
}

/// Handshake accepted (daemon -> client)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloAckPayload {
    pub version: u16,
}

// ==================== Signing ====================

/// Signing challenge (daemon -> client)
///
/// Sent out-of-band whenever the daemon needs to verify the origin of a
/// privileged request. The client must answer with a `SignResponsePayload`
/// on the same request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignChallengePayload {
    /// The exact request text to sign.
    pub data: String,
}

/// Signature over a challenge (client -> daemon)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResponsePayload {
    /// Base64-encoded signature bytes.
    pub signature: String,
}

// ==================== Printer Discovery ====================

/// Printer discovery request (client -> daemon)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindPrintersPayload {}

/// Printer discovery result (daemon -> client)
///
/// Printer names in the daemon's reported order. An empty list is a valid
/// "no printers installed" answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterListPayload {
    pub printers: Vec<String>,
}

// ==================== Printing ====================

/// Print job submission (client -> daemon)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintRequestPayload {
    /// Target printer name exactly as reported by discovery.
    pub printer: String,
    /// Rendering/behavior options for this job.
    pub config: JobConfig,
    /// Raw command fragments; the daemon concatenates them in order before
    /// transmission to the printer.
    pub data: Vec<String>,
}

/// Print job accepted (daemon -> client)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintAckPayload {}

// ==================== Errors ====================

/// Request refused or failed daemon-side (daemon -> client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub reason: String,
}
