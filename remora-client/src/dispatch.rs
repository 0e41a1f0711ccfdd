//! Print job dispatch.
//!
//! Takes an encoded command stream, wraps it with a job configuration and
//! target printer, and submits it to the daemon. Dispatch never retries:
//! a refused or lost job surfaces as an error and the decision to resend
//! belongs to the caller.

use tracing::{info, warn};

use remora_printer::CommandStream;
use shared::job::JobConfig;
use shared::message::{
    BridgeMessage, ErrorPayload, EventType, PrintAckPayload, PrintRequestPayload,
};

use crate::connection::BridgeConnection;
use crate::error::DispatchError;

/// A fully prepared print job.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub config: JobConfig,
    pub stream: CommandStream,
}

impl PrintJob {
    pub fn new(config: JobConfig, stream: CommandStream) -> Self {
        Self { config, stream }
    }
}

/// Submits print jobs over an established connection.
pub struct PrintDispatcher {
    conn: BridgeConnection,
}

impl PrintDispatcher {
    pub fn new(conn: BridgeConnection) -> Self {
        Self { conn }
    }

    /// Send `job` to `printer` and wait for the daemon's verdict.
    ///
    /// Preconditions are checked before anything touches the network: an
    /// empty printer name fails with [`DispatchError::NoPrinterSelected`]
    /// and a dead connection with [`DispatchError::NotConnected`].
    pub async fn send(&self, printer: &str, job: &PrintJob) -> Result<(), DispatchError> {
        if printer.is_empty() {
            return Err(DispatchError::NoPrinterSelected);
        }
        if !self.conn.is_connected() {
            return Err(DispatchError::NotConnected);
        }

        let payload = PrintRequestPayload {
            printer: printer.to_string(),
            config: job.config.clone(),
            data: job.stream.wire_fragments(),
        };
        let request = BridgeMessage::request(EventType::PrintRequest, &payload)
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        info!(
            printer,
            job = %job.config.job_name,
            fragments = payload.data.len(),
            "submitting print job"
        );

        let reply = self
            .conn
            .request(request)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        match reply.event_type {
            EventType::PrintAck => {
                let _: PrintAckPayload = reply
                    .payload_as()
                    .map_err(|e| DispatchError::Transport(e.to_string()))?;
                info!(printer, "print job accepted");
                Ok(())
            }
            EventType::Error => {
                let payload: ErrorPayload = reply
                    .payload_as()
                    .unwrap_or(ErrorPayload { reason: "print job refused".to_string() });
                warn!(printer, reason = %payload.reason, "print job rejected");
                Err(DispatchError::Rejected(payload.reason))
            }
            other => Err(DispatchError::Transport(format!(
                "unexpected reply to print request: {other}"
            ))),
        }
    }
}
