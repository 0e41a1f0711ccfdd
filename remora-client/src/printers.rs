//! Printer discovery and selection.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use shared::message::{BridgeMessage, ErrorPayload, EventType, FindPrintersPayload, PrinterListPayload};

use crate::connection::BridgeConnection;
use crate::error::DiscoveryError;

/// Known printers plus the current selection.
///
/// The list is replaced wholesale on every [`refresh`](Self::refresh); the
/// selection survives a refresh only if the selected printer is still
/// present, otherwise it falls back to the first printer in the new list.
pub struct PrinterDirectory {
    conn: BridgeConnection,
    printers: Arc<RwLock<Vec<String>>>,
    selected: Arc<RwLock<Option<String>>>,
}

impl PrinterDirectory {
    pub fn new(conn: BridgeConnection) -> Self {
        Self {
            conn,
            printers: Arc::new(RwLock::new(Vec::new())),
            selected: Arc::new(RwLock::new(None)),
        }
    }

    /// Query the daemon and replace the printer list.
    ///
    /// An empty list is a valid answer; it clears the selection.
    pub async fn refresh(&self) -> Result<Vec<String>, DiscoveryError> {
        if !self.conn.is_connected() {
            return Err(DiscoveryError::NotConnected);
        }

        let request = BridgeMessage::request(EventType::FindPrinters, &FindPrintersPayload {})
            .map_err(|e| DiscoveryError::QueryFailed(e.to_string()))?;
        let reply = self
            .conn
            .request(request)
            .await
            .map_err(|e| DiscoveryError::QueryFailed(e.to_string()))?;

        let printers = match reply.event_type {
            EventType::PrinterList => {
                let payload: PrinterListPayload = reply
                    .payload_as()
                    .map_err(|e| DiscoveryError::QueryFailed(e.to_string()))?;
                payload.printers
            }
            EventType::Error => {
                let payload: ErrorPayload = reply
                    .payload_as()
                    .unwrap_or(ErrorPayload { reason: "printer query refused".to_string() });
                return Err(DiscoveryError::QueryFailed(payload.reason));
            }
            other => {
                return Err(DiscoveryError::QueryFailed(format!(
                    "unexpected reply to printer query: {other}"
                )));
            }
        };

        *self.printers.write().await = printers.clone();

        let mut selected = self.selected.write().await;
        let keep = selected
            .as_ref()
            .map(|name| printers.contains(name))
            .unwrap_or(false);
        if !keep {
            *selected = printers.first().cloned();
        }

        if printers.is_empty() {
            warn!("daemon reports no installed printers");
        } else {
            info!(count = printers.len(), selected = ?*selected, "printer list refreshed");
        }
        Ok(printers)
    }

    /// The most recently fetched printer list.
    pub async fn printers(&self) -> Vec<String> {
        self.printers.read().await.clone()
    }

    /// The currently selected printer, if any.
    pub async fn selected(&self) -> Option<String> {
        self.selected.read().await.clone()
    }

    /// Select a printer by name. The name must be in the current list.
    pub async fn select(&self, name: &str) -> Result<(), DiscoveryError> {
        let printers = self.printers.read().await;
        if !printers.iter().any(|p| p == name) {
            return Err(DiscoveryError::QueryFailed(format!(
                "unknown printer: {name}"
            )));
        }
        *self.selected.write().await = Some(name.to_string());
        Ok(())
    }
}
