//! Transport abstraction for the daemon connection.
//!
//! Three implementations: plain TCP (loopback daemons), TLS (everything
//! else), and an in-memory duplex for tests and in-process daemon doubles.
//! Dialing goes through the [`Dialer`] trait so connection logic can be
//! exercised without a network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustls_pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, info};
use uuid::Uuid;

use shared::message::{BridgeMessage, EventType};

use crate::config::{ConnectOptions, TransportMode};
use crate::error::ConnectionError;

/// Timeout for opening the TCP connection. Connect time is the only place
/// the client enforces a deadline.
const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Framed message transport to the daemon
#[async_trait]
pub trait Transport: Send + Sync {
    async fn read_message(&self) -> Result<BridgeMessage, ConnectionError>;
    async fn write_message(&self, msg: &BridgeMessage) -> Result<(), ConnectionError>;
    async fn close(&self) -> Result<(), ConnectionError>;
}

// ==================== Frame I/O ====================

async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<BridgeMessage, ConnectionError> {
    let mut type_buf = [0u8; 1];
    reader
        .read_exact(&mut type_buf)
        .await
        .map_err(|e| ConnectionError::Closed(e.to_string()))?;
    let event_type = EventType::try_from(type_buf[0])
        .map_err(|e| ConnectionError::Protocol(e.to_string()))?;

    let mut id_buf = [0u8; 16];
    reader
        .read_exact(&mut id_buf)
        .await
        .map_err(|e| ConnectionError::Closed(e.to_string()))?;
    let request_id = Uuid::from_bytes(id_buf);

    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| ConnectionError::Closed(e.to_string()))?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| ConnectionError::Closed(e.to_string()))?;

    Ok(BridgeMessage { event_type, request_id, payload })
}

async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg: &BridgeMessage,
) -> Result<(), ConnectionError> {
    writer
        .write_all(&msg.encode())
        .await
        .map_err(|e| ConnectionError::Closed(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| ConnectionError::Closed(e.to_string()))
}

// ==================== TCP Transport ====================

/// Plain TCP transport (loopback daemons only)
#[derive(Debug)]
pub struct TcpTransport {
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, ConnectionError> {
        let stream = tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ConnectionError::Unreachable(format!("{addr}: connect timed out")))?
            .map_err(|e| ConnectionError::Unreachable(format!("{addr}: {e}")))?;
        let (reader, writer) = stream.into_split();
        debug!(addr, "plain TCP transport open");
        Ok(Self { reader: Mutex::new(reader), writer: Mutex::new(writer) })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_message(&self) -> Result<BridgeMessage, ConnectionError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader).await
    }

    async fn write_message(&self, msg: &BridgeMessage) -> Result<(), ConnectionError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, msg).await
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        let mut writer = self.writer.lock().await;
        writer
            .shutdown()
            .await
            .map_err(|e| ConnectionError::Closed(e.to_string()))
    }
}

// ==================== TLS Transport ====================

/// TLS transport for non-loopback daemons
pub struct TlsTransport {
    reader: Mutex<tokio::io::ReadHalf<TlsStream<TcpStream>>>,
    writer: Mutex<tokio::io::WriteHalf<TlsStream<TcpStream>>>,
}

impl TlsTransport {
    /// Open a TLS connection to `addr`, verifying the daemon against the
    /// webpki root set plus `extra_root_pem` when provided (self-hosted
    /// daemon certificates).
    pub async fn connect(
        addr: &str,
        domain: &str,
        extra_root_pem: Option<&str>,
    ) -> Result<Self, ConnectionError> {
        let mut root_store = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        if let Some(pem) = extra_root_pem {
            let mut pem_reader = std::io::Cursor::new(pem.as_bytes());
            for cert in rustls_pemfile::certs(&mut pem_reader) {
                let cert = cert.map_err(|e| {
                    ConnectionError::Protocol(format!("invalid daemon root certificate: {e}"))
                })?;
                root_store.add(cert).map_err(|e| {
                    ConnectionError::Protocol(format!("unusable daemon root certificate: {e}"))
                })?;
            }
        }

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(config));

        let stream = tokio::time::timeout(DIAL_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ConnectionError::Unreachable(format!("{addr}: connect timed out")))?
            .map_err(|e| ConnectionError::Unreachable(format!("{addr}: {e}")))?;

        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|e| ConnectionError::Protocol(format!("invalid server name: {e}")))?;

        let stream = connector
            .connect(server_name, stream)
            .await
            .map_err(|e| ConnectionError::Unreachable(format!("TLS handshake failed: {e}")))?;

        let (reader, writer) = tokio::io::split(stream);
        info!(addr, "TLS transport open");
        Ok(Self { reader: Mutex::new(reader), writer: Mutex::new(writer) })
    }
}

#[async_trait]
impl Transport for TlsTransport {
    async fn read_message(&self) -> Result<BridgeMessage, ConnectionError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader).await
    }

    async fn write_message(&self, msg: &BridgeMessage) -> Result<(), ConnectionError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, msg).await
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        let mut writer = self.writer.lock().await;
        writer
            .shutdown()
            .await
            .map_err(|e| ConnectionError::Closed(e.to_string()))
    }
}

// ==================== Memory Transport ====================

/// In-memory duplex transport (tests and in-process daemon doubles)
pub struct MemoryTransport {
    tx: mpsc::UnboundedSender<BridgeMessage>,
    rx: Mutex<mpsc::UnboundedReceiver<BridgeMessage>>,
}

impl MemoryTransport {
    /// Create a connected pair: what one side writes, the other reads.
    pub fn pair() -> (MemoryTransport, MemoryTransport) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            MemoryTransport { tx: a_tx, rx: Mutex::new(b_rx) },
            MemoryTransport { tx: b_tx, rx: Mutex::new(a_rx) },
        )
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_message(&self) -> Result<BridgeMessage, ConnectionError> {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| ConnectionError::Closed("peer hung up".to_string()))
    }

    async fn write_message(&self, msg: &BridgeMessage) -> Result<(), ConnectionError> {
        self.tx
            .send(msg.clone())
            .map_err(|_| ConnectionError::Closed("peer hung up".to_string()))
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        Ok(())
    }
}

// ==================== Dialer ====================

/// Opens a transport for the given options.
///
/// Injected into the connection so tests can count dial attempts and hand
/// out in-memory transports.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, options: &ConnectOptions) -> Result<Box<dyn Transport>, ConnectionError>;
}

#[async_trait]
impl<T: Dialer + ?Sized> Dialer for Arc<T> {
    async fn dial(&self, options: &ConnectOptions) -> Result<Box<dyn Transport>, ConnectionError> {
        (**self).dial(options).await
    }
}

/// Production dialer: plain TCP for loopback, TLS otherwise.
#[derive(Debug, Clone, Default)]
pub struct TcpDialer {
    /// PEM root certificate(s) to trust for the daemon's TLS endpoint, in
    /// addition to the webpki set.
    extra_root_pem: Option<String>,
}

impl TcpDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_root(mut self, pem: impl Into<String>) -> Self {
        self.extra_root_pem = Some(pem.into());
        self
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, options: &ConnectOptions) -> Result<Box<dyn Transport>, ConnectionError> {
        let endpoint = options.endpoint();
        match options.transport_mode() {
            TransportMode::Plain => {
                let transport = TcpTransport::connect(&endpoint).await?;
                Ok(Box::new(transport))
            }
            TransportMode::Tls => {
                let transport =
                    TlsTransport::connect(&endpoint, &options.host, self.extra_root_pem.as_deref())
                        .await?;
                Ok(Box::new(transport))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::FindPrintersPayload;

    #[tokio::test]
    async fn memory_pair_round_trip() {
        let (client, daemon) = MemoryTransport::pair();

        let msg = BridgeMessage::request(EventType::FindPrinters, &FindPrintersPayload {}).unwrap();
        client.write_message(&msg).await.unwrap();

        let received = daemon.read_message().await.unwrap();
        assert_eq!(received, msg);
    }

    #[tokio::test]
    async fn dropped_peer_closes_reads() {
        let (client, daemon) = MemoryTransport::pair();
        drop(daemon);
        let err = client.read_message().await.unwrap_err();
        assert!(matches!(err, ConnectionError::Closed(_)));
    }

    #[tokio::test]
    async fn tcp_frame_round_trip() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();
            let transport = TcpTransport { reader: Mutex::new(reader), writer: Mutex::new(writer) };
            let msg = transport.read_message().await.unwrap();
            transport.write_message(&msg).await.unwrap();
        });

        let client = TcpTransport::connect(&addr.to_string()).await.unwrap();
        let msg = BridgeMessage::request(EventType::FindPrinters, &FindPrintersPayload {}).unwrap();
        client.write_message(&msg).await.unwrap();
        let echoed = client.read_message().await.unwrap();
        assert_eq!(echoed, msg);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unreachable() {
        // Reserved TEST-NET-1 address: connect fails fast or times out.
        let err = TcpTransport::connect("127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, ConnectionError::Unreachable(_)));
    }
}
