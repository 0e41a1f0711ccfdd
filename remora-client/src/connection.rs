//! Persistent daemon connection.
//!
//! [`BridgeConnection`] owns the transport, runs the trust handshake,
//! multiplexes request/response pairs over it, and answers the daemon's
//! out-of-band signing challenges. Cloning the handle shares the same
//! underlying connection.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use remora_cert::{Certificate, RequestSigner};
use shared::message::{
    BridgeMessage, ErrorPayload, EventType, HelloAckPayload, HelloPayload, SignChallengePayload,
    SignResponsePayload, PROTOCOL_VERSION,
};

use crate::config::ConnectOptions;
use crate::error::ConnectionError;
use crate::transport::{Dialer, Transport};

/// Connection lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// A connect attempt (including its retry loop) is in flight.
    Connecting,
    Connected,
    /// The connect or the live link failed; a fresh `connect` is required.
    Failed(String),
}

type PendingMap = Arc<Mutex<HashMap<Uuid, oneshot::Sender<BridgeMessage>>>>;

struct Link {
    transport: Arc<dyn Transport>,
    reader: JoinHandle<()>,
}

impl Drop for Link {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

type SharedState = Arc<std::sync::Mutex<ConnectionState>>;

struct Inner {
    certificate: Certificate,
    signer: Arc<dyn RequestSigner>,
    dialer: Box<dyn Dialer>,
    state: SharedState,
    pending: PendingMap,
    link: Mutex<Option<Link>>,
}

/// Handle to the daemon connection. Cheap to clone.
#[derive(Clone)]
pub struct BridgeConnection {
    inner: Arc<Inner>,
}

impl BridgeConnection {
    pub fn new(
        certificate: Certificate,
        signer: Arc<dyn RequestSigner>,
        dialer: Box<dyn Dialer>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                certificate,
                signer,
                dialer,
                state: Arc::new(std::sync::Mutex::new(ConnectionState::Disconnected)),
                pending: Arc::new(Mutex::new(HashMap::new())),
                link: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.lock().expect("state lock poisoned").clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Connect to the daemon, retrying up to `options.retries` extra times.
    ///
    /// Connecting while already connected is a no-op. A second `connect`
    /// racing a first one fails with [`ConnectionError::AlreadyActive`]. A
    /// `disconnect` racing the attempt wins: the fresh link is torn down
    /// and the connect reports [`ConnectionError::Closed`].
    pub async fn connect(&self, options: &ConnectOptions) -> Result<(), ConnectionError> {
        {
            let mut state = self.inner.state.lock().expect("state lock poisoned");
            match *state {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Connecting => return Err(ConnectionError::AlreadyActive),
                ConnectionState::Disconnected | ConnectionState::Failed(_) => {
                    *state = ConnectionState::Connecting;
                }
            }
        }

        match self.connect_inner(options).await {
            Ok(()) => {
                let committed = {
                    let mut state = self.inner.state.lock().expect("state lock poisoned");
                    if *state == ConnectionState::Connecting {
                        *state = ConnectionState::Connected;
                        true
                    } else {
                        false
                    }
                };
                if !committed {
                    // disconnect() won the race; tear the fresh link down
                    let link = self.inner.link.lock().await.take();
                    if let Some(link) = link {
                        link.reader.abort();
                        if let Err(e) = link.transport.close().await {
                            debug!(error = %e, "transport close");
                        }
                    }
                    return Err(ConnectionError::Closed(
                        "disconnected during connect".to_string(),
                    ));
                }
                info!(endpoint = %options.endpoint(), "connected to print daemon");
                Ok(())
            }
            Err(e) => {
                let mut state = self.inner.state.lock().expect("state lock poisoned");
                if *state == ConnectionState::Connecting {
                    *state = ConnectionState::Failed(e.to_string());
                }
                Err(e)
            }
        }
    }

    async fn connect_inner(&self, options: &ConnectOptions) -> Result<(), ConnectionError> {
        let attempts = options.retries + 1;
        let mut last_err = None;

        for attempt in 1..=attempts {
            debug!(attempt, attempts, endpoint = %options.endpoint(), "dialing print daemon");
            match self.inner.dialer.dial(options).await {
                Ok(transport) => {
                    let transport: Arc<dyn Transport> = Arc::from(transport);
                    self.handshake(&transport).await?;

                    let reader = tokio::spawn(read_loop(
                        transport.clone(),
                        self.inner.pending.clone(),
                        self.inner.signer.clone(),
                        self.inner.state.clone(),
                    ));
                    *self.inner.link.lock().await = Some(Link { transport, reader });
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "connect attempt failed");
                    last_err = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(options.retry_delay).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ConnectionError::Unreachable("no connect attempts were made".to_string())
        }))
    }

    /// Trust handshake: present the certificate, await the daemon's ack.
    async fn handshake(&self, transport: &Arc<dyn Transport>) -> Result<(), ConnectionError> {
        let hello = BridgeMessage::request(
            EventType::Hello,
            &HelloPayload {
                version: PROTOCOL_VERSION,
                certificate: self.inner.certificate.pem().to_string(),
            },
        )
        .map_err(|e| ConnectionError::Protocol(e.to_string()))?;

        transport.write_message(&hello).await?;
        let reply = transport.read_message().await?;

        match reply.event_type {
            EventType::HelloAck => {
                if reply.request_id != hello.request_id {
                    return Err(ConnectionError::Protocol(
                        "handshake ack does not match hello".to_string(),
                    ));
                }
                let ack: HelloAckPayload = reply
                    .payload_as()
                    .map_err(|e| ConnectionError::Protocol(e.to_string()))?;
                if ack.version != PROTOCOL_VERSION {
                    return Err(ConnectionError::Protocol(format!(
                        "daemon speaks protocol version {}, client speaks {}",
                        ack.version, PROTOCOL_VERSION
                    )));
                }
                debug!("trust handshake accepted");
                Ok(())
            }
            EventType::Error => {
                let payload: ErrorPayload = reply
                    .payload_as()
                    .unwrap_or(ErrorPayload { reason: "handshake rejected".to_string() });
                Err(ConnectionError::Protocol(format!(
                    "daemon rejected handshake: {}",
                    payload.reason
                )))
            }
            other => Err(ConnectionError::Protocol(format!(
                "unexpected handshake reply: {other}"
            ))),
        }
    }

    /// Send a request and wait for the matching response frame.
    pub async fn request(&self, msg: BridgeMessage) -> Result<BridgeMessage, ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::NotConnected);
        }
        let transport = {
            let link = self.inner.link.lock().await;
            match link.as_ref() {
                Some(link) => link.transport.clone(),
                None => return Err(ConnectionError::NotConnected),
            }
        };

        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().await.insert(msg.request_id, tx);

        if let Err(e) = transport.write_message(&msg).await {
            self.inner.pending.lock().await.remove(&msg.request_id);
            return Err(e);
        }

        rx.await
            .map_err(|_| ConnectionError::Closed("connection lost while waiting".to_string()))
    }

    /// Tear down the connection. Safe to call in any state.
    pub async fn disconnect(&self) {
        let link = self.inner.link.lock().await.take();
        if let Some(link) = link {
            link.reader.abort();
            if let Err(e) = link.transport.close().await {
                debug!(error = %e, "transport close");
            }
        }
        self.inner.pending.lock().await.clear();
        *self.inner.state.lock().expect("state lock poisoned") = ConnectionState::Disconnected;
        info!("disconnected from print daemon");
    }
}

/// Pump incoming frames: signing challenges are answered in place, every
/// other frame is routed to the request that is waiting on its id.
async fn read_loop(
    transport: Arc<dyn Transport>,
    pending: PendingMap,
    signer: Arc<dyn RequestSigner>,
    state: SharedState,
) {
    loop {
        let msg = match transport.read_message().await {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "read loop terminated");
                pending.lock().await.clear();
                let mut state = state.lock().expect("state lock poisoned");
                if *state == ConnectionState::Connected {
                    *state = ConnectionState::Failed(e.to_string());
                }
                return;
            }
        };

        match msg.event_type {
            EventType::SignChallenge => {
                let transport = transport.clone();
                let signer = signer.clone();
                tokio::spawn(async move {
                    answer_challenge(&*transport, &*signer, &msg).await;
                });
            }
            _ => {
                let waiter = pending.lock().await.remove(&msg.request_id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(msg);
                    }
                    None => {
                        warn!(
                            event = %msg.event_type,
                            request_id = %msg.request_id,
                            "frame for unknown request dropped"
                        );
                    }
                }
            }
        }
    }
}

/// Sign the challenge text and reply on the challenge's id. A signing
/// failure is reported back as an error frame so the daemon can refuse the
/// request instead of hanging.
async fn answer_challenge(
    transport: &dyn Transport,
    signer: &dyn RequestSigner,
    challenge: &BridgeMessage,
) {
    let payload: SignChallengePayload = match challenge.payload_as() {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "malformed signing challenge");
            return;
        }
    };

    let reply = match signer.sign(&payload.data).await {
        Ok(signature) => BridgeMessage::response(
            EventType::SignResponse,
            challenge.request_id,
            &SignResponsePayload { signature },
        ),
        Err(e) => {
            error!(error = %e, "signing failed");
            BridgeMessage::response(
                EventType::Error,
                challenge.request_id,
                &ErrorPayload { reason: format!("signing failed: {e}") },
            )
        }
    };

    match reply {
        Ok(reply) => {
            if let Err(e) = transport.write_message(&reply).await {
                error!(error = %e, "could not deliver signing response");
            }
        }
        Err(e) => error!(error = %e, "could not encode signing response"),
    }
}
