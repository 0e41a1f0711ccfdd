//! # remora-client
//!
//! Client for the Remora print bridge daemon.
//!
//! Workflow:
//! 1. load the trust certificate ([`remora_cert::CertificateStore`]);
//! 2. build a signer ([`remora_cert::SigningStrategy`]);
//! 3. [`BridgeConnection::connect`] with [`ConnectOptions`];
//! 4. discover printers through [`PrinterDirectory`];
//! 5. encode a receipt with `remora-printer` and submit it through
//!    [`PrintDispatcher`].
//!
//! The connection answers the daemon's signing challenges on its own;
//! callers never see them.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod printers;
pub mod transport;

pub use config::{ConnectOptions, TransportMode};
pub use connection::{BridgeConnection, ConnectionState};
pub use dispatch::{PrintDispatcher, PrintJob};
pub use error::{ConnectionError, DiscoveryError, DispatchError};
pub use printers::PrinterDirectory;
pub use transport::{Dialer, MemoryTransport, TcpDialer, Transport};
