//! Client error types
//!
//! All failures are terminal for the operation that raised them; nothing
//! here triggers an automatic retry except the bounded connect loop in
//! `connection`.

use thiserror::Error;

/// Connection lifecycle errors
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// All connect attempts failed
    #[error("print daemon unreachable: {0}")]
    Unreachable(String),

    /// A connect attempt is already in flight
    #[error("connection attempt already in progress")]
    AlreadyActive,

    /// Operation requires an established connection
    #[error("not connected to the print daemon")]
    NotConnected,

    /// Malformed or unexpected frame
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The connection dropped mid-operation
    #[error("connection closed: {0}")]
    Closed(String),
}

/// Printer discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("not connected to the print daemon")]
    NotConnected,

    /// Daemon or transport failure during the query. Distinct from an empty
    /// printer list, which is a valid result.
    #[error("printer query failed: {0}")]
    QueryFailed(String),
}

/// Print dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Pure precondition failure; no network activity happened.
    #[error("no printer selected")]
    NoPrinterSelected,

    #[error("not connected to the print daemon")]
    NotConnected,

    /// The daemon refused the job (including signature verification
    /// failure). Never retried automatically — POS printing must not
    /// silently duplicate jobs.
    #[error("print job rejected: {0}")]
    Rejected(String),

    /// The job could not be delivered at all.
    #[error("dispatch transport failure: {0}")]
    Transport(String),
}
