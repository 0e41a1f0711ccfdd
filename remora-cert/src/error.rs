//! Error types for trust and signing operations

use thiserror::Error;

/// Certificate loading errors
#[derive(Debug, Error)]
pub enum CertificateError {
    /// The certificate source could not be read
    #[error("certificate fetch failed: {0}")]
    FetchFailed(String),

    /// The retrieved text is not a PEM certificate
    #[error("invalid certificate format: {0}")]
    InvalidFormat(String),
}

/// Request signing errors
///
/// A failed signature is surfaced to the daemon as a refusal; it is never
/// replaced by an unsigned request.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The private key source could not be read
    #[error("private key unavailable: {0}")]
    KeyUnavailable(String),

    /// The retrieved text is not a PEM private key
    #[error("invalid private key format: {0}")]
    InvalidKeyFormat(String),

    /// Digest or signature computation failed
    #[error("signing algorithm failure: {0}")]
    AlgorithmFailure(String),
}
