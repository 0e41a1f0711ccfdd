//! # remora-cert
//!
//! Trust and signing material for the Remora print bridge.
//!
//! The daemon only executes silent print jobs for clients it trusts. Trust
//! has two halves, both handled here:
//! - a PEM certificate presented once at connect time ([`CertificateStore`]);
//! - a signature over every privileged request, produced on daemon demand
//!   through the [`RequestSigner`] callback interface.
//!
//! Private key material never leaves this crate and is re-read from its
//! [`CredentialSource`] on every signing call.

mod crypto;
mod encoding;
mod error;
mod signer;
mod source;
mod store;

pub use encoding::hex_to_base64;
pub use error::{CertificateError, SigningError};
pub use signer::{DigestSigner, PemKeySigner, RequestSigner, SigningStrategy};
pub use source::{CredentialSource, FileSource, StaticSource};
pub use store::{Certificate, CertificateStore};
