//! Request signing.
//!
//! The daemon verifies the origin of every privileged request by handing the
//! client a challenge string to sign. [`RequestSigner`] is the injected
//! interface the connection calls back into when such a challenge arrives;
//! it may be invoked concurrently and holds no mutable state.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::crypto;
use crate::encoding::hex_to_base64;
use crate::error::SigningError;
use crate::source::CredentialSource;

/// Asynchronous signing callback invoked per daemon challenge.
///
/// Implementations must be re-entrant safe: challenges can arrive
/// concurrently over the connection's lifetime and each invocation is
/// independent.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Produce the base64 signature the daemon verifies for `payload`.
    async fn sign(&self, payload: &str) -> Result<String, SigningError>;
}

/// How request signatures are produced.
///
/// Both observed variants are kept as explicit, labeled strategies rather
/// than parallel code paths. `RsaSha256` is the production path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStrategy {
    /// Plain SHA-256 digest substituted for a real signature.
    ///
    /// Lower-trust/demo configuration only: the daemon must be set up to
    /// accept digests, and anyone can forge them.
    DigestOnly,
    /// RSA PKCS#1 v1.5 signature over SHA-256 with the configured private
    /// key.
    RsaSha256,
}

impl SigningStrategy {
    /// Build the signer for this strategy.
    ///
    /// The key source is only consulted by `RsaSha256`; the digest path is
    /// keyless by design.
    pub fn build(self, key_source: Arc<dyn CredentialSource>) -> Arc<dyn RequestSigner> {
        match self {
            SigningStrategy::DigestOnly => Arc::new(DigestSigner::new()),
            SigningStrategy::RsaSha256 => Arc::new(PemKeySigner::new(key_source)),
        }
    }
}

/// Keyless demo signer: SHA-256 hex digest, re-encoded as base64.
pub struct DigestSigner {
    _private: (),
}

impl DigestSigner {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for DigestSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestSigner for DigestSigner {
    async fn sign(&self, payload: &str) -> Result<String, SigningError> {
        warn!("digest-only signing in use; the daemon cannot verify request origin");

        let digest_hex = hex::encode(Sha256::digest(payload.as_bytes()));
        hex_to_base64(&digest_hex)
    }
}

/// Production signer backed by a PEM private key.
///
/// The key is fetched from its source on every call and dropped afterwards
/// — never cached across requests, so key rotation takes effect
/// immediately and a stale key can't outlive its source.
pub struct PemKeySigner {
    key_source: Arc<dyn CredentialSource>,
}

impl PemKeySigner {
    pub fn new(key_source: Arc<dyn CredentialSource>) -> Self {
        Self { key_source }
    }
}

#[async_trait]
impl RequestSigner for PemKeySigner {
    async fn sign(&self, payload: &str) -> Result<String, SigningError> {
        let key_pem = self.key_source.fetch().await.map_err(|e| {
            SigningError::KeyUnavailable(format!("{}: {}", self.key_source.describe(), e))
        })?;

        if !crypto::looks_like_private_key(&key_pem) {
            return Err(SigningError::InvalidKeyFormat(
                "missing PRIVATE KEY markers".to_string(),
            ));
        }

        let signature = crypto::rsa_sign_sha256(&key_pem, payload.as_bytes())?;
        debug!(sig_len = signature.len(), "request signed");

        Ok(STANDARD.encode(signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::pkcs8::EncodePrivateKey;
    use rsa::RsaPrivateKey;
    use std::io;

    struct FailingSource;

    #[async_trait]
    impl CredentialSource for FailingSource {
        async fn fetch(&self) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "backend down"))
        }

        fn describe(&self) -> String {
            "<failing>".to_string()
        }
    }

    #[tokio::test]
    async fn digest_signer_matches_known_sha256() {
        // SHA-256("hello") — verified against coreutils sha256sum.
        let digest_hex = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        let expected = STANDARD.encode(hex::decode(digest_hex).unwrap());

        let signer = DigestSigner::new();
        assert_eq!(signer.sign("hello").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn digest_signer_is_deterministic() {
        let signer = DigestSigner::new();
        let a = signer.sign("toSign").await.unwrap();
        let b = signer.sign("toSign").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn rsa_signature_verifies_with_ring() {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        let key_pem = key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap()
            .to_string();
        let public_der = key.to_public_key().to_pkcs1_der().unwrap();

        let signer = PemKeySigner::new(Arc::new(StaticSource::new(key_pem)));
        let payload = "print-request-challenge";
        let signature_b64 = signer.sign(payload).await.unwrap();
        let signature = STANDARD.decode(signature_b64).unwrap();

        let verifier = ring::signature::UnparsedPublicKey::new(
            &ring::signature::RSA_PKCS1_2048_8192_SHA256,
            public_der.as_bytes(),
        );
        verifier
            .verify(payload.as_bytes(), &signature)
            .expect("daemon-side verification");
    }

    #[tokio::test]
    async fn unreadable_key_source_is_key_unavailable() {
        let signer = PemKeySigner::new(Arc::new(FailingSource));
        let err = signer.sign("payload").await.unwrap_err();
        assert!(matches!(err, SigningError::KeyUnavailable(_)));
    }

    #[tokio::test]
    async fn non_key_text_is_invalid_format() {
        let signer = PemKeySigner::new(Arc::new(StaticSource::new("<html>oops</html>")));
        let err = signer.sign("payload").await.unwrap_err();
        assert!(matches!(err, SigningError::InvalidKeyFormat(_)));
    }

    #[tokio::test]
    async fn strategy_selects_signer() {
        let source: Arc<dyn CredentialSource> = Arc::new(StaticSource::new(""));
        // Digest strategy works without usable key material.
        let digest = SigningStrategy::DigestOnly.build(Arc::clone(&source));
        assert!(digest.sign("x").await.is_ok());

        let rsa = SigningStrategy::RsaSha256.build(source);
        assert!(matches!(
            rsa.sign("x").await.unwrap_err(),
            SigningError::InvalidKeyFormat(_)
        ));
    }
}
