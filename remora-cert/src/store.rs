//! Certificate loading and validation.

use tracing::{info, warn};

use crate::error::CertificateError;
use crate::source::CredentialSource;

const CERT_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const CERT_END: &str = "-----END CERTIFICATE-----";

/// An opaque PEM certificate, validated at construction.
///
/// Loaded once per session and held for the life of the connection; the
/// connect handshake presents it to the daemon as trust material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pem: String,
}

impl Certificate {
    /// Validate PEM framing and wrap the text.
    ///
    /// Content without the standard certificate delimiters is rejected and
    /// must never be installed as trust material.
    pub fn from_pem(pem: impl Into<String>) -> Result<Self, CertificateError> {
        let pem = pem.into();
        if !pem.contains(CERT_BEGIN) || !pem.contains(CERT_END) {
            warn!("rejecting certificate text without PEM delimiters");
            return Err(CertificateError::InvalidFormat(
                "missing BEGIN/END CERTIFICATE markers".to_string(),
            ));
        }
        Ok(Self { pem })
    }

    /// The full PEM text, exactly as fetched.
    pub fn pem(&self) -> &str {
        &self.pem
    }
}

/// Loads the trust certificate from its configured source.
pub struct CertificateStore;

impl CertificateStore {
    /// Fetch and validate the certificate.
    pub async fn load(source: &dyn CredentialSource) -> Result<Certificate, CertificateError> {
        let text = source.fetch().await.map_err(|e| {
            CertificateError::FetchFailed(format!("{}: {}", source.describe(), e))
        })?;

        let cert = Certificate::from_pem(text)?;
        info!(source = %source.describe(), "trust certificate loaded");
        Ok(cert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FileSource, StaticSource};

    const SAMPLE_CERT: &str = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUfake\n-----END CERTIFICATE-----\n";

    #[tokio::test]
    async fn loads_well_formed_certificate() {
        let source = StaticSource::new(SAMPLE_CERT);
        let cert = CertificateStore::load(&source).await.unwrap();
        assert_eq!(cert.pem(), SAMPLE_CERT);
    }

    #[tokio::test]
    async fn rejects_text_without_markers() {
        let source = StaticSource::new("<html>404 not found</html>");
        let err = CertificateStore::load(&source).await.unwrap_err();
        assert!(matches!(err, CertificateError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn rejects_truncated_certificate() {
        let source = StaticSource::new("-----BEGIN CERTIFICATE-----\nMIIBszCC");
        let err = CertificateStore::load(&source).await.unwrap_err();
        assert!(matches!(err, CertificateError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn fetch_failure_is_distinguished() {
        let source = FileSource::new("/nonexistent/certificate.pem");
        let err = CertificateStore::load(&source).await.unwrap_err();
        assert!(matches!(err, CertificateError::FetchFailed(_)));
    }
}
