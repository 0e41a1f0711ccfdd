//! Credential sources.
//!
//! Certificates and private keys are retrieved from well-known locations
//! served by the hosting environment. The source is abstracted so that a
//! production deployment can substitute a remote signing service for the
//! local key fetch without touching the signer itself.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// A read-only source of PEM credential text.
///
/// `fetch` is called once per use — results are never cached by callers, so
/// rotating the underlying material takes effect on the next operation.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> io::Result<String>;

    /// Human-readable location for logs and error detail.
    fn describe(&self) -> String;
}

/// Credential file on the local filesystem (e.g. `certificate.pem`,
/// `private-key.pem` next to the application).
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialSource for FileSource {
    async fn fetch(&self) -> io::Result<String> {
        // Re-read on every call; no caching.
        tokio::fs::read_to_string(&self.path).await
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory credential text (tests and embedded deployments).
#[derive(Debug, Clone)]
pub struct StaticSource {
    text: String,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl CredentialSource for StaticSource {
    async fn fetch(&self) -> io::Result<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        "<static>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn file_source_reads_fresh_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first").unwrap();

        let source = FileSource::new(file.path());
        assert_eq!(source.fetch().await.unwrap(), "first");

        // Rotation is picked up on the next fetch.
        let mut handle = file.reopen().unwrap();
        handle.set_len(0).unwrap();
        write!(handle, "second").unwrap();
        assert_eq!(source.fetch().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = FileSource::new("/nonexistent/credential.pem");
        assert!(source.fetch().await.is_err());
    }
}
