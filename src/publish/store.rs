use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Status error: {1} (Status {0})")]
    Status(reqwest::StatusCode, String),
    /// The write raced another writer or carried a stale sha.
    #[error("Conflict writing {0}")]
    Conflict(String),
    #[error("Malformed store response: {0}")]
    Decode(String),
}

/// A file read back from the store, with the revision token needed to overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub sha: String,
    pub content: Vec<u8>,
}

/// Remote file store keyed by path. Paths are relative, `/`-separated.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// `Ok(None)` when the path does not exist.
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Create or overwrite `path`. Overwrites must pass the current sha.
    async fn write(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Paths of the files directly under `dir`. Empty when it does not exist.
    async fn list(&self, dir: &str) -> Result<Vec<String>, StoreError>;
}
