use serde::{Deserialize, Serialize};

/// Readable representation of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Plain text, fed to the generative service.
    pub content: String,
    /// Sanitized markup kept by the readability pass.
    pub html: String,
}
