use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::store::{ContentStore, StoreError, StoredFile};
use crate::state::StoreSettings;

const GITHUB_API: &str = "https://api.github.com";

#[derive(Deserialize)]
struct FileEntry {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct DirEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Decode the base64 payload of a contents response. GitHub wraps it at 60 columns.
fn decode_content(encoded: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Content store backed by a branch of a GitHub repository.
pub struct GitHubStore {
    client: reqwest::Client,
    api_base: String,
    repo: String,
    branch: String,
    token: Option<String>,
}

impl GitHubStore {
    pub fn new(settings: &StoreSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create content store client")?;
        Ok(Self {
            client,
            api_base: GITHUB_API.to_string(),
            repo: settings.repo.clone(),
            branch: settings.branch.clone(),
            token: settings.token.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| StoreError::Decode(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode(format!("cannot-be-a-base URL: {}", self.api_base)))?
            .pop_if_empty()
            .push("repos")
            .extend(self.repo.split('/'))
            .push("contents")
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => req.header("Authorization", format!("token {}", token)),
            None => req,
        }
    }

    /// GET a contents path on the configured branch. `None` on 404.
    async fn get(&self, path: &str) -> Result<Option<reqwest::Response>, StoreError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        let resp = self.authorized(self.client.get(url)).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(resp)),
            status => Err(StoreError::Status(status, resp.text().await.unwrap_or_default())),
        }
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let Some(resp) = self.get(path).await? else {
            return Ok(None);
        };
        let entry: FileEntry = resp.json().await?;
        Ok(Some(StoredFile {
            content: decode_content(&entry.content)?,
            sha: entry.sha,
        }))
    }

    async fn write(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut body = serde_json::json!({
            "message": message,
            "content": STANDARD.encode(content),
            "branch": self.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = serde_json::json!(sha);
        }

        let url = self.contents_url(path)?;
        let resp = self.authorized(self.client.put(url)).json(&body).send().await?;
        match resp.status() {
            status if status.is_success() => {
                debug!(path, size = content.len(), "content store write committed");
                Ok(())
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(StoreError::Conflict(path.to_string()))
            }
            status => Err(StoreError::Status(status, resp.text().await.unwrap_or_default())),
        }
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let Some(resp) = self.get(dir).await? else {
            return Ok(vec![]);
        };
        let entries: Vec<DirEntry> = resp.json().await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == "file")
            .map(|e| e.path)
            .collect())
    }
}
