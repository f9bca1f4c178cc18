pub mod github;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{ToolError, ToolResult};

pub use github::GitHubStore;
pub use store::{ContentStore, StoreError};

const METADATA_DIR: &str = "metadata";

/// Per-user record written next to every published widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedToolMetadata {
    pub user_id: String,
    pub filename: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn metadata_path(user_id: &str, path: &str) -> String {
    format!("{}/{}/{}.json", METADATA_DIR, user_id, path)
}

/// Normalize a requested filename into a store path ending in `.html`.
///
/// Widgets live flat at the store root, matching the one-level metadata
/// listing in [`Publisher::recent`].
fn widget_path(filename: &str) -> ToolResult<String> {
    let name = filename.trim();
    if name.is_empty() {
        return Err(ToolError::InvalidInput("Missing filename or html".to_string()));
    }
    if name.contains(['/', '\\']) || name == ".." {
        return Err(ToolError::InvalidInput(format!("Invalid filename: {}", name)));
    }
    if name.ends_with(".html") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.html", name))
    }
}

/// Writes widgets and their metadata to the content store and lists a
/// member's prior artifacts.
pub struct Publisher {
    store: Arc<dyn ContentStore>,
    public_base_url: String,
}

impl Publisher {
    pub fn new(store: Arc<dyn ContentStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Publish `html` as `filename` for `user_id`. Returns the public URL.
    pub async fn publish(&self, user_id: &str, filename: &str, html: &str) -> ToolResult<String> {
        if html.trim().is_empty() {
            return Err(ToolError::InvalidInput("Missing filename or html".to_string()));
        }
        let path = widget_path(filename)?;

        let existing_sha = self.store.read(&path).await?.map(|f| f.sha);
        self.store
            .write(
                &path,
                html.as_bytes(),
                &format!("Publish tool: {}", path),
                existing_sha.as_deref(),
            )
            .await?;

        let url = format!("{}/{}", self.public_base_url, path);
        info!(user_id, path = %path, url = %url, "Tool published");

        if let Err(e) = self.write_metadata(user_id, &path, &url).await {
            error!(user_id, path = %path, error = %e, "Error storing metadata");
        }

        Ok(url)
    }

    /// Upsert the metadata record. `createdAt` survives republishing.
    async fn write_metadata(&self, user_id: &str, path: &str, url: &str) -> ToolResult<()> {
        let meta_path = metadata_path(user_id, path);
        let previous = self.store.read(&meta_path).await?;

        let now = Utc::now();
        let created_at = previous
            .as_ref()
            .and_then(|f| serde_json::from_slice::<PublishedToolMetadata>(&f.content).ok())
            .map(|m| m.created_at)
            .unwrap_or(now);

        let metadata = PublishedToolMetadata {
            user_id: user_id.to_string(),
            filename: path.to_string(),
            url: url.to_string(),
            created_at,
            updated_at: now,
        };
        let body = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        self.store
            .write(
                &meta_path,
                &body,
                &format!("Update tool metadata: {}", path),
                previous.as_ref().map(|f| f.sha.as_str()),
            )
            .await?;
        Ok(())
    }

    /// A member's published tools, newest first.
    pub async fn recent(&self, user_id: &str) -> ToolResult<Vec<PublishedToolMetadata>> {
        let dir = format!("{}/{}", METADATA_DIR, user_id);
        let paths: Vec<String> = self
            .store
            .list(&dir)
            .await?
            .into_iter()
            .filter(|p| p.ends_with(".json"))
            .collect();

        let reads = paths.iter().map(|path| async move {
            let file = self.store.read(path).await?;
            Ok::<_, StoreError>(file.map(|f| (path, f)))
        });

        let mut tools = Vec::with_capacity(paths.len());
        for result in join_all(reads).await {
            match result {
                Ok(Some((path, file))) => {
                    match serde_json::from_slice::<PublishedToolMetadata>(&file.content) {
                        Ok(meta) => tools.push(meta),
                        Err(e) => warn!(path = %path, error = %e, "Skipping malformed metadata"),
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(user_id, error = %e, "Failed to read metadata record"),
            }
        }

        tools.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::store::testing::MemoryStore;
    use super::*;

    const BASE: &str = "https://sodapork.github.io/interactive-tools";

    fn publisher(store: Arc<MemoryStore>) -> Publisher {
        Publisher::new(store, format!("{}/", BASE))
    }

    fn read_meta(store: &MemoryStore, path: &str) -> PublishedToolMetadata {
        serde_json::from_slice(&store.get(path).unwrap().content).unwrap()
    }

    #[test]
    fn test_widget_path() {
        assert_eq!(widget_path("quiz").unwrap(), "quiz.html");
        assert_eq!(widget_path("quiz.html").unwrap(), "quiz.html");
        assert!(matches!(widget_path(""), Err(ToolError::InvalidInput(_))));
        assert!(matches!(widget_path("../x"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(widget_path("/etc/x"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(widget_path("a/b"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(widget_path("a\\b"), Err(ToolError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_nested_filename_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let publisher = publisher(store.clone());
        let err = publisher
            .publish("mem_1", "guides/quiz", "<html>q</html>")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(store.writes.lock().unwrap().is_empty());
        assert!(publisher.recent("mem_1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_writes_widget_and_metadata() {
        let store = Arc::new(MemoryStore::new());
        let url = publisher(store.clone())
            .publish("mem_1", "savings", "<html>v1</html>")
            .await
            .unwrap();

        assert_eq!(url, format!("{}/savings.html", BASE));
        assert_eq!(store.get("savings.html").unwrap().content, b"<html>v1</html>");

        let meta = read_meta(&store, "metadata/mem_1/savings.html.json");
        assert_eq!(meta.user_id, "mem_1");
        assert_eq!(meta.filename, "savings.html");
        assert_eq!(meta.url, url);
        assert_eq!(meta.created_at, meta.updated_at);
    }

    #[tokio::test]
    async fn test_republish_keeps_created_at() {
        let store = Arc::new(MemoryStore::new());
        let publisher = publisher(store.clone());
        publisher.publish("mem_1", "quiz", "<html>v1</html>").await.unwrap();
        let first = read_meta(&store, "metadata/mem_1/quiz.html.json");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        publisher.publish("mem_1", "quiz.html", "<html>v2</html>").await.unwrap();
        let second = read_meta(&store, "metadata/mem_1/quiz.html.json");

        assert_eq!(store.get("quiz.html").unwrap().content, b"<html>v2</html>");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn test_metadata_failure_does_not_fail_publish() {
        let store = Arc::new(MemoryStore::failing_writes_under("metadata/"));
        let url = publisher(store.clone())
            .publish("mem_1", "chart", "<html></html>")
            .await
            .unwrap();
        assert!(url.ends_with("/chart.html"));
        assert!(store.get("chart.html").is_some());
        assert!(store.get("metadata/mem_1/chart.html.json").is_none());
    }

    #[tokio::test]
    async fn test_publish_rejects_empty_html() {
        let store = Arc::new(MemoryStore::new());
        let err = publisher(store.clone())
            .publish("mem_1", "x", "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_sorted_newest_first_and_scoped_to_user() {
        let store = Arc::new(MemoryStore::new());
        let publisher = publisher(store.clone());
        publisher.publish("mem_1", "older", "<html>a</html>").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        publisher.publish("mem_1", "newer", "<html>b</html>").await.unwrap();
        publisher.publish("mem_2", "other", "<html>c</html>").await.unwrap();
        store.put("metadata/mem_1/broken.html.json", b"not json");

        let tools = publisher.recent("mem_1").await.unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.filename.as_str()).collect();
        assert_eq!(names, vec!["newer.html", "older.html"]);
    }

    #[tokio::test]
    async fn test_recent_for_unknown_user_is_empty() {
        let store = Arc::new(MemoryStore::new());
        assert!(publisher(store).recent("nobody").await.unwrap().is_empty());
    }
}
