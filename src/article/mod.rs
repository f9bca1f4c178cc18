pub mod parse;
pub mod types;

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Url;
use tracing::{info, warn};

use crate::error::{ToolError, ToolResult};

pub use parse::parse_article;
pub use types::Article;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches web pages and reduces them to readable articles.
pub struct ContentExtractor {
    client: reqwest::Client,
}

impl ContentExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create fetch client")?;
        Ok(Self { client })
    }

    /// Fetch `url` and run the readability pass over the response body.
    pub async fn extract(&self, url: &str) -> ToolResult<Article> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ToolError::InvalidInput("No URL provided".to_string()));
        }
        let parsed = Url::parse(url)
            .map_err(|e| ToolError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;

        let markup = self.fetch(&parsed).await?;

        // DOM building and scoring are CPU-bound; keep them off the async workers.
        let base = parsed.clone();
        let result = tokio::task::spawn_blocking(move || parse_article(&markup, &base))
            .await
            .map_err(|e| ToolError::Fetch(format!("extraction task failed: {}", e)))?;

        match result {
            Ok(article) => {
                info!(
                    url = %parsed,
                    title = %article.title,
                    content_len = article.content.len(),
                    "Article extracted"
                );
                Ok(article)
            }
            Err(e) => {
                warn!(url = %parsed, "Extraction failed or content empty");
                Err(e)
            }
        }
    }

    async fn fetch(&self, url: &Url) -> ToolResult<String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        resp.text().await.map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        ToolError::Timeout(err.to_string())
    } else {
        ToolError::Fetch(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::parse::tests::ARTICLE_PAGE;
    use super::*;

    /// Serve one canned HTTP response on a local port; returns the page URL.
    async fn serve_once(status: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/posts/compound-interest", addr)
    }

    #[tokio::test]
    async fn test_extracts_served_article() {
        let url = serve_once("200 OK", ARTICLE_PAGE).await;
        let article = ContentExtractor::new().unwrap().extract(&url).await.unwrap();
        assert!(article.title.contains("Compound Interest"));
        assert!(article.content.contains("interest you earn on interest"));
    }

    #[tokio::test]
    async fn test_not_found_is_fetch_error() {
        let url = serve_once("404 Not Found", "<html><body>gone</body></html>").await;
        let err = ContentExtractor::new().unwrap().extract(&url).await.unwrap_err();
        assert!(matches!(err, ToolError::Fetch(_)), "got {:?}", err);
        assert_eq!(err.kind(), "FetchError");
    }

    #[tokio::test]
    async fn test_empty_page_is_extraction_empty() {
        let url = serve_once("200 OK", "<html><body></body></html>").await;
        let err = ContentExtractor::new().unwrap().extract(&url).await.unwrap_err();
        assert!(matches!(err, ToolError::ExtractionEmpty));
    }

    #[tokio::test]
    async fn test_silent_server_is_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let extractor = ContentExtractor::with_timeout(Duration::from_millis(200)).unwrap();
        let err = extractor
            .extract(&format!("http://{}/slow", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout(_)), "got {:?}", err);
        assert_eq!(err.kind(), "TimeoutError");
    }

    #[tokio::test]
    async fn test_empty_url_is_invalid_input() {
        let extractor = ContentExtractor::new().unwrap();
        let err = extractor.extract("   ").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_malformed_url_is_invalid_input() {
        let extractor = ContentExtractor::new().unwrap();
        let err = extractor.extract("not a url").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
