use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderMap;

use crate::article::ContentExtractor;
use crate::auth::{IdentityVerifier, Member};
use crate::error::ToolError;
use crate::forge::ToolForge;
use crate::publish::Publisher;

const DEFAULT_ORIGINS: &str =
    "https://interactive-content-frontend.vercel.app,http://localhost:3000";

/// Generative text service parameters.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

/// Remote content store parameters.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub repo: String,
    pub branch: String,
    pub token: Option<String>,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub api_url: String,
    pub secret_key: Option<String>,
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub llm: LlmSettings,
    pub store: StoreSettings,
    pub auth: AuthSettings,
}

fn var_or(key: &str, default: &str) -> String {
    dotenv::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty(key: &str) -> Option<String> {
    dotenv::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    non_empty(key)
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("Invalid value for {}", key))
}

/// `owner/name` maps to `https://owner.github.io/name`.
fn pages_url(repo: &str) -> String {
    match repo.split_once('/') {
        Some((owner, name)) => format!("https://{}.github.io/{}", owner, name),
        None => format!("https://{}.github.io", repo),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let port = parsed::<u16>("PORT")?.unwrap_or(5001);

        let allowed_origins = var_or("ALLOWED_ORIGINS", DEFAULT_ORIGINS)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let llm = LlmSettings {
            base_url: var_or("LLM_BASE_URL", "https://api.openai.com/v1"),
            model: var_or("LLM_MODEL", "gpt-4.1"),
            api_key: non_empty("LLM_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            temperature: parsed::<f32>("LLM_TEMPERATURE")?,
            timeout_secs: parsed::<u64>("LLM_TIMEOUT_SECS")?.unwrap_or(300),
        };

        let repo = var_or("GITHUB_REPO", "sodapork/interactive-tools");
        let public_base_url = non_empty("PUBLIC_BASE_URL").unwrap_or_else(|| pages_url(&repo));
        let store = StoreSettings {
            branch: var_or("GITHUB_BRANCH", "gh-pages"),
            token: non_empty("GITHUB_TOKEN"),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            repo,
        };

        let auth = AuthSettings {
            api_url: var_or("MEMBERSTACK_API_URL", "https://api.memberstack.io/v1"),
            secret_key: non_empty("MEMBERSTACK_SECRET_KEY"),
        };

        Ok(Self {
            port,
            log_level: var_or("LOG_LEVEL", "info"),
            allowed_origins,
            llm,
            store,
            auth,
        })
    }
}

/// Shared handles for every request. Nothing in here is mutable: each
/// request carries its own state.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<ContentExtractor>,
    pub forge: Arc<ToolForge>,
    pub publisher: Arc<Publisher>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Resolve the caller's member identity from an `Authorization: Bearer` header.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Member, ToolError> {
        let token = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split_whitespace().nth(1))
            .ok_or_else(|| ToolError::Unauthorized("No token provided".to_string()))?;
        self.verifier.verify(token).await
    }
}
