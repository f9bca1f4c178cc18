use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ToolError;
use crate::state::AuthSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
}

/// Resolves a bearer token to a member identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Member, ToolError>;
}

/// The member API answers either with the member itself or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MemberPayload {
    Wrapped { data: Member },
    Bare(Member),
}

impl From<MemberPayload> for Member {
    fn from(payload: MemberPayload) -> Self {
        match payload {
            MemberPayload::Wrapped { data } => data,
            MemberPayload::Bare(member) => member,
        }
    }
}

pub struct MemberstackVerifier {
    client: reqwest::Client,
    api_url: String,
    secret_key: Option<String>,
}

impl MemberstackVerifier {
    pub fn new(settings: &AuthSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to create member API client")?;
        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            secret_key: settings.secret_key.clone(),
        })
    }

    async fn lookup(&self, token: &str) -> Result<Member> {
        let mut req = self
            .client
            .get(format!("{}/members/me", self.api_url))
            .bearer_auth(token);
        if let Some(key) = &self.secret_key {
            req = req.header("X-Memberstack-Key", key);
        }

        let resp = req
            .send()
            .await
            .context("member lookup failed")?
            .error_for_status()
            .context("member lookup rejected")?;
        let payload: MemberPayload = resp.json().await.context("Failed to parse member")?;
        Ok(payload.into())
    }
}

#[async_trait]
impl IdentityVerifier for MemberstackVerifier {
    async fn verify(&self, token: &str) -> Result<Member, ToolError> {
        self.lookup(token).await.map_err(|e| {
            warn!(error = %format!("{:#}", e), "Token verification failed");
            ToolError::Unauthorized("Invalid token".to_string())
        })
    }
}
