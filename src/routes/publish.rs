use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::publish::PublishedToolMetadata;
use crate::routes::Payload;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PublishBody {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    html: String,
}

#[derive(Serialize)]
pub struct PublishResponse {
    url: String,
}

pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Payload(body): Payload<PublishBody>,
) -> Result<Json<PublishResponse>, ToolError> {
    let member = state.authenticate(&headers).await?;
    let url = state
        .publisher
        .publish(&member.id, &body.filename, &body.html)
        .await?;
    Ok(Json(PublishResponse { url }))
}

#[derive(Serialize)]
pub struct RecentResponse {
    tools: Vec<PublishedToolMetadata>,
}

pub async fn recent(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RecentResponse>, ToolError> {
    let member = state.authenticate(&headers).await?;
    let tools = state.publisher.recent(&member.id).await?;
    Ok(Json(RecentResponse { tools }))
}
