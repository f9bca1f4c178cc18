use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::article::Article;
use crate::error::ToolError;
use crate::routes::Payload;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExtractBody {
    #[serde(default)]
    url: String,
}

/// Fetch a page and return its readable article.
pub async fn extract(
    State(state): State<AppState>,
    Payload(body): Payload<ExtractBody>,
) -> Result<Json<Article>, ToolError> {
    let article = state.extractor.extract(&body.url).await?;
    Ok(Json(article))
}
