use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::forge::{ConversationTurn, Goal, Idea};
use crate::routes::Payload;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IdeasBody {
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
pub struct IdeasResponse {
    ideas: Vec<Idea>,
}

pub async fn ideas(
    State(state): State<AppState>,
    Payload(body): Payload<IdeasBody>,
) -> Result<Json<IdeasResponse>, ToolError> {
    let ideas = state.forge.suggest_ideas(&body.content).await?;
    Ok(Json(IdeasResponse { ideas }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    content: String,
    idea: Option<String>,
    user_requirements: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
}

pub async fn generate(
    State(state): State<AppState>,
    Payload(body): Payload<GenerateBody>,
) -> Result<Json<GenerateResponse>, ToolError> {
    let goal = Goal {
        idea: body.idea,
        requirements: body.user_requirements,
    };
    let synthesis = state.forge.synthesize(&body.content, &goal).await?;
    Ok(Json(GenerateResponse {
        tool: synthesis.code,
        warnings: synthesis.warnings,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    #[serde(default)]
    content: String,
    #[serde(default)]
    current_tool: String,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    tool: String,
    history: Vec<ConversationTurn>,
}

pub async fn update(
    State(state): State<AppState>,
    Payload(body): Payload<UpdateBody>,
) -> Result<Json<UpdateResponse>, ToolError> {
    if body.current_tool.trim().is_empty() {
        return Err(ToolError::InvalidInput("Missing currentTool".to_string()));
    }
    if body.feedback.trim().is_empty() {
        return Err(ToolError::InvalidInput("Missing feedback".to_string()));
    }

    let refinement = state
        .forge
        .refine(&body.content, &body.current_tool, &body.feedback, &body.history)
        .await?;
    Ok(Json(UpdateResponse {
        tool: refinement.code,
        history: refinement.history,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::llm::testing::ScriptedModel;
    use crate::publish::store::testing::MemoryStore;
    use crate::routes::test_support::{app, post_json, send};

    #[tokio::test]
    async fn test_ideas_route() {
        let model = ScriptedModel::new().reply("1. Calculator\n2. Quiz\n\n3. Checklist");
        let (app, _) = app(model, Arc::new(MemoryStore::new()));
        let (status, body) = send(app, post_json("/ideas", json!({"content": "post"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ideas": ["Calculator", "Quiz", "Checklist"]}));
    }

    #[tokio::test]
    async fn test_ideas_route_rejects_null_content() {
        let (app, model) = app(ScriptedModel::new(), Arc::new(MemoryStore::new()));
        let (status, body) = send(app, post_json("/ideas", json!({"content": null}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "InvalidInput");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input: "));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_generate_route_surfaces_warnings() {
        let bare = "<html><body>hi</body></html>";
        let model = ScriptedModel::new().reply(bare).reply(bare);
        let (app, model) = app(model, Arc::new(MemoryStore::new()));
        let (status, body) = send(
            app,
            post_json(
                "/generate",
                json!({"content": "post", "idea": "Quiz", "userRequirements": "Ten questions"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool"], bare);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 3);
        assert!(model.requests()[0][1].content.ends_with("User requirements: Ten questions"));
    }

    #[tokio::test]
    async fn test_generate_route_omits_warnings_when_clean() {
        let clean = "<html><style>@media (max-width: 1px) {}</style><b aria-label=\"x\"></b>\
            <script>try {} catch (e) {}</script></html>";
        let (app, _) = app(ScriptedModel::new().reply(clean), Arc::new(MemoryStore::new()));
        let (status, body) = send(app, post_json("/generate", json!({"content": "post"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("warnings").is_none());
    }

    #[tokio::test]
    async fn test_generate_route_service_failure() {
        let (app, _) = app(ScriptedModel::new().fail("503"), Arc::new(MemoryStore::new()));
        let (status, body) = send(app, post_json("/generate", json!({"content": "post"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "GenerationError");
        assert_eq!(body["error"], "Failed to generate tool");
    }

    #[tokio::test]
    async fn test_update_route_round_trips_history() {
        let (app, _) = app(
            ScriptedModel::new().reply("<html>v2</html>"),
            Arc::new(MemoryStore::new()),
        );
        let (status, body) = send(
            app,
            post_json(
                "/update",
                json!({
                    "content": "post",
                    "currentTool": "<html>v1</html>",
                    "feedback": "Use larger buttons",
                    "history": [{"role": "user", "content": "Add a title"},
                                {"role": "assistant", "content": "ok"}]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tool"], "<html>v2</html>");
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[2], json!({"role": "user", "content": "Use larger buttons"}));
        assert_eq!(history[3]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_update_route_requires_feedback() {
        let (app, model) = app(ScriptedModel::new(), Arc::new(MemoryStore::new()));
        let (status, body) = send(
            app,
            post_json("/update", json!({"content": "post", "currentTool": "<html></html>"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "InvalidInput");
        assert!(model.requests().is_empty());
    }
}
