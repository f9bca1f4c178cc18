pub mod ideas;
pub mod prompts;
pub mod types;
pub mod validate;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ToolError, ToolResult};
use crate::llm::{ChatModel, Message};

pub use types::{ConversationTurn, Goal, Idea, Refinement, Synthesis};
pub use validate::validate;

/// Article text is only shortened for log lines, never for requests.
const LOG_PREVIEW_CHARS: usize = 500;

fn preview(text: &str) -> String {
    text.chars().take(LOG_PREVIEW_CHARS).collect()
}

/// Idea suggestion, widget synthesis, and refinement over a chat model.
///
/// Holds no per-request state: conversation history is passed in and handed
/// back by [`ToolForge::refine`].
pub struct ToolForge {
    llm: Arc<dyn ChatModel>,
}

impl ToolForge {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    async fn complete(&self, messages: &[Message]) -> ToolResult<String> {
        self.llm
            .chat(messages)
            .await
            .map_err(ToolError::generation)
    }

    /// Ask for five tool ideas and parse the numbered reply.
    pub async fn suggest_ideas(&self, article: &str) -> ToolResult<Vec<Idea>> {
        debug!(content = %preview(article), "Requesting tool ideas");

        let messages = [
            Message::system(prompts::IDEAS_SYSTEM_PROMPT),
            Message::user(prompts::ideas_user_prompt(article)),
        ];
        let reply = self.complete(&messages).await?;
        let ideas = ideas::parse_ideas(&reply);

        if ideas.len() != 5 {
            warn!(count = ideas.len(), "Idea reply did not hold exactly five entries");
        }
        info!(count = ideas.len(), "Tool ideas generated");
        Ok(ideas)
    }

    /// Generate a widget, gate it on the rubric, and regenerate at most once.
    ///
    /// Rubric failures never fail the call. Issues left after the corrective
    /// pass come back as `warnings`; first-pass issues are dropped.
    pub async fn synthesize(&self, article: &str, goal: &Goal) -> ToolResult<Synthesis> {
        let user_prompt = prompts::generate_user_prompt(article, goal.describe());
        debug!(goal = %goal.describe(), content = %preview(article), "Synthesizing tool");

        let first = self
            .complete(&[
                Message::system(prompts::GENERATE_SYSTEM_PROMPT),
                Message::user(user_prompt.clone()),
            ])
            .await?;

        let first_check = validate(&first);
        if first_check.is_valid {
            info!(code_len = first.len(), "Tool passed quality checks on first pass");
            return Ok(Synthesis {
                code: first,
                warnings: None,
            });
        }

        warn!(
            issues = ?first_check.issues,
            "Tool failed quality checks, regenerating once"
        );

        let second = self
            .complete(&[
                Message::system(prompts::corrective_system_prompt(&first_check.issues)),
                Message::user(user_prompt),
            ])
            .await?;

        let second_check = validate(&second);
        if second_check.is_valid {
            info!(code_len = second.len(), "Tool passed quality checks after regeneration");
            return Ok(Synthesis {
                code: second,
                warnings: None,
            });
        }

        warn!(
            issues = ?second_check.issues,
            "Tool still failing quality checks, returning with warnings"
        );
        Ok(Synthesis {
            code: second,
            warnings: Some(second_check.issues),
        })
    }

    /// Apply user feedback to the current widget.
    ///
    /// The returned history is `history` plus the feedback and a fixed
    /// acknowledgment. Generated code is never stored in history.
    pub async fn refine(
        &self,
        article: &str,
        current_code: &str,
        feedback: &str,
        history: &[ConversationTurn],
    ) -> ToolResult<Refinement> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(prompts::refine_system_prompt(
            article,
            current_code,
            feedback,
        )));
        messages.extend(history.iter().map(Message::from));
        messages.push(Message::user(feedback));

        let code = self.complete(&messages).await?;

        let mut history = history.to_vec();
        history.push(ConversationTurn::user(feedback));
        history.push(ConversationTurn::assistant(prompts::REFINE_ACK));

        info!(
            turns = history.len(),
            code_len = code.len(),
            "Tool refined"
        );
        Ok(Refinement { code, history })
    }
}
