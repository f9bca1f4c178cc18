pub const IDEAS_SYSTEM_PROMPT: &str = "You are an expert at creating interactive web tools for blog content. \
Given a blog post, suggest 5 highly relevant and engaging interactive tool ideas (such as calculators, \
quizzes, checklists, or comparison charts) that would add value for readers. Each idea must be \
directly related to the post's topic, distinct from the others, technically feasible, and embeddable \
as a single widget on the page. Respond with a numbered list of 5 short, clear tool ideas. Do not \
include explanations or markdown.";

pub const GENERATE_SYSTEM_PROMPT: &str = r#"You are an expert at creating highly engaging, modern, and interactive web tools for blog content. Given a blog post and user requirements, generate a sophisticated tool that is directly relevant to the post's topic and provides real value to readers.

Quality rubric (every item is checked before the tool is shown to the user):

1. Content relevance
- The tool must be tailored to the blog content and its target audience.
- Use facts, terminology, and examples from the post.

2. User experience
- Clear instructions, immediate feedback, and multiple steps or features where appropriate.
- Use progress indicators, animations, charts, branching logic, or gamification when they fit.
- Show a loading state for every asynchronous operation.

3. Technical quality
- A complete HTML document: <html>, <head>, <body>, closing </html>.
- Wrap all script logic that can fail in try/catch and show friendly error messages.
- Every <input> must be validated (required, min/max, pattern, or explicit checks in script).

4. Visual design
- Super clean, modern, black and white style with the Inter font and generous spacing.
- No color except for clear focus and active states.
- Responsive: include @media rules and fluid widths (width: 100%) so it works on phones.
- Keep text contrast high; never use light grays such as #999, #aaa, #bbb, #ccc, or #ddd for text.

5. Accessibility
- Label every control and use aria-* attributes (aria-label, aria-live, aria-describedby).
- Full keyboard navigation with visible focus outlines.

6. Security
- No external scripts, no eval, no inline event handler strings built from user input.
- Escape any user-provided text before inserting it into the page.

Output a complete, embeddable widget with HTML, CSS, and JS. Do not output only JavaScript or code blocks. Do not include markdown, triple backticks, or explanations: just the raw HTML, CSS, and JS."#;

/// Acknowledgment stored in conversation history in place of generated code.
pub const REFINE_ACK: &str = "I've updated the tool based on your feedback.";

pub fn ideas_user_prompt(article: &str) -> String {
    format!("Suggest 5 interactive tool ideas for this blog post: {}", article)
}

pub fn generate_user_prompt(article: &str, goal: &str) -> String {
    format!("Blog content: {}\n\nUser requirements: {}", article, goal)
}

/// How to fix a failing rubric item, keyed by the issue text.
fn remedy(issue: &str) -> &'static str {
    use super::validate::*;
    match issue {
        MISSING_STRUCTURE => "wrap everything in a complete <html> document with a closing </html> tag",
        MISSING_ARIA => "add aria-label, aria-live, or aria-describedby attributes to controls and result regions",
        MISSING_RESPONSIVE => "add @media rules and fluid width: 100% containers",
        MISSING_ERROR_HANDLING => "wrap script logic in try/catch blocks and display friendly error messages",
        MISSING_INPUT_VALIDATION => "mark inputs as required or validate them with pattern/min/max and explicit checks",
        MISSING_LOADING_STATES => "show a visible loading indicator while every fetch is in flight",
        POOR_CONTRAST => "replace light gray text colors with high-contrast ones",
        _ => "fix this problem",
    }
}

/// System prompt for the corrective pass: the full rubric plus every failing item.
pub fn corrective_system_prompt(issues: &[String]) -> String {
    let mut prompt = String::from(GENERATE_SYSTEM_PROMPT);
    prompt.push_str(
        "\n\nIMPORTANT: a previous version of this tool failed the following quality checks. \
         The new version must fix every one of them:\n",
    );
    for issue in issues {
        prompt.push_str(&format!("- {}: {}\n", issue, remedy(issue)));
    }
    prompt
}

pub fn refine_system_prompt(article: &str, current_code: &str, feedback: &str) -> String {
    format!(
        "You are an expert at updating interactive tools for blog content. \
         Here is the original blog post: {}. Here is the current tool code: {}. \
         The user wants the following changes: {}. Please update the tool accordingly. \
         Return only the updated, complete HTML+JS code, no explanations or markdown. \
         Output a complete, embeddable widget with HTML, CSS, and JS. \
         Do not output only JavaScript or code blocks.",
        article, current_code, feedback
    )
}
