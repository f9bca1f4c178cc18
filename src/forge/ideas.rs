use super::types::Idea;

/// Split a numbered-list reply into ideas.
///
/// A leading `N.` marker is stripped, lines are trimmed, and blank lines are
/// dropped. Lines without a marker are kept as they are. The count is not
/// enforced.
pub fn parse_ideas(reply: &str) -> Vec<Idea> {
    reply
        .split('\n')
        .map(|line| strip_ordinal(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn strip_ordinal(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}
