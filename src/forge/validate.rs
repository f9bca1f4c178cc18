//! Lexical quality rubric for generated widgets.
//!
//! Each probe looks for textual markers in the widget source and yields at
//! most one issue. Probes are independent: every failing probe contributes
//! its issue, in rubric order.

use serde::Serialize;

pub const MISSING_STRUCTURE: &str = "Missing HTML structure";
pub const MISSING_ARIA: &str = "Missing ARIA attributes for accessibility";
pub const MISSING_RESPONSIVE: &str = "Missing responsive design elements";
pub const MISSING_ERROR_HANDLING: &str = "Missing error handling";
pub const MISSING_INPUT_VALIDATION: &str = "Missing input validation";
pub const MISSING_LOADING_STATES: &str = "Missing loading states for async operations";
pub const POOR_CONTRAST: &str = "Poor color contrast detected";

/// Light grays that fail contrast against the white backgrounds widgets use.
const LOW_CONTRAST_COLORS: &[&str] = &["#999", "#aaa", "#bbb", "#ccc", "#ddd"];

const VALIDATION_MARKERS: &[&str] = &["required", "pattern=", "checkvalidity", "validate"];
const LOADING_MARKERS: &[&str] = &["loading", "aria-busy", "spinner"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// One rubric item: `passes` returns false when `issue` applies.
struct Probe {
    issue: &'static str,
    passes: fn(&Source<'_>) -> bool,
}

/// Widget source plus a lowercased copy for case-insensitive markers.
struct Source<'a> {
    raw: &'a str,
    lower: String,
}

impl<'a> Source<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
        }
    }

    fn has(&self, marker: &str) -> bool {
        self.raw.contains(marker)
    }

    fn has_any_ci(&self, markers: &[&str]) -> bool {
        markers.iter().any(|m| self.lower.contains(m))
    }
}

fn has_structure(s: &Source<'_>) -> bool {
    s.has("<html") && s.has("</html>")
}

fn has_aria(s: &Source<'_>) -> bool {
    s.has("aria-")
}

fn is_responsive(s: &Source<'_>) -> bool {
    s.has("@media") || s.lower.contains("width: 100%") || s.lower.contains("width:100%")
}

fn handles_errors(s: &Source<'_>) -> bool {
    s.has("try") && s.has("catch")
}

fn validates_inputs(s: &Source<'_>) -> bool {
    !s.lower.contains("<input") || s.has_any_ci(VALIDATION_MARKERS)
}

fn shows_loading(s: &Source<'_>) -> bool {
    !s.has("fetch") || s.has_any_ci(LOADING_MARKERS)
}

fn has_contrast(s: &Source<'_>) -> bool {
    !s.has_any_ci(LOW_CONTRAST_COLORS)
}

const RUBRIC: &[Probe] = &[
    Probe { issue: MISSING_STRUCTURE, passes: has_structure },
    Probe { issue: MISSING_ARIA, passes: has_aria },
    Probe { issue: MISSING_RESPONSIVE, passes: is_responsive },
    Probe { issue: MISSING_ERROR_HANDLING, passes: handles_errors },
    Probe { issue: MISSING_INPUT_VALIDATION, passes: validates_inputs },
    Probe { issue: MISSING_LOADING_STATES, passes: shows_loading },
    Probe { issue: POOR_CONTRAST, passes: has_contrast },
];

/// Score widget source against the rubric. Pure and deterministic.
pub fn validate(code: &str) -> ValidationResult {
    let source = Source::new(code);
    let issues: Vec<String> = RUBRIC
        .iter()
        .filter(|probe| !(probe.passes)(&source))
        .map(|probe| probe.issue.to_string())
        .collect();

    ValidationResult {
        is_valid: issues.is_empty(),
        issues,
    }
}
