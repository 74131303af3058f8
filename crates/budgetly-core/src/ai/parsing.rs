//! Parsing helpers for advisor responses

use super::MAX_TIPS;

/// Extract tips from a bulleted or numbered list
///
/// Bullet markers ("•", "-", "*", "1.", "2)") are stripped, empty lines are
/// dropped, and at most [`MAX_TIPS`] tips are kept.
pub fn parse_tips(response: &str) -> Vec<String> {
    response
        .lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty())
        .take(MAX_TIPS)
        .map(str::to_string)
        .collect()
}

fn strip_marker(line: &str) -> &str {
    let line = line.trim();

    for bullet in ["•", "-", "*", "–"] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim();
        }
    }

    // Numbered: digits followed by '.' or ')'
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }

    line
}
