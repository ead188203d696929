/// Appended wherever input was cut to fit the budget.
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]";

/// Rough characters-per-token ratio for local models.
const CHARS_PER_TOKEN: usize = 4;

/// Conservative token estimate for `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Cut `text` to at most `max_chars` characters, backing off to the last space,
/// and mark the cut. Text within budget is returned unchanged.
pub fn truncate_to_budget(text: &str, max_chars: usize) -> String {
    let end = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return text.to_string(),
    };
    let cut = &text[..end];
    let head = match cut.rsplit_once(' ') {
        Some((head, _)) if !head.is_empty() => head,
        _ => cut,
    };
    format!("{head}{TRUNCATION_MARKER}")
}
