use regex::Regex;
use std::sync::LazyLock;

static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"--[^\n]*").unwrap());
static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static TERMINATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";[ \t]*(\r?\n|\z)").unwrap());

/// Split raw multi-statement SQL into individual executable statements.
///
/// Line comments (`--` to end of line) are removed first, then block
/// comments (`/* ... */`, non-nesting, closed by the nearest `*/`), then
/// the remainder is split on semicolons that end a line or end the input.
/// Fragments are trimmed and empty ones dropped, so stray semicolons and
/// comment-only input yield no statements.
///
/// The splitter does not understand SQL string literals: a `;` or comment
/// marker inside a quoted literal will be mishandled. Keep literals with
/// those characters out of migration scripts (see the pinning test below).
pub fn split_sql(raw: &str) -> Vec<String> {
    let no_line_comments = LINE_COMMENT.replace_all(raw, "");
    let no_comments = BLOCK_COMMENT.replace_all(&no_line_comments, "");

    TERMINATOR
        .split(&no_comments)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}
