use regex::Regex;
use std::sync::LazyLock;

const MAX_TITLE_CHARS: usize = 150;
const DISALLOWED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Make a bookmark title safe to use as a file name on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return "untitled".to_string();
    }

    // Nothing but separators and blanks: there is no title left to keep
    let has_content = name
        .chars()
        .any(|c| !c.is_whitespace() && !DISALLOWED_CHARS.contains(&c));
    if !has_content {
        return "untitled_chapter".to_string();
    }

    let replaced = name.replace(DISALLOWED_CHARS, "_");
    let collapsed = WHITESPACE.replace_all(&replaced, " ");
    collapsed.trim().chars().take(MAX_TITLE_CHARS).collect()
}

/// `001_Title.pdf`
pub fn chapter_filename(index: usize, title: &str) -> String {
    format!("{:03}_{}.pdf", index, sanitize_filename(title))
}
