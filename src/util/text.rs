use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").expect("valid blank-line regex"));

/// Markdown-lite rewrites, applied in order to already-escaped text. Each rule
/// sees the output of the previous one.
static MARKDOWN_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
        (r"__(.*?)__", "<strong>${1}</strong>"),
        (r"\*(.*?)\*", "<em>${1}</em>"),
        (r"_(.*?)_", "<em>${1}</em>"),
        (r"`(.*?)`", "<code>${1}</code>"),
        (
            r"\[([^\]]+)\]\(([^)]+)\)",
            r#"<a href="${2}" target="_blank">${1}</a>"#,
        ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid markdown rule"),
            replacement,
        )
    })
    .collect()
});

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Collapses runs of blank lines, trims, and escapes for display.
pub fn clean_markdown_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let collapsed = BLANK_LINE_RUNS.replace_all(text, "\n\n");
    escape_html(collapsed.trim())
}

pub fn markdown_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut html = escape_html(text);
    for (pattern, replacement) in MARKDOWN_RULES.iter() {
        html = pattern.replace_all(&html, *replacement).into_owned();
    }
    html.replace('\n', "<br>")
}

/// First `limit` characters, with `...` appended only when something was cut.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
