//! Parsing of raw rewrite responses.
//!
//! The rewriter is asked for `<label> <title>` on the first line and the body
//! after it. Anything else falls back to the original title with the whole
//! response as body.

/// Fence markers trimmed from either end of a body, longest first.
const FENCE_MARKERS: [&str; 2] = ["```markdown", "```"];

/// Title and body split out of a rewrite response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRewrite {
    /// Rewritten title, or the original title on fallback.
    pub title: String,
    /// Rewritten body with any wrapping fence markers removed.
    pub body: String,
    /// `true` when the response did not start with a labelled title line.
    pub used_fallback: bool,
}

/// Split `raw` into a rewritten title and body.
///
/// The first line must start with `title_label` (the full-width colon form of
/// the label is accepted too) and be followed by a line break. An empty title
/// after the label keeps the original title but still uses the parsed body.
pub fn parse_rewrite_response(raw: &str, original_title: &str, title_label: &str) -> ParsedRewrite {
    match split_title_line(raw, title_label) {
        Some((title, body)) => ParsedRewrite {
            title: if title.is_empty() {
                original_title.to_string()
            } else {
                title.to_string()
            },
            body: strip_markdown_fence(body),
            used_fallback: false,
        },
        None => ParsedRewrite {
            title: original_title.to_string(),
            body: strip_markdown_fence(raw),
            used_fallback: true,
        },
    }
}

/// Remove one leading and one trailing fence marker, then surrounding whitespace.
///
/// This is a plain trim of both ends, not a Markdown parse: a body that really
/// ends with a closing code fence loses that fence. Only the whole markers are
/// removed, never a run of their characters, so a body ending in "breakdown"
/// keeps its last word.
pub fn strip_markdown_fence(body: &str) -> String {
    let mut text = body.trim();

    if let Some(rest) = FENCE_MARKERS.iter().find_map(|m| text.strip_prefix(m)) {
        text = rest;
    }
    if let Some(rest) = FENCE_MARKERS.iter().find_map(|m| text.strip_suffix(m)) {
        text = rest;
    }

    text.trim().to_string()
}

fn split_title_line<'a>(raw: &'a str, title_label: &str) -> Option<(&'a str, &'a str)> {
    let (first_line, rest) = raw.split_once('\n')?;
    let first_line = first_line.trim_end_matches('\r');

    let title = first_line.strip_prefix(title_label).or_else(|| {
        let full_width = full_width_label(title_label)?;
        first_line.strip_prefix(full_width.as_str())
    })?;

    Some((title.trim(), rest.trim()))
}

/// `标题:` → `标题：`; `None` when the label does not end in an ASCII colon.
fn full_width_label(label: &str) -> Option<String> {
    label.strip_suffix(':').map(|stem| format!("{stem}："))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABEL: &str = "标题:";

    #[test]
    fn labelled_response_is_split() {
        let raw = "标题: 用 Rust 重写一切\n\n正文第一段。\n\n正文第二段。";
        let parsed = parse_rewrite_response(raw, "Rewrite it in Rust", LABEL);
        assert_eq!(parsed.title, "用 Rust 重写一切");
        assert_eq!(parsed.body, "正文第一段。\n\n正文第二段。");
        assert!(!parsed.used_fallback);
    }

    #[test]
    fn full_width_colon_is_accepted() {
        let raw = "标题：新标题\r\n正文";
        let parsed = parse_rewrite_response(raw, "Original", LABEL);
        assert_eq!(parsed.title, "新标题");
        assert_eq!(parsed.body, "正文");
    }

    #[test]
    fn unlabelled_response_falls_back() {
        let raw = "# 用 Rust 重写一切\n\n正文。";
        let parsed = parse_rewrite_response(raw, "Rewrite it in Rust", LABEL);
        assert_eq!(parsed.title, "Rewrite it in Rust");
        assert_eq!(parsed.body, raw);
        assert!(parsed.used_fallback);
    }

    #[test]
    fn single_line_response_falls_back() {
        let parsed = parse_rewrite_response("标题: only a title", "Original", LABEL);
        assert_eq!(parsed.title, "Original");
        assert_eq!(parsed.body, "标题: only a title");
        assert!(parsed.used_fallback);
    }

    #[test]
    fn empty_response_falls_back() {
        let parsed = parse_rewrite_response("", "Original", LABEL);
        assert_eq!(parsed.title, "Original");
        assert_eq!(parsed.body, "");
        assert!(parsed.used_fallback);
    }

    #[test]
    fn empty_title_keeps_original() {
        let parsed = parse_rewrite_response("标题:   \n正文", "Original", LABEL);
        assert_eq!(parsed.title, "Original");
        assert_eq!(parsed.body, "正文");
        assert!(!parsed.used_fallback);
    }

    #[test]
    fn english_label() {
        let parsed = parse_rewrite_response("Title: Hello\nBody", "Orig", "Title:");
        assert_eq!(parsed.title, "Hello");
        assert_eq!(parsed.body, "Body");
    }

    #[test]
    fn fence_is_trimmed_from_body() {
        let raw = "标题: 标题\n```markdown\n## 小节\n\n内容\n```";
        let parsed = parse_rewrite_response(raw, "Original", LABEL);
        assert_eq!(parsed.body, "## 小节\n\n内容");
    }

    #[test]
    fn fence_is_trimmed_on_fallback() {
        let raw = "```markdown\n没有标题行\n```";
        let parsed = parse_rewrite_response(raw, "Original", LABEL);
        assert!(parsed.used_fallback);
        assert_eq!(parsed.body, "没有标题行");
    }

    #[test]
    fn trailing_code_fence_is_lost() {
        // Known limitation of the end trim.
        let body = "Intro\n\n```rust\nfn main() {}\n```";
        assert_eq!(strip_markdown_fence(body), "Intro\n\n```rust\nfn main() {}");
    }

    #[test]
    fn words_ending_in_marker_letters_survive() {
        assert_eq!(strip_markdown_fence("A breakdown"), "A breakdown");
        assert_eq!(strip_markdown_fence("```markdown\nmarkdown"), "markdown");
    }

    #[test]
    fn plain_body_is_untouched() {
        assert_eq!(strip_markdown_fence("  just text \n"), "just text");
    }
}
