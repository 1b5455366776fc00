//! Rewrite prompt construction.

/// Marker appended to content cut at the length limit.
const TRUNCATION_MARKER: &str = "\n\n[... content truncated ...]";

/// Build the prompt asking for a `target_language` rewrite of a story.
///
/// The response must start with `title_label` followed by the new title on
/// the first line; [`parse_rewrite_response`](crate::parse_rewrite_response)
/// relies on that shape.
pub fn build_prompt(title: &str, content: &str, target_language: &str, title_label: &str) -> String {
    format!(
        "Rewrite the following article and its title in {target_language}, keeping the original \
structure and meaning as closely as possible. Output Markdown.
The content was scraped from a web page: remove meaningless fragments and anything unrelated \
to the article itself.

Rules:
1. Do not translate proper nouns, technical terms, product names, company names, or personal \
names; keep them exactly as in the original.
2. For example, JavaScript, Python, React, Vue, Docker, Kubernetes, GitHub, OpenAI, and Deno \
stay unchanged.
3. The title must read naturally in {target_language} while keeping the key technical terms.
4. The body must be fluent and easy to follow for {target_language} readers.

Title: {title}

Body:
{content}

Reply in exactly this format:
{title_label} [title in {target_language}]

[body in {target_language}]
"
    )
}

/// Cut `content` to at most `max_chars` characters, marking the cut.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &content[..byte_idx]),
    }
}
