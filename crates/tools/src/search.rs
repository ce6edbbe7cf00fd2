//! Result formatting shared by the search tools.

use schemars::JsonSchema;
use serde::Deserialize;

/// Maximum number of hits a search tool reports.
pub const MAX_RESULTS: usize = 5;

/// Arguments accepted by the search tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// Search query string
    pub query: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Render hits as a numbered list; "No results found." when empty.
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   Snippet: {}...\n",
                i + 1,
                hit.title,
                hit.url,
                hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First `max` characters of `text`, on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
