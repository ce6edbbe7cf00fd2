//! Fetch a single page and extract readable text from it.

use std::time::Duration;

use async_trait::async_trait;
use itinera_common::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::search::truncate_chars;
use crate::{BROWSER_USER_AGENT, Tool, failure_text, parse_args, schema_of, tool_error};

const MAX_CONTENT_CHARS: usize = 2000;
const MAX_MATCHING_PARAGRAPHS: usize = 5;
const RENDER_WIDTH: usize = 200;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WebsiteQuery {
    /// URL of the website to search
    pub url: String,
    /// Optional query to search within the website
    #[serde(default)]
    pub query: Option<String>,
}

pub struct WebsiteSearchTool {
    timeout: Duration,
}

impl WebsiteSearchTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(Duration::from_secs(config.website_timeout_secs))
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| tool_error(format!("failed to build http client: {e}")))?;

        let bytes = client
            .get(url)
            .send()
            .await
            .map_err(tool_error)?
            .error_for_status()
            .map_err(tool_error)?
            .bytes()
            .await
            .map_err(tool_error)?;

        let html = String::from_utf8_lossy(&bytes);
        let html = strip_element(&strip_element(&html, "script"), "style");
        let rendered = html2text::from_read(html.as_bytes(), RENDER_WIDTH)
            .map_err(|e| tool_error(format!("html2text error: {e}")))?;

        Ok(clean_text(&rendered))
    }
}

#[async_trait]
impl Tool for WebsiteSearchTool {
    fn name(&self) -> &str {
        "website_search"
    }

    fn description(&self) -> &str {
        "Search and extract information from a specific website URL"
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<WebsiteQuery>()
    }

    async fn call(&self, arguments: serde_json::Value) -> String {
        let args: WebsiteQuery = match parse_args(self.name(), arguments) {
            Ok(args) => args,
            Err(message) => return message,
        };

        debug!(url = %args.url, query = ?args.query, "Website extraction");
        match self.fetch_text(&args.url).await {
            Ok(text) => summarize(&args.url, args.query.as_deref(), &text),
            Err(e) => failure_text("Error extracting information from website", &e),
        }
    }
}

/// Render extracted page text, preferring paragraphs that mention `query`.
pub(crate) fn summarize(url: &str, query: Option<&str>, text: &str) -> String {
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        let needle = query.to_lowercase();
        let relevant: Vec<&str> = text
            .split("\n\n")
            .filter(|p| p.to_lowercase().contains(&needle))
            .take(MAX_MATCHING_PARAGRAPHS)
            .collect();

        if !relevant.is_empty() {
            return format!(
                "Information from {url} related to '{query}':\n\n{}",
                relevant.join("\n\n")
            );
        }
    }

    let head = truncate_chars(text, MAX_CONTENT_CHARS);
    let ellipsis = if head.len() < text.len() { "..." } else { "" };
    format!("Information from {url}:\n\n{head}{ellipsis}")
}

/// Trim lines, split on runs of double spaces, drop empty fragments.
/// Blank lines survive (collapsed to one) as paragraph boundaries.
fn clean_text(rendered: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in rendered.lines() {
        let line = line.trim();
        if line.is_empty() {
            if out.last().is_some_and(|last| !last.is_empty()) {
                out.push("");
            }
            continue;
        }
        out.extend(line.split("  ").map(str::trim).filter(|c| !c.is_empty()));
    }
    while out.last().is_some_and(|last| last.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Remove every `<tag ...>...</tag>` block, case-insensitively.
fn strip_element(html: &str, tag: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(found) = lower[pos..].find(&open) {
        let start = pos + found;
        out.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => {
                pos = html.len();
                break;
            }
        }
    }
    out.push_str(&html[pos..]);
    out
}
