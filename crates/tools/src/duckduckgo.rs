//! Keyless web search over the DuckDuckGo HTML endpoint.

use std::time::Duration;

use async_trait::async_trait;
use itinera_common::Result;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::search::{MAX_RESULTS, SearchHit, SearchQuery, format_hits};
use crate::{BROWSER_USER_AGENT, Tool, failure_text, parse_args, schema_of, tool_error};

const DDG_TIMEOUT_SECS: u64 = 15;

pub struct DuckDuckGoSearchTool {
    endpoint: String,
}

impl DuckDuckGoSearchTool {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.duckduckgo_url.clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(DDG_TIMEOUT_SECS))
            .build()
            .map_err(|e| tool_error(format!("failed to build http client: {e}")))?;

        let html = client
            .post(&self.endpoint)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!("q={}&b=", urlencoding::encode(query)))
            .send()
            .await
            .map_err(tool_error)?
            .error_for_status()
            .map_err(tool_error)?
            .text()
            .await
            .map_err(tool_error)?;

        Ok(parse_results(&html, MAX_RESULTS))
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information using DuckDuckGo"
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<SearchQuery>()
    }

    fn is_search(&self) -> bool {
        true
    }

    async fn call(&self, arguments: serde_json::Value) -> String {
        let args: SearchQuery = match parse_args(self.name(), arguments) {
            Ok(args) => args,
            Err(message) => return message,
        };

        debug!(query = %args.query, "DuckDuckGo search");
        match self.search(&args.query).await {
            Ok(hits) => format_hits(&hits),
            Err(e) => failure_text("Error performing DuckDuckGo search", &e),
        }
    }
}

/// Parse result blocks out of the HTML lite page.
///
/// Each block carries `<a class="result__a" href="...">TITLE</a>` followed by
/// `<a class="result__snippet" ...>SNIPPET</a>`.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    const MARKER: &str = "class=\"result__a\"";
    let mut hits = Vec::new();
    let mut pos = 0;

    while hits.len() < max_results {
        let Some(found) = html[pos..].find(MARKER) else {
            break;
        };
        let marker_pos = pos + found;
        pos = marker_pos + MARKER.len();

        let Some(a_start) = html[..marker_pos].rfind("<a ") else {
            continue;
        };
        let Some(a_tag_end) = html[a_start..].find('>').map(|i| a_start + i) else {
            continue;
        };
        let Some(href) = extract_attr(&html[a_start..a_tag_end], "href") else {
            continue;
        };

        let title_start = a_tag_end + 1;
        let Some(title_end) = html[title_start..].find("</a>").map(|i| title_start + i) else {
            continue;
        };
        let title = strip_tags(&html[title_start..title_end]);

        // The snippet sits shortly after the title link.
        let mut region_end = (title_end + 2000).min(html.len());
        while !html.is_char_boundary(region_end) {
            region_end -= 1;
        }
        let snippet = html
            .get(title_end..region_end)
            .and_then(|region| {
                let class_pos = region.find("class=\"result__snippet\"")?;
                let open_end = region[class_pos..].find('>')? + class_pos + 1;
                let close = region[open_end..].find("</a>")? + open_end;
                Some(strip_tags(&region[open_end..close]))
            })
            .unwrap_or_default();

        let url = resolve_redirect(&href);
        if !title.is_empty() && !url.is_empty() {
            hits.push(SearchHit {
                title,
                url,
                snippet,
            });
        }
        pos = title_end + "</a>".len();
    }

    hits
}

/// Links are wrapped as `//duckduckgo.com/l/?uddg=ENCODED&...`.
fn resolve_redirect(href: &str) -> String {
    if let Some(rest) = href
        .strip_prefix("//duckduckgo.com/l/?uddg=")
        .or_else(|| href.strip_prefix("/l/?uddg="))
    {
        let encoded = rest.split('&').next().unwrap_or(rest);
        urlencoding::decode(encoded)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| href.to_string())
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        String::new()
    }
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!("{attr}=\"");
    let start = tag.find(&pattern)? + pattern.len();
    let end = tag[start..].find('"')? + start;
    Some(decode_entities(&tag[start..end]))
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    decode_entities(out.trim())
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <div class="result">
          <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.japan-guide.com%2Fe%2Fe2164.html&amp;rut=abc">Tokyo Travel: <b>Japan</b> Guide</a>
          <a class="result__snippet" href="#">Everything about <b>Tokyo</b> &amp; surroundings.</a>
        </div>
        <div class="result">
          <a rel="nofollow" class="result__a" href="https://www.gotokyo.org/en/">GO TOKYO</a>
          <a class="result__snippet" href="#">Official travel guide.</a>
        </div>
    "##;

    #[test]
    fn parses_titles_urls_and_snippets() {
        let hits = parse_results(PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Tokyo Travel: Japan Guide");
        assert_eq!(hits[0].url, "https://www.japan-guide.com/e/e2164.html");
        assert_eq!(hits[0].snippet, "Everything about Tokyo & surroundings.");
        assert_eq!(hits[1].url, "https://www.gotokyo.org/en/");
    }

    #[test]
    fn respects_max_results() {
        let page = r##"
            <a class="result__a" href="https://a.com">A</a><a class="result__snippet" href="#">a</a>
            <a class="result__a" href="https://b.com">B</a><a class="result__snippet" href="#">b</a>
            <a class="result__a" href="https://c.com">C</a><a class="result__snippet" href="#">c</a>
        "##;
        let hits = parse_results(page, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].title, "B");
    }

    #[test]
    fn snippet_survives_multibyte_text_at_region_edge() {
        // Shift the padding so the snippet window ends on each byte of a
        // three-byte character in turn.
        for shift in 0..3 {
            let page = format!(
                r##"<a class="result__a" href="https://a.jp">東京</a>{}<a class="result__snippet" href="#">東京タワーの観光情報</a>{}"##,
                " ".repeat(shift),
                "あ".repeat(1000)
            );
            let hits = parse_results(&page, 5);
            assert_eq!(hits.len(), 1, "shift {shift}");
            assert_eq!(hits[0].title, "東京");
            assert_eq!(hits[0].snippet, "東京タワーの観光情報", "shift {shift}");
        }
    }

    #[test]
    fn skips_relative_links() {
        let page = r#"<a class="result__a" href="/settings">Settings</a>"#;
        assert!(parse_results(page, 5).is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_tool_error() {
        let tool = DuckDuckGoSearchTool::new("http://127.0.0.1:9/html/");
        let err = tool.search("Kyoto").await.unwrap_err();
        assert!(matches!(err, itinera_common::ItineraError::Tool(_)));
    }

    #[test]
    fn empty_page_has_no_results() {
        assert!(parse_results("<html><body>No results.</body></html>", 5).is_empty());
    }
}
