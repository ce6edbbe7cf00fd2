//! Semantic web search over the Exa API.

use async_trait::async_trait;
use itinera_common::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ToolsConfig;
use crate::search::{MAX_RESULTS, SearchHit, SearchQuery, format_hits, truncate_chars};
use crate::{Tool, failure_text, parse_args, schema_of, tool_error};

const SNIPPET_CHARS: usize = 200;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: &'a str,
    num_results: usize,
    use_autoprompt: bool,
    contents: ExaContents,
}

#[derive(Serialize)]
struct ExaContents {
    text: bool,
}

#[derive(Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct ExaSearchTool {
    api_key: Option<String>,
    endpoint: String,
    http: reqwest::Client,
}

impl ExaSearchTool {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ToolsConfig) -> Self {
        Self::new(config.exa_api_key.clone(), config.exa_url.clone())
    }

    async fn search(&self, api_key: &str, query: &str) -> Result<Vec<SearchHit>> {
        let body = ExaRequest {
            query,
            num_results: MAX_RESULTS,
            use_autoprompt: true,
            contents: ExaContents { text: true },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(tool_error)?
            .error_for_status()
            .map_err(tool_error)?;

        let parsed: ExaResponse = response.json().await.map_err(tool_error)?;

        Ok(parsed
            .results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|r| SearchHit {
                title: r.title.unwrap_or_else(|| "No title".to_string()),
                url: r.url,
                snippet: truncate_chars(r.text.as_deref().unwrap_or(""), SNIPPET_CHARS)
                    .to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl Tool for ExaSearchTool {
    fn name(&self) -> &str {
        "exa_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information using Exa's semantic search API"
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
        let Some(api_key) = self.api_key.as_deref() else {
            return "Error: EXA_API_KEY environment variable not set.".to_string();
        };

        debug!(query = %args.query, "Exa search");
        match self.search(api_key, &args.query).await {
            Ok(hits) => format_hits(&hits),
            Err(e) => failure_text("Error performing Exa search", &e),
        }
    }
}
