//! Research tools that agents can call during a model invocation.
//!
//! Every tool takes a JSON arguments object and returns plain text. Failures
//! (network, parsing, missing configuration) come back as text starting with
//! `Error` so the model can read them and adapt; tools never return `Err`.
//!
//! - [`ExaSearchTool`] - semantic web search (needs an Exa API key)
//! - [`DuckDuckGoSearchTool`] - keyless web search over the HTML endpoint
//! - [`WebsiteSearchTool`] - fetch one page and extract its text
//! - [`WeatherInfoTool`] - geocode a place, then fetch current conditions and forecast
//!
//! [`Toolbox::detect`] decides at startup which of these are available.

pub mod config;
pub mod duckduckgo;
pub mod exa;
pub mod search;
pub mod toolbox;
pub mod weather;
pub mod website;

use async_trait::async_trait;
use itinera_common::ItineraError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

pub use config::ToolsConfig;
pub use duckduckgo::DuckDuckGoSearchTool;
pub use exa::ExaSearchTool;
pub use search::SearchHit;
pub use toolbox::{ToolNeeds, Toolbox};
pub use weather::{WeatherInfoTool, describe_weather_code};
pub use website::WebsiteSearchTool;

/// User agent sent by the page-fetching tools.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A callable lookup function offered to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name the model calls (e.g. "weather_info").
    fn name(&self) -> &str;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    /// Whether this tool answers general web-search queries.
    fn is_search(&self) -> bool {
        false
    }

    /// Run the tool. Always returns text, errors included.
    async fn call(&self, arguments: serde_json::Value) -> String;
}

/// JSON schema for an arguments type, without the `$schema` marker.
pub(crate) fn schema_of<T: JsonSchema>() -> serde_json::Value {
    let mut value = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(map) = value.as_object_mut() {
        map.remove("$schema");
    }
    value
}

/// Decode tool arguments, turning failures into model-readable text.
pub(crate) fn parse_args<T: DeserializeOwned>(
    tool: &str,
    arguments: serde_json::Value,
) -> std::result::Result<T, String> {
    serde_json::from_value(arguments)
        .map_err(|e| format!("Error: invalid arguments for {tool}: {e}"))
}

/// Wrap a failed lookup step.
pub(crate) fn tool_error(err: impl std::fmt::Display) -> ItineraError {
    ItineraError::Tool(err.to_string())
}

/// `<prefix>: <detail>`, the text a model sees for a failed lookup.
pub(crate) fn failure_text(prefix: &str, err: &ItineraError) -> String {
    match err {
        ItineraError::Tool(detail) => format!("{prefix}: {detail}"),
        other => format!("{prefix}: {other}"),
    }
}
