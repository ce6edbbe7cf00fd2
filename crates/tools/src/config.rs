//! Tool configuration, usually the `[tools]` table of the planner config.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EXA_URL: &str = "https://api.exa.ai/search";
pub const DEFAULT_DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Exa API key. If not set, falls back to EXA_API_KEY when the
    /// configuration is loaded; without a key the Exa tool is not offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exa_api_key: Option<String>,

    #[serde(default = "default_exa_url")]
    pub exa_url: String,

    /// Whether the keyless DuckDuckGo search tool is offered
    #[serde(default = "default_true")]
    pub enable_duckduckgo: bool,

    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,

    /// Timeout for the website extraction request, in seconds
    #[serde(default = "default_website_timeout")]
    pub website_timeout_secs: u64,

    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
}

fn default_exa_url() -> String {
    DEFAULT_EXA_URL.into()
}

fn default_true() -> bool {
    true
}

fn default_duckduckgo_url() -> String {
    DEFAULT_DUCKDUCKGO_URL.into()
}

fn default_website_timeout() -> u64 {
    10
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.into()
}

fn default_forecast_url() -> String {
    DEFAULT_FORECAST_URL.into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            exa_api_key: None,
            exa_url: default_exa_url(),
            enable_duckduckgo: true,
            duckduckgo_url: default_duckduckgo_url(),
            website_timeout_secs: default_website_timeout(),
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
        }
    }
}

impl ToolsConfig {
    pub fn has_exa_key(&self) -> bool {
        self.exa_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config: ToolsConfig = toml::from_str("").unwrap();
        assert!(config.enable_duckduckgo);
        assert!(!config.has_exa_key());
        assert_eq!(config.website_timeout_secs, 10);
        assert_eq!(config.forecast_url, DEFAULT_FORECAST_URL);
    }

    #[test]
    fn overrides_are_read() {
        let config: ToolsConfig = toml::from_str(
            r#"
exa_api_key = "exa-test"
enable_duckduckgo = false
website_timeout_secs = 3
"#,
        )
        .unwrap();
        assert!(config.has_exa_key());
        assert!(!config.enable_duckduckgo);
        assert_eq!(config.website_timeout_secs, 3);
    }
}
