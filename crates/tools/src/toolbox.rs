//! Startup-time detection of the tools this process can offer.

use std::sync::Arc;

use itinera_common::{ItineraError, Result};
use tracing::{info, warn};

use crate::config::ToolsConfig;
use crate::{DuckDuckGoSearchTool, ExaSearchTool, Tool, WeatherInfoTool, WebsiteSearchTool};

/// Which kinds of tool a role may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolNeeds {
    pub search: bool,
    pub website: bool,
    pub weather: bool,
}

impl ToolNeeds {
    pub const NONE: ToolNeeds = ToolNeeds {
        search: false,
        website: false,
        weather: false,
    };
    pub const RESEARCH: ToolNeeds = ToolNeeds {
        search: true,
        website: true,
        weather: false,
    };
    pub const RESEARCH_WITH_WEATHER: ToolNeeds = ToolNeeds {
        search: true,
        website: true,
        weather: true,
    };
}

/// The set of tools detected at startup.
#[derive(Clone)]
pub struct Toolbox {
    search: Vec<Arc<dyn Tool>>,
    website: Arc<dyn Tool>,
    weather: Arc<dyn Tool>,
}

impl Toolbox {
    /// Construct every available tool from configuration.
    ///
    /// Exa is offered when a key is configured, DuckDuckGo when enabled.
    /// Fails with a configuration error when neither search tool is available.
    pub fn detect(config: &ToolsConfig) -> Result<Self> {
        let mut search: Vec<Arc<dyn Tool>> = Vec::new();

        if config.has_exa_key() {
            info!(tool = "exa_search", "Search tool available");
            search.push(Arc::new(ExaSearchTool::from_config(config)));
        } else {
            warn!(tool = "exa_search", "EXA_API_KEY not set, Exa search disabled");
        }

        if config.enable_duckduckgo {
            info!(tool = "duckduckgo_search", "Search tool available");
            search.push(Arc::new(DuckDuckGoSearchTool::from_config(config)));
        } else {
            info!(tool = "duckduckgo_search", "DuckDuckGo search disabled by configuration");
        }

        if search.is_empty() {
            return Err(ItineraError::Config(
                "No search tools available: set EXA_API_KEY or enable DuckDuckGo search"
                    .to_string(),
            ));
        }

        Ok(Self {
            search,
            website: Arc::new(WebsiteSearchTool::from_config(config)),
            weather: Arc::new(WeatherInfoTool::from_config(config)),
        })
    }

    pub fn search_tools(&self) -> &[Arc<dyn Tool>] {
        &self.search
    }

    /// Tools matching `needs`, search tools first.
    pub fn select(&self, needs: ToolNeeds) -> Vec<Arc<dyn Tool>> {
        let mut tools = Vec::new();
        if needs.search {
            tools.extend(self.search.iter().cloned());
        }
        if needs.website {
            tools.push(Arc::clone(&self.website));
        }
        if needs.weather {
            tools.push(Arc::clone(&self.weather));
        }
        tools
    }
}
