//! Planner configuration.
//!
//! Loaded from TOML, then completed from the environment:
//! `OPENAI_API_KEY` fills a missing model key and `EXA_API_KEY` a missing Exa key.
//!
//! # Config file checks (Unix)
//!
//! - The path must be a regular file
//! - World-writable files are rejected
//! - Files holding an API key must not be world-readable

use std::path::{Path, PathBuf};

use itinera_agents::{AgentSettings, DEFAULT_MAX_TOOL_ROUNDS};
use itinera_common::{ItineraError, Result};
use itinera_llm::LlmConfig;
use itinera_tools::ToolsConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const EXA_API_KEY_ENV: &str = "EXA_API_KEY";

/// Top-level planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Language model provider
    #[serde(default)]
    pub provider: LlmConfig,

    /// Research tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Directory saved itineraries are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Tool-call rounds an agent may use before it must answer
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("travel_plans")
}

fn default_max_tool_rounds() -> usize {
    DEFAULT_MAX_TOOL_ROUNDS
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            provider: LlmConfig::default(),
            tools: ToolsConfig::default(),
            output_dir: default_output_dir(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file, checking its permissions first.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let config = Self::from_file_unchecked(path)?;

        if config.provider.api_key.is_some() || config.tools.exa_api_key.is_some() {
            warn!(
                "API key found in config file '{}'. Prefer environment variables \
                 (OPENAI_API_KEY, EXA_API_KEY) or a .env file.",
                path.display()
            );
        }

        Ok(config)
    }

    /// Load configuration from a TOML file without permission checks.
    pub fn from_file_unchecked(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise, then apply the environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Fill missing keys from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Fill missing keys using `lookup`. Explicit keys always win.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if !self.provider.has_api_key()
            && let Some(var) = self.provider.api_key_env_var()
        {
            self.provider.api_key = lookup(var).filter(|k| !k.trim().is_empty());
        }
        if !self.tools.has_exa_key() {
            self.tools.exa_api_key = lookup(EXA_API_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
    }

    /// Fail fast when the model provider needs a credential that is missing.
    pub fn validate(&self) -> Result<()> {
        if self.provider.requires_api_key() && !self.provider.has_api_key() {
            let var = self.provider.api_key_env_var().unwrap_or("the provider API key");
            return Err(ItineraError::Config(format!(
                "No API key for provider '{}'. Set {var} or provide a key.",
                self.provider.provider
            )));
        }
        if self.max_tool_rounds == 0 {
            return Err(ItineraError::Config(
                "max_tool_rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            temperature: self.provider.temperature,
            max_tokens: self.provider.max_tokens,
            max_tool_rounds: self.max_tool_rounds,
        }
    }
}

#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let permission_bits = metadata.permissions().mode() & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).unwrap_or_default();
    let has_api_key = content.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("api_key") || line.starts_with("exa_api_key")
    });

    if has_api_key && permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             Fix with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    if has_api_key && permission_bits & 0o040 != 0 {
        warn!(
            "Config file '{}' contains an API key and is group-readable (mode {:04o}). \
             Consider: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}
