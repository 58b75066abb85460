use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use acemock_core::config::{ExecutionConfig, LlmConfig};

use crate::cli::CliArgs;

/// CLI configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default LLM provider name (gemini, openai, anthropic, ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Default model per provider
    #[serde(default)]
    pub default_models: HashMap<String, String>,

    /// API keys keyed by provider name
    #[serde(default)]
    pub api_keys: HashMap<String, String>,

    /// Piston base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piston_url: Option<String>,
}

fn env_is_set(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| !v.is_empty())
}

fn api_key_env(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" | "google" => Some("GEMINI_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

fn model_env(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" | "google" => Some("GEMINI_MODEL"),
        "openai" => Some("OPENAI_MODEL"),
        "anthropic" | "claude" => Some("ANTHROPIC_MODEL"),
        "ollama" => Some("OLLAMA_MODEL"),
        _ => None,
    }
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/acemock/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("acemock");
        Ok(config_dir)
    }

    /// Return the default config file path.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from the given path, or the default path.
    /// A missing file yields the default (empty) config.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            debug!(?config_path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        debug!(?config_path, "Loading config");
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", config_path.display()))
    }

    /// Resolve the provider name.
    /// Priority: cli_override > env var > config file > built-in default.
    pub fn resolve_provider(&self, cli_override: Option<&str>, env_default: &str) -> String {
        if let Some(p) = cli_override {
            return p.to_lowercase();
        }
        if env_is_set("LLM_PROVIDER") {
            return env_default.to_string();
        }
        self.default_provider
            .clone()
            .unwrap_or_else(|| env_default.to_string())
    }

    /// Resolve an API key for the given provider.
    /// Priority: cli_override > env var > config file.
    pub fn resolve_api_key(&self, provider: &str, cli_override: Option<&str>) -> Option<String> {
        if let Some(key) = cli_override {
            return Some(key.to_string());
        }
        if let Some(var) = api_key_env(provider) {
            if let Ok(key) = std::env::var(var) {
                if !key.is_empty() {
                    return Some(key);
                }
            }
        }
        self.api_keys.get(provider).cloned()
    }

    /// Resolve a model override. `None` keeps the provider default.
    /// Priority: cli_override > env var > config file.
    pub fn resolve_model(&self, provider: &str, cli_override: Option<&str>) -> Option<String> {
        if let Some(model) = cli_override {
            return Some(model.to_string());
        }
        if model_env(provider).is_some_and(env_is_set) {
            return None;
        }
        self.default_models.get(provider).cloned()
    }

    /// Layer CLI flags and file values over the environment-derived config.
    pub fn apply(&self, args: &CliArgs, llm: &mut LlmConfig, execution: &mut ExecutionConfig) {
        llm.provider = self.resolve_provider(args.provider.as_deref(), &llm.provider);
        let provider = llm.provider.clone();

        if let Some(key) = self.resolve_api_key(&provider, args.api_key.as_deref()) {
            match provider.as_str() {
                "openai" => llm.openai_api_key = Some(key),
                "anthropic" | "claude" => llm.anthropic_api_key = Some(key),
                "ollama" => {}
                _ => llm.gemini_api_key = Some(key),
            }
        }

        if let Some(model) = self.resolve_model(&provider, args.model.as_deref()) {
            match provider.as_str() {
                "openai" => llm.openai_model = model,
                "anthropic" | "claude" => llm.anthropic_model = model,
                "ollama" => llm.ollama_model = model,
                _ => llm.gemini_model = model,
            }
        }

        if let Some(url) = &self.piston_url {
            if !env_is_set("PISTON_URL") {
                execution.piston_url = url.clone();
            }
        }
    }
}
