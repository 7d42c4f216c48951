use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::translator::FallbackPhrase;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub assistant_config: AssistantConfig,
    #[serde(default)]
    pub translator_config: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call `/api/*` with credentials.
    /// Empty means any origin, without credentials.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Connection settings for the hosted assistant provider
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_run_timeout_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    30
}

// Hand-written so the credential never reaches the logs.
impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("assistant_id", &self.assistant_id)
            .field("base_url", &self.base_url)
            .field("organization_id", &self.organization_id)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AssistantConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.assistant_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Reply classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_fallback_phrases")]
    pub fallback_phrases: Vec<FallbackPhrase>,
    /// Replies shorter than this (after trimming) count as "not found".
    /// `null` disables the length check.
    #[serde(default = "default_min_reply_chars")]
    pub min_reply_chars: Option<usize>,
    #[serde(default)]
    pub uppercase_post_codes: bool,
}

fn default_fallback_phrases() -> Vec<FallbackPhrase> {
    crate::translator::FallbackPolicy::default().phrases
}

fn default_min_reply_chars() -> Option<usize> {
    crate::translator::FallbackPolicy::default().min_reply_chars
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            base_url: default_base_url(),
            organization_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            fallback_phrases: default_fallback_phrases(),
            min_reply_chars: default_min_reply_chars(),
            uppercase_post_codes: false,
        }
    }
}

impl Config {
    /// Load a JSON or YAML config file, substituting `${VAR}` placeholders
    /// from the environment.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let content = substitute_env_vars(&raw, |name| std::env::var(name).ok());

        let mut config = Self::parse(&content, path)?;

        // An unset variable leaves its placeholder behind; treat it as missing
        let unresolved = |v: &String| v.starts_with("${");
        let assistant = &mut config.assistant_config;
        assistant.api_key = assistant.api_key.take().filter(|v| !unresolved(v));
        assistant.assistant_id = assistant.assistant_id.take().filter(|v| !unresolved(v));
        assistant.organization_id = assistant.organization_id.take().filter(|v| !unresolved(v));

        Ok(config)
    }

    fn parse(content: &str, path: &str) -> Result<Self> {
        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Invalid JSON configuration in {}", path))?
        } else {
            serde_yaml::from_str(content)
                .with_context(|| format!("Invalid YAML configuration in {}", path))?
        };
        Ok(config)
    }

    /// Load the explicitly requested file, or else the first candidate
    /// that exists. Only missing candidates are skipped: a file that is
    /// present but invalid, or a missing explicit path, is an error.
    /// Defaults are used when no candidate exists.
    pub fn load_first(explicit: Option<&str>, candidates: &[String]) -> Result<(Self, Option<String>)> {
        if let Some(path) = explicit {
            let config = Self::load(path)
                .with_context(|| format!("CONFIG_PATH is set but {} could not be loaded", path))?;
            return Ok((config, Some(path.to_string())));
        }

        for path in candidates {
            if !Path::new(path).exists() {
                debug!("No config file at {}", path);
                continue;
            }
            return Ok((Self::load(path)?, Some(path.clone())));
        }
        Ok((Self::default(), None))
    }

    /// Apply process environment overrides on top of the file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.assistant_config.api_key = Some(key);
        }
        if let Some(id) = non_empty("ASSISTANT_ID") {
            self.assistant_config.assistant_id = Some(id);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.assistant_config.base_url = url;
        }
        if let Some(host) = non_empty("HOST") {
            self.system_config.host = host;
        }
        if let Some(port) = non_empty("PORT").and_then(|p| p.parse().ok()) {
            self.system_config.port = port;
        }
        self
    }
}

/// Replace `${VAR_NAME}` with the looked-up value, leaving unknown
/// placeholders untouched.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
