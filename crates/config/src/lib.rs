//! Configuration loading, validation, and management for FinSight.
//!
//! Two sources, both read once at process start:
//! - Required service identifiers from the environment (model, knowledge
//!   base, history table, guardrail, region). Absence is fatal.
//! - Optional tunables from `~/.finsight/config.toml` (or `FINSIGHT_CONFIG`),
//!   every field defaulted.

use finsight_core::provider::GuardrailConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_MODEL_ID: &str = "LLM_MODEL_ID";
pub const ENV_KB_ID: &str = "KB_ID";
pub const ENV_HISTORY_TABLE: &str = "CHAT_HISTORY_TBL_NM";
pub const ENV_GUARDRAIL_ID: &str = "BEDROCK_GUARDRAILSID";
pub const ENV_GUARDRAIL_VERSION: &str = "BEDROCK_GUARDRAILSVERSION";
pub const ENV_REGION: &str = "AWS_REGION";

/// Identifiers of the managed services this process talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceIdentifiers {
    pub model_id: String,
    pub knowledge_base_id: String,
    pub history_table: String,
    pub guardrail_id: String,
    pub guardrail_version: String,
    pub region: String,
}

impl ServiceIdentifiers {
    /// Read every identifier from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read every identifier through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
        };

        Ok(Self {
            model_id: required(ENV_MODEL_ID)?,
            knowledge_base_id: required(ENV_KB_ID)?,
            history_table: required(ENV_HISTORY_TABLE)?,
            guardrail_id: required(ENV_GUARDRAIL_ID)?,
            guardrail_version: required(ENV_GUARDRAIL_VERSION)?,
            region: required(ENV_REGION)?,
        })
    }

    pub fn guardrail(&self) -> GuardrailConfig {
        GuardrailConfig {
            identifier: self.guardrail_id.clone(),
            version: self.guardrail_version.clone(),
        }
    }
}

/// Optional tunables, mapped directly to `config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Bearer token for the runtime endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model invocation settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Knowledge base retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chat history settings
    #[serde(default)]
    pub history: HistoryConfig,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("retrieval", &self.retrieval)
            .field("history", &self.history)
            .finish()
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after a rate-limited call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Longest wait before a retry; a throttle asking for more fails fast.
    /// Defaults to `timeout_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_backoff_secs: Option<u64>,

    /// Override the region-derived runtime endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_temperature() -> f32 {
    0.2
}
fn default_top_p() -> f32 {
    0.99
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_model_timeout() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}

impl ModelConfig {
    /// Effective retry ceiling in seconds.
    pub fn max_backoff_secs(&self) -> u64 {
        self.max_backoff_secs.unwrap_or(self.timeout_secs)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_backoff_secs: None,
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Passages retrieved for conversational chat
    #[serde(default = "default_top_k")]
    pub chat_top_k: usize,

    /// Passages retrieved for single-shot RAG queries
    #[serde(default = "default_top_k")]
    pub rag_top_k: usize,

    /// Passages returned by the knowledge base tool
    #[serde(default = "default_tool_top_k")]
    pub tool_top_k: usize,

    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u64,

    /// Override the region-derived agent runtime endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_top_k() -> usize {
    5
}
fn default_tool_top_k() -> usize {
    3
}
fn default_retrieval_timeout() -> u64 {
    15
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chat_top_k: default_top_k(),
            rag_top_k: default_top_k(),
            tool_top_k: default_tool_top_k(),
            timeout_secs: default_retrieval_timeout(),
            endpoint: None,
        }
    }
}

/// Which history store backs conversational sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBackendKind {
    #[default]
    Sqlite,
    Memory,
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: HistoryBackendKind,

    /// SQLite database file (default: ~/.finsight/history.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load tunables from a specific file path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if !(self.model.top_p > 0.0 && self.model.top_p <= 1.0) {
            return Err(ConfigError::ValidationError(
                "model.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError("model.max_tokens must be > 0".into()));
        }

        let r = &self.retrieval;
        if r.chat_top_k == 0 || r.rag_top_k == 0 || r.tool_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "retrieval top_k values must be > 0".into(),
            ));
        }

        Ok(())
    }
}

/// The complete, validated process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub identifiers: ServiceIdentifiers,
    pub settings: Settings,
}

impl AppConfig {
    /// Load configuration from the environment and the default config file.
    ///
    /// The file path is `FINSIGHT_CONFIG` if set, else `~/.finsight/config.toml`.
    /// The bearer token may come from `FINSIGHT_API_KEY` or
    /// `AWS_BEARER_TOKEN_BEDROCK` (env wins over the file).
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FINSIGHT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"));
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Load configuration from `path`, reading environment values through `lookup`.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identifiers = ServiceIdentifiers::from_lookup(&lookup)?;
        let mut settings = Settings::load_from(path)?;

        if let Some(key) = lookup("FINSIGHT_API_KEY").or_else(|| lookup("AWS_BEARER_TOKEN_BEDROCK")) {
            settings.api_key = Some(key);
        }

        settings.validate()?;
        Ok(Self { identifiers, settings })
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".finsight")
    }

    /// Model inference endpoint.
    pub fn runtime_endpoint(&self) -> String {
        self.settings
            .model
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.identifiers.region))
    }

    /// Knowledge base retrieval endpoint.
    pub fn agent_runtime_endpoint(&self) -> String {
        self.settings.retrieval.endpoint.clone().unwrap_or_else(|| {
            format!("https://bedrock-agent-runtime.{}.amazonaws.com", self.identifiers.region)
        })
    }

    /// SQLite history file.
    pub fn history_path(&self) -> PathBuf {
        self.settings
            .history
            .path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("history.db"))
    }

    /// Render the effective configuration (secrets redacted) as TOML.
    pub fn redacted_toml(&self) -> String {
        #[derive(Serialize)]
        struct View<'a> {
            api_key: &'static str,
            identifiers: &'a ServiceIdentifiers,
            model: &'a ModelConfig,
            retrieval: &'a RetrievalConfig,
            history: &'a HistoryConfig,
        }

        let view = View {
            api_key: redact(&self.settings.api_key),
            identifiers: &self.identifiers,
            model: &self.settings.model,
            retrieval: &self.settings.retrieval,
            history: &self.settings.history,
        };
        toml::to_string_pretty(&view).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingEnv(String),

    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (ENV_MODEL_ID, "amazon.nova-pro-v1:0".to_string()),
            (ENV_KB_ID, "KB12345".to_string()),
            (ENV_HISTORY_TABLE, "chat-history".to_string()),
            (ENV_GUARDRAIL_ID, "gr-abc".to_string()),
            (ENV_GUARDRAIL_VERSION, "1".to_string()),
            (ENV_REGION, "us-east-1".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>, path: &Path) -> Result<AppConfig, ConfigError> {
        AppConfig::load_with(path, |k| env.get(k).cloned())
    }

    #[test]
    fn identifiers_from_full_env() {
        let env = full_env();
        let config = load(&env, Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.identifiers.model_id, "amazon.nova-pro-v1:0");
        assert_eq!(config.identifiers.guardrail().version, "1");
        assert_eq!(config.settings.model.max_tokens, 4096);
        assert_eq!(config.settings.retrieval.chat_top_k, 5);
        assert_eq!(config.settings.retrieval.tool_top_k, 3);
    }

    #[test]
    fn each_missing_identifier_is_fatal() {
        for key in [
            ENV_MODEL_ID,
            ENV_KB_ID,
            ENV_HISTORY_TABLE,
            ENV_GUARDRAIL_ID,
            ENV_GUARDRAIL_VERSION,
            ENV_REGION,
        ] {
            let mut env = full_env();
            env.remove(key);
            let err = load(&env, Path::new("/nonexistent/config.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnv(ref k) if k == key));
        }
    }

    #[test]
    fn blank_identifier_counts_as_missing() {
        let mut env = full_env();
        env.insert(ENV_KB_ID, "   ".into());
        let err = load(&env, Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(_)));
    }

    #[test]
    fn endpoints_follow_region() {
        let config = load(&full_env(), Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.runtime_endpoint(), "https://bedrock-runtime.us-east-1.amazonaws.com");
        assert_eq!(
            config.agent_runtime_endpoint(),
            "https://bedrock-agent-runtime.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn tunables_parsed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[model]
temperature = 0.5
endpoint = "http://localhost:9000"

[retrieval]
rag_top_k = 3

[history]
backend = "memory"
"#,
        )
        .unwrap();

        let config = load(&full_env(), &path).unwrap();
        assert!((config.settings.model.temperature - 0.5).abs() < f32::EPSILON);
        assert!((config.settings.model.top_p - 0.99).abs() < f32::EPSILON);
        assert_eq!(config.settings.retrieval.rag_top_k, 3);
        assert_eq!(config.settings.retrieval.chat_top_k, 5);
        assert_eq!(config.settings.history.backend, HistoryBackendKind::Memory);
        assert_eq!(config.runtime_endpoint(), "http://localhost:9000");
    }

    #[test]
    fn invalid_top_p_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ntop_p = 0.0\n").unwrap();
        let err = load(&full_env(), &path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn nan_top_p_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ntop_p = nan\n").unwrap();
        let err = load(&full_env(), &path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn max_backoff_defaults_to_model_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ntimeout_secs = 30\n").unwrap();
        let config = load(&full_env(), &path).unwrap();
        assert_eq!(config.settings.model.max_backoff_secs(), 30);

        std::fs::write(&path, "[model]\ntimeout_secs = 30\nmax_backoff_secs = 5\n").unwrap();
        let config = load(&full_env(), &path).unwrap();
        assert_eq!(config.settings.model.max_backoff_secs(), 5);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model\ntemperature = ").unwrap();
        let err = load(&full_env(), &path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn api_key_from_env_and_redacted() {
        let mut env = full_env();
        env.insert("AWS_BEARER_TOKEN_BEDROCK", "secret-token".into());
        let config = load(&env, Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.settings.api_key.as_deref(), Some("secret-token"));
        assert!(!format!("{:?}", config).contains("secret-token"));
        assert!(!config.redacted_toml().contains("secret-token"));
        assert!(config.redacted_toml().contains("KB12345"));
    }
}
