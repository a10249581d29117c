//! Configuration management for reel.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (.reel/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources override earlier ones.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Providers the generation client knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .reel/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("openai" or "ollama")
    pub provider: String,

    /// Model used for standard answers
    pub model: String,

    /// Faster, cheaper model forced in turbo mode
    pub turbo_model: String,

    /// Explicit API key (overrides provider-specific env vars)
    pub api_key: Option<String>,

    /// Generation defaults
    pub generation: GenerationSettings,

    /// Evidence retrieval settings
    pub retrieval: RetrievalSettings,

    /// Local knowledge store settings
    pub knowledge: KnowledgeSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Reveal failure causes to users
    pub debug: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,
}

/// Temperature, length and history policy for standard answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of most recent turns sent to the model
    #[serde(default = "default_max_history")]
    pub max_conversation_history: usize,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_max_history() -> usize {
    10
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_conversation_history: default_max_history(),
        }
    }
}

/// Local and web evidence limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSettings {
    #[serde(default = "default_local_limit")]
    pub local_limit: usize,

    #[serde(default = "default_web_limit")]
    pub web_limit: usize,

    #[serde(default = "default_true")]
    pub web_enabled: bool,

    /// Pause between page fetches
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,

    /// Character budget for extracted page text
    #[serde(default = "default_page_char_limit")]
    pub page_char_limit: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_local_limit() -> usize {
    3
}

fn default_web_limit() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_fetch_delay_ms() -> u64 {
    1000
}

fn default_page_char_limit() -> usize {
    2000
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            local_limit: default_local_limit(),
            web_limit: default_web_limit(),
            web_enabled: true,
            fetch_delay_ms: default_fetch_delay_ms(),
            page_char_limit: default_page_char_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Where knowledge documents and the index live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSettings {
    /// Directory of plain-text documents loaded at startup (relative to workspace)
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,

    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("knowledge_base")
}

fn default_embedding_dim() -> usize {
    384
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        #[serde(rename = "turboModel")]
        turbo_model: Option<String>,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "turboModel")]
        turbo_model: Option<String>,
    },
}

impl ProviderConfig {
    /// Custom endpoint, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    generation: Option<GenerationSettings>,
    retrieval: Option<RetrievalSettings>,
    knowledge: Option<KnowledgeSettings>,
    logging: Option<LoggingConfig>,
    debug: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            turbo_model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            generation: GenerationSettings::default(),
            retrieval: RetrievalSettings::default(),
            knowledge: KnowledgeSettings::default(),
            log_level: None,
            log_format: LogFormat::Pretty,
            verbose: false,
            no_color: false,
            debug: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `REEL_WORKSPACE`: Override workspace path
    /// - `REEL_CONFIG`: Path to config file
    /// - `REEL_PROVIDER`, `REEL_MODEL`, `REEL_TURBO_MODEL`: model selection
    /// - `REEL_API_KEY`: API key
    /// - `REEL_DEBUG`: reveal failure causes
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use reel_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("REEL_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("REEL_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.reel_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("REEL_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("REEL_MODEL") {
            config.model = model;
        }

        if let Ok(model) = std::env::var("REEL_TURBO_MODEL") {
            config.turbo_model = model;
        }

        config.api_key = std::env::var("REEL_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if let Ok(debug) = std::env::var("REEL_DEBUG") {
            config.debug = matches!(debug.as_str(), "1" | "true" | "yes");
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(generation) = config_file.generation {
            result.generation = generation;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(knowledge) = config_file.knowledge {
            result.knowledge = knowledge;
        }

        if let Some(debug) = config_file.debug {
            result.debug = debug;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                let (model, turbo_model) = match provider_config {
                    ProviderConfig::OpenAI {
                        model, turbo_model, ..
                    }
                    | ProviderConfig::Ollama {
                        model, turbo_model, ..
                    } => (model, turbo_model),
                };
                result.model = model.clone();
                if let Some(turbo) = turbo_model {
                    result.turbo_model = turbo.clone();
                }
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        debug: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if debug {
            self.debug = true;
        }

        self
    }

    /// Get the path to the .reel directory.
    pub fn reel_dir(&self) -> PathBuf {
        self.workspace.join(".reel")
    }

    /// Ensure the .reel directory exists.
    pub fn ensure_reel_dir(&self) -> AppResult<()> {
        let reel_dir = self.reel_dir();
        if !reel_dir.exists() {
            std::fs::create_dir_all(&reel_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .reel directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path of the persistent semantic index.
    pub fn index_path(&self) -> PathBuf {
        self.reel_dir().join("index.sqlite")
    }

    /// Directory of documents loaded into the knowledge store.
    pub fn knowledge_dir(&self) -> PathBuf {
        if self.knowledge.path.is_absolute() {
            self.knowledge.path.clone()
        } else {
            self.workspace.join(&self.knowledge.path)
        }
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Custom endpoint for the active provider.
    pub fn provider_endpoint(&self) -> Option<String> {
        self.get_provider_config(&self.provider)
            .and_then(|pc| pc.endpoint().map(str::to_string))
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: explicit `REEL_API_KEY`, the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the OpenAI provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(&api_key_env) {
                return Some(key);
            }
        }

        if provider.eq_ignore_ascii_case("openai") {
            return std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.max_conversation_history == 0 {
            return Err(AppError::Config(
                "maxConversationHistory must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.turbo_model, "gpt-3.5-turbo");
        assert_eq!(config.generation.max_tokens, 1000);
        assert_eq!(config.generation.max_conversation_history, 10);
        assert_eq!(config.retrieval.local_limit, 3);
        assert_eq!(config.retrieval.web_limit, 2);
        assert!(!config.debug);
    }

    #[test]
    fn test_reel_dir() {
        let config = AppConfig::default();
        assert!(config.reel_dir().ends_with(".reel"));
        assert!(config.index_path().ends_with("index.sqlite"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
            true,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert!(overridden.debug);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_temperature() {
        let mut config = AppConfig::default();
        config.generation.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: "http://localhost:11434"
      model: llama3.2
      turboModel: llama3.2:1b
generation:
  temperature: 0.5
  maxTokens: 800
retrieval:
  webEnabled: false
debug: true
"#,
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.turbo_model, "llama3.2:1b");
        assert_eq!(config.generation.max_tokens, 800);
        assert_eq!(config.generation.max_conversation_history, 10);
        assert!(!config.retrieval.web_enabled);
        assert_eq!(config.retrieval.local_limit, 3);
        assert!(config.debug);
        assert_eq!(
            config.provider_endpoint().as_deref(),
            Some("http://localhost:11434")
        );
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = AppConfig {
            api_key: Some("sk-test".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.resolve_api_key("openai").as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = AppConfig {
            provider: "ollama".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.resolve_api_key("ollama").is_none());
    }
}
