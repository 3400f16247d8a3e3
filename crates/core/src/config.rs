//! Configuration management for LifeCapsule.
//!
//! Configuration is merged from several layers, later layers winning:
//! - Built-in defaults
//! - Config file (`.lifecapsule/config.yaml` in the workspace)
//! - Environment variables
//! - Command-line flags
//!
//! The workspace directory holds the diary file and the `.lifecapsule/`
//! directory with configuration and prompt overrides.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Providers the LLM factory knows how to build.
pub const KNOWN_LLM_PROVIDERS: [&str; 1] = ["ollama"];

/// Providers the embedding factory knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.lifecapsule/` and, by default, the diary)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Diary file; relative paths resolve against the workspace
    pub diary_path: PathBuf,

    /// HTTP bind address
    pub bind: String,

    /// Completion provider (currently only "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Provider endpoint override
    pub endpoint: Option<String>,

    /// Request timeout for model calls, in seconds
    pub timeout_secs: Option<u64>,

    /// Embedding settings
    pub embeddings: EmbeddingSettings,

    /// Knowledge base settings
    pub knowledge: KnowledgeSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    #[serde(skip)]
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Expected vector dimensions; `None` accepts whatever the model returns
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            dimensions: None,
        }
    }
}

/// Segmentation and retrieval settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Maximum chunk size in characters
    #[serde(rename = "chunkSize", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[serde(rename = "chunkOverlap", default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks handed to the model per question
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerSection>,
    diary: Option<DiarySection>,
    llm: Option<LlmSection>,
    embeddings: Option<EmbeddingsSection>,
    knowledge: Option<KnowledgeSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiarySection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    endpoint: Option<String>,
    model: Option<String>,
    timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingsSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeSection {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            diary_path: PathBuf::from("diary.txt"),
            bind: "127.0.0.1:5000".to_string(),
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            timeout_secs: Some(120),
            embeddings: EmbeddingSettings::default(),
            knowledge: KnowledgeSettings::default(),
            log_level: None,
            log_format: LogFormat::default(),
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `LIFECAPSULE_WORKSPACE`: Override workspace path
    /// - `LIFECAPSULE_CONFIG`: Path to config file
    /// - `LIFECAPSULE_PROVIDER`: LLM provider
    /// - `LIFECAPSULE_MODEL`: Model identifier
    /// - `LIFECAPSULE_DIARY`: Diary file path
    /// - `LIFECAPSULE_BIND`: HTTP bind address
    /// - `OLLAMA_URL`: Ollama endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use lifecapsule_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Diary: {:?}", config.diary_file());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`load`](Self::load), with the workspace and config file given
    /// explicitly (e.g. from CLI flags). Explicit values beat the environment.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("LIFECAPSULE_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        if let Some(config_file) =
            config_file.or_else(|| std::env::var("LIFECAPSULE_CONFIG").ok().map(PathBuf::from))
        {
            config.config_file = Some(config_file);
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
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();

        Ok(config)
    }

    /// Environment variables override the config file.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("LIFECAPSULE_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("LIFECAPSULE_MODEL") {
            self.model = model;
        }

        if let Ok(diary) = std::env::var("LIFECAPSULE_DIARY") {
            self.diary_path = PathBuf::from(diary);
        }

        if let Ok(bind) = std::env::var("LIFECAPSULE_BIND") {
            self.bind = bind;
        }

        if let Ok(endpoint) = std::env::var("OLLAMA_URL") {
            self.endpoint = Some(endpoint);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents).map_err(|e| match e {
            AppError::Config(msg) => AppError::Config(format!("{} ({:?})", msg, path)),
            other => other,
        })
    }

    /// Merge YAML configuration text into this config.
    pub fn merge_yaml_str(&self, contents: &str) -> AppResult<Self> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut result = self.clone();

        if let Some(bind) = config_file.server.and_then(|s| s.bind) {
            result.bind = bind;
        }

        if let Some(path) = config_file.diary.and_then(|d| d.path) {
            result.diary_path = PathBuf::from(path);
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if llm.timeout.is_some() {
                result.timeout_secs = llm.timeout;
            }
        }

        if let Some(embeddings) = config_file.embeddings {
            if let Some(provider) = embeddings.provider {
                result.embeddings.provider = provider;
            }
            if let Some(model) = embeddings.model {
                result.embeddings.model = model;
            }
            if embeddings.dimensions.is_some() {
                result.embeddings.dimensions = embeddings.dimensions;
            }
        }

        if let Some(knowledge) = config_file.knowledge {
            if let Some(chunk_size) = knowledge.chunk_size {
                result.knowledge.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = knowledge.chunk_overlap {
                result.knowledge.chunk_overlap = chunk_overlap;
            }
            if let Some(top_k) = knowledge.top_k {
                result.knowledge.top_k = top_k;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = LogFormat::parse(&format).ok_or_else(|| {
                    AppError::Config(format!("Unknown log format: {}", format))
                })?;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and environment.
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
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Path to the `.lifecapsule` state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".lifecapsule")
    }

    /// Directory holding prompt template overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.state_dir().join("prompts")
    }

    /// Resolved diary file path.
    pub fn diary_file(&self) -> PathBuf {
        if self.diary_path.is_absolute() {
            self.diary_path.clone()
        } else {
            self.workspace.join(&self.diary_path)
        }
    }

    /// Resolved LLM endpoint.
    pub fn llm_endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_ENDPOINT)
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_LLM_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embeddings.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embeddings.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model cannot be empty".to_string()));
        }

        let knowledge = &self.knowledge;
        if knowledge.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be positive".to_string()));
        }
        if knowledge.chunk_overlap >= knowledge.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                knowledge.chunk_overlap, knowledge.chunk_size
            )));
        }
        if knowledge.top_k == 0 {
            return Err(AppError::Config("topK must be positive".to_string()));
        }

        validate_bind(&self.bind)?;

        Ok(())
    }
}

/// Accept `host:port` where host is an IP or a name the listener resolves later.
fn validate_bind(bind: &str) -> AppResult<()> {
    if bind.parse::<SocketAddr>().is_ok() {
        return Ok(());
    }

    let valid = match bind.rsplit_once(':') {
        Some((host, port)) => !host.trim().is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Invalid bind address '{}'. Expected host:port",
            bind
        )))
    }
}
