//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `GOVDOC_*` environment variables.
//! The Cohere API key has no default; [`Config::validate`] rejects a config
//! without one.

pub mod error;


pub use error::{ConfigError, UnknownRerankBackend};

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::chunking::ChunkerConfig;
use crate::constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_COHERE_BASE_URL, DEFAULT_COLLECTION_NAME,
    DEFAULT_EMBED_BATCH_SIZE,
    DEFAULT_EMBEDDING_DIM, DEFAULT_OCR_MAX_WAIT_SECS, DEFAULT_OCR_POLL_SECS, DEFAULT_OVER_FETCH_K,
    DEFAULT_RERANK_TOP_N, DEFAULT_RETRIEVAL_K, DEFAULT_UPSERT_BATCH_SIZE,
};
use crate::embedding::{CohereEmbedderConfig, DEFAULT_COHERE_EMBED_MODEL, ModelCapability};
use crate::ocr::{HttpOcrConfig, PollConfig};
use crate::rerank::{CohereRerankerConfig, DEFAULT_COHERE_RERANK_MODEL};
use crate::retrieval::RetrievalParams;
use crate::retry::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, RetryPolicy};
use crate::translate::HttpTranslatorConfig;
use crate::vectordb::{QdrantIndexConfig, WriteConsistency};

/// Default Qdrant URL used when `GOVDOC_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default answer model used when `GOVDOC_LLM_MODEL` is not set.
pub const DEFAULT_LLM_MODEL: &str = crate::answer::DEFAULT_ANSWER_MODEL;

/// Which reranker backs the retrieval pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RerankBackend {
    /// Cohere `/v1/rerank`.
    #[default]
    Cohere,
    /// In-process term-overlap scoring with no network access. An offline
    /// stand-in only; it cannot match paraphrases or translations.
    Lexical,
}

impl FromStr for RerankBackend {
    type Err = UnknownRerankBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cohere" => Ok(RerankBackend::Cohere),
            "lexical" => Ok(RerankBackend::Lexical),
            _ => Err(UnknownRerankBackend {
                value: value.to_string(),
            }),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `GOVDOC_*` overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Root of the local object store (raw uploads, normalized output).
    /// Default: `./.data`.
    pub storage_path: PathBuf,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,
    pub qdrant_api_key: Option<String>,
    /// Default: `govdoc_segments`.
    pub collection: String,
    /// Must match the embedding model's output. Default: `1024`.
    pub embedding_dim: usize,

    pub chunk_size: usize,
    pub chunk_overlap: usize,

    pub retrieval_k: usize,
    pub over_fetch_k: usize,
    pub rerank_top_n: usize,
    pub rerank_enabled: bool,

    pub embed_batch_size: usize,
    pub upsert_batch_size: usize,

    pub cohere_api_key: Option<String>,
    pub cohere_base_url: String,
    pub embedding_model: String,
    /// Declared, never inferred from the model name. Default: multilingual.
    pub embedding_capability: ModelCapability,
    pub rerank_backend: RerankBackend,
    pub rerank_model: String,

    /// LibreTranslate-compatible endpoint. Unset means no translation.
    pub translate_url: Option<String>,
    pub translate_api_key: Option<String>,

    pub llm_model: String,

    /// Job-based OCR service for `POST /upload`. Unset disables OCR.
    pub ocr_url: Option<String>,
    pub ocr_api_key: Option<String>,
    pub ocr_poll_interval: Duration,
    pub ocr_max_wait: Duration,

    /// Total attempts per external call, including the first.
    pub retry_attempts: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("socket_addr", &self.socket_addr())
            .field("storage_path", &self.storage_path)
            .field("qdrant_url", &self.qdrant_url)
            .field("collection", &self.collection)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_capability", &self.embedding_capability)
            .field("rerank_backend", &self.rerank_backend)
            .field("rerank_enabled", &self.rerank_enabled)
            .field("translate_url", &self.translate_url)
            .field("ocr_url", &self.ocr_url)
            .field("llm_model", &self.llm_model)
            .field("cohere_api_key_set", &self.cohere_api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            retrieval_k: DEFAULT_RETRIEVAL_K,
            over_fetch_k: DEFAULT_OVER_FETCH_K,
            rerank_top_n: DEFAULT_RERANK_TOP_N,
            rerank_enabled: true,
            embed_batch_size: DEFAULT_EMBED_BATCH_SIZE,
            upsert_batch_size: DEFAULT_UPSERT_BATCH_SIZE,
            cohere_api_key: None,
            cohere_base_url: DEFAULT_COHERE_BASE_URL.to_string(),
            embedding_model: DEFAULT_COHERE_EMBED_MODEL.to_string(),
            embedding_capability: ModelCapability::Multilingual,
            rerank_backend: RerankBackend::Cohere,
            rerank_model: DEFAULT_COHERE_RERANK_MODEL.to_string(),
            translate_url: None,
            translate_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            ocr_url: None,
            ocr_api_key: None,
            ocr_poll_interval: Duration::from_secs(DEFAULT_OCR_POLL_SECS),
            ocr_max_wait: Duration::from_secs(DEFAULT_OCR_MAX_WAIT_SECS),
            retry_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "GOVDOC_PORT";
    const ENV_BIND_ADDR: &'static str = "GOVDOC_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "GOVDOC_STORAGE_PATH";
    const ENV_QDRANT_URL: &'static str = "GOVDOC_QDRANT_URL";
    const ENV_QDRANT_API_KEY: &'static str = "GOVDOC_QDRANT_API_KEY";
    const ENV_COLLECTION: &'static str = "GOVDOC_COLLECTION";
    const ENV_EMBEDDING_DIM: &'static str = "GOVDOC_EMBEDDING_DIM";
    const ENV_CHUNK_SIZE: &'static str = "GOVDOC_CHUNK_SIZE";
    const ENV_CHUNK_OVERLAP: &'static str = "GOVDOC_CHUNK_OVERLAP";
    const ENV_RETRIEVAL_K: &'static str = "GOVDOC_RETRIEVAL_K";
    const ENV_OVER_FETCH_K: &'static str = "GOVDOC_OVER_FETCH_K";
    const ENV_RERANK_TOP_N: &'static str = "GOVDOC_RERANK_TOP_N";
    const ENV_RERANK_ENABLED: &'static str = "GOVDOC_RERANK_ENABLED";
    const ENV_EMBED_BATCH_SIZE: &'static str = "GOVDOC_EMBED_BATCH_SIZE";
    const ENV_UPSERT_BATCH_SIZE: &'static str = "GOVDOC_UPSERT_BATCH_SIZE";
    const ENV_COHERE_API_KEY: &'static str = "GOVDOC_COHERE_API_KEY";
    const ENV_COHERE_BASE_URL: &'static str = "GOVDOC_COHERE_BASE_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "GOVDOC_EMBEDDING_MODEL";
    const ENV_EMBEDDING_CAPABILITY: &'static str = "GOVDOC_EMBEDDING_CAPABILITY";
    const ENV_RERANK_BACKEND: &'static str = "GOVDOC_RERANK_BACKEND";
    const ENV_RERANK_MODEL: &'static str = "GOVDOC_RERANK_MODEL";
    const ENV_TRANSLATE_URL: &'static str = "GOVDOC_TRANSLATE_URL";
    const ENV_TRANSLATE_API_KEY: &'static str = "GOVDOC_TRANSLATE_API_KEY";
    const ENV_LLM_MODEL: &'static str = "GOVDOC_LLM_MODEL";
    const ENV_OCR_URL: &'static str = "GOVDOC_OCR_URL";
    const ENV_OCR_API_KEY: &'static str = "GOVDOC_OCR_API_KEY";
    const ENV_OCR_POLL_SECS: &'static str = "GOVDOC_OCR_POLL_SECS";
    const ENV_OCR_MAX_WAIT_SECS: &'static str = "GOVDOC_OCR_MAX_WAIT_SECS";
    const ENV_RETRY_ATTEMPTS: &'static str = "GOVDOC_RETRY_ATTEMPTS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let embedding_capability = match Self::parse_optional_string_from_env(
            Self::ENV_EMBEDDING_CAPABILITY,
        ) {
            Some(value) => {
                ModelCapability::parse(&value).ok_or(ConfigError::InvalidValue {
                    name: Self::ENV_EMBEDDING_CAPABILITY,
                    value,
                    expected: "multilingual|monolingual",
                })?
            }
            None => defaults.embedding_capability,
        };

        let rerank_backend = match Self::parse_optional_string_from_env(Self::ENV_RERANK_BACKEND)
        {
            Some(value) => value.parse().map_err(|e: UnknownRerankBackend| {
                ConfigError::InvalidValue {
                    name: Self::ENV_RERANK_BACKEND,
                    value: e.value,
                    expected: "cohere|lexical",
                }
            })?,
            None => defaults.rerank_backend,
        };

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            storage_path: Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path),
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            qdrant_api_key: Self::parse_optional_string_from_env(Self::ENV_QDRANT_API_KEY),
            collection: Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection),
            embedding_dim: Self::parse_number_from_env(
                Self::ENV_EMBEDDING_DIM,
                defaults.embedding_dim,
            )?,
            chunk_size: Self::parse_number_from_env(Self::ENV_CHUNK_SIZE, defaults.chunk_size)?,
            chunk_overlap: Self::parse_number_from_env(
                Self::ENV_CHUNK_OVERLAP,
                defaults.chunk_overlap,
            )?,
            retrieval_k: Self::parse_number_from_env(Self::ENV_RETRIEVAL_K, defaults.retrieval_k)?,
            over_fetch_k: Self::parse_number_from_env(
                Self::ENV_OVER_FETCH_K,
                defaults.over_fetch_k,
            )?,
            rerank_top_n: Self::parse_number_from_env(
                Self::ENV_RERANK_TOP_N,
                defaults.rerank_top_n,
            )?,
            rerank_enabled: Self::parse_bool_from_env(
                Self::ENV_RERANK_ENABLED,
                defaults.rerank_enabled,
            )?,
            embed_batch_size: Self::parse_number_from_env(
                Self::ENV_EMBED_BATCH_SIZE,
                defaults.embed_batch_size,
            )?,
            upsert_batch_size: Self::parse_number_from_env(
                Self::ENV_UPSERT_BATCH_SIZE,
                defaults.upsert_batch_size,
            )?,
            cohere_api_key: Self::parse_optional_string_from_env(Self::ENV_COHERE_API_KEY),
            cohere_base_url: Self::parse_string_from_env(
                Self::ENV_COHERE_BASE_URL,
                defaults.cohere_base_url,
            ),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_capability,
            rerank_backend,
            rerank_model: Self::parse_string_from_env(Self::ENV_RERANK_MODEL, defaults.rerank_model),
            translate_url: Self::parse_optional_string_from_env(Self::ENV_TRANSLATE_URL),
            translate_api_key: Self::parse_optional_string_from_env(Self::ENV_TRANSLATE_API_KEY),
            llm_model: Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model),
            ocr_url: Self::parse_optional_string_from_env(Self::ENV_OCR_URL),
            ocr_api_key: Self::parse_optional_string_from_env(Self::ENV_OCR_API_KEY),
            ocr_poll_interval: Duration::from_secs(Self::parse_number_from_env(
                Self::ENV_OCR_POLL_SECS,
                DEFAULT_OCR_POLL_SECS,
            )?),
            ocr_max_wait: Duration::from_secs(Self::parse_number_from_env(
                Self::ENV_OCR_MAX_WAIT_SECS,
                DEFAULT_OCR_MAX_WAIT_SECS,
            )?),
            retry_attempts: Self::parse_number_from_env(
                Self::ENV_RETRY_ATTEMPTS,
                defaults.retry_attempts,
            )?,
        })
    }

    /// Validates paths and cross-field invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        self.chunker_config()
            .validate()
            .map_err(|e| ConfigError::Inconsistent {
                reason: e.to_string(),
            })?;

        self.retrieval_params()
            .validate()
            .map_err(|e| ConfigError::Inconsistent {
                reason: e.to_string(),
            })?;

        if self.rerank_enabled && self.rerank_top_n > self.over_fetch_k {
            return Err(ConfigError::Inconsistent {
                reason: format!(
                    "rerank_top_n ({}) exceeds over_fetch_k ({})",
                    self.rerank_top_n, self.over_fetch_k
                ),
            });
        }

        if self.embed_batch_size == 0 || self.upsert_batch_size == 0 {
            return Err(ConfigError::Inconsistent {
                reason: "batch sizes must be at least 1".to_string(),
            });
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::Inconsistent {
                reason: "embedding_dim must be at least 1".to_string(),
            });
        }

        if self.ocr_poll_interval.is_zero() {
            return Err(ConfigError::Inconsistent {
                reason: "OCR poll interval must be at least 1 second".to_string(),
            });
        }

        if self.retry_attempts == 0 {
            return Err(ConfigError::Inconsistent {
                reason: "retry_attempts must be at least 1".to_string(),
            });
        }

        if self.cohere_api_key.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_COHERE_API_KEY,
            });
        }

        if self.embedding_capability == ModelCapability::Monolingual
            && self.translate_url.is_none()
        {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_TRANSLATE_URL,
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::new(self.chunk_size, self.chunk_overlap)
    }

    pub fn retrieval_params(&self) -> RetrievalParams {
        RetrievalParams {
            k: self.retrieval_k,
            rerank_enabled: self.rerank_enabled,
            over_fetch_k: self.over_fetch_k,
            rerank_top_n: self.rerank_top_n,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: self.ocr_poll_interval,
            max_wait: self.ocr_max_wait,
            retry: self.retry_policy(),
        }
    }

    /// `None` when no OCR service is configured.
    pub fn ocr_config(&self) -> Option<HttpOcrConfig> {
        let url = self.ocr_url.as_ref()?;
        let mut config = HttpOcrConfig::new(url.clone());
        if let Some(key) = &self.ocr_api_key {
            config = config.with_api_key(key.clone());
        }
        Some(config)
    }

    pub fn qdrant_index_config(&self) -> QdrantIndexConfig {
        QdrantIndexConfig {
            url: self.qdrant_url.clone(),
            api_key: self.qdrant_api_key.clone(),
            collection: self.collection.clone(),
            vector_size: self.embedding_dim as u64,
            consistency: WriteConsistency::Strong,
        }
    }

    pub fn embedder_config(&self) -> Result<CohereEmbedderConfig, ConfigError> {
        let mut config = CohereEmbedderConfig::new(self.require_cohere_key()?)
            .with_model(self.embedding_model.clone())
            .with_base_url(self.cohere_base_url.clone());
        config.batch_size = self.embed_batch_size;
        config.dimension = self.embedding_dim;
        Ok(config)
    }

    /// `None` when the lexical backend is selected.
    pub fn reranker_config(&self) -> Result<Option<CohereRerankerConfig>, ConfigError> {
        match self.rerank_backend {
            RerankBackend::Lexical => Ok(None),
            RerankBackend::Cohere => {
                let mut config = CohereRerankerConfig::new(self.require_cohere_key()?)
                    .with_model(self.rerank_model.clone())
                    .with_base_url(self.cohere_base_url.clone());
                config.retry = self.retry_policy();
                Ok(Some(config))
            }
        }
    }

    /// `None` when no translation endpoint is configured.
    pub fn translator_config(&self) -> Option<HttpTranslatorConfig> {
        let url = self.translate_url.as_ref()?;
        let mut config = HttpTranslatorConfig::new(url.clone());
        if let Some(key) = &self.translate_api_key {
            config = config.with_api_key(key.clone());
        }
        config.retry = self.retry_policy();
        Some(config)
    }

    fn require_cohere_key(&self) -> Result<String, ConfigError> {
        self.cohere_api_key
            .clone()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_COHERE_API_KEY,
            })
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    /// Blank values count as unset.
    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::NumberParseError {
                    name: var_name,
                    value,
                    source: e,
                }),
            None => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    expected: "true|false",
                }),
            },
            None => Ok(default),
        }
    }
}
