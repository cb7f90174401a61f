//! Configuration for validation-daemon

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backing store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Orchestration engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Resource URI configuration
    #[serde(default)]
    pub resources: ResourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Path to the validation rule catalog
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
        }
    }
}

/// Where executions, validations and errors are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Triples in the application graph of the SPARQL store
    Sparql,

    /// In-memory storage (for development/testing)
    Memory,
}

/// Backing store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SPARQL endpoint URL, used for rule queries and (with the sparql
    /// backend) bookkeeping
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Graph holding every persisted entity
    #[serde(default = "default_graph")]
    pub graph: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Bookkeeping backend
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            graph: default_graph(),
            request_timeout_secs: default_request_timeout(),
            backend: default_backend(),
        }
    }
}

/// Orchestration engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Error records per bulk write
    #[serde(default = "default_error_batch_size")]
    pub error_batch_size: usize,

    /// Cap on concurrently evaluated validations; unbounded when unset
    #[serde(default)]
    pub max_concurrent_validations: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_batch_size: default_error_batch_size(),
            max_concurrent_validations: None,
        }
    }
}

/// Resource URI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Base for execution, validation and error URIs
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080)
}

fn default_endpoint() -> String {
    "http://database:8890/sparql".to_string()
}

fn default_graph() -> String {
    "http://mu.semte.ch/application".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sparql
}

fn default_error_batch_size() -> usize {
    250
}

fn default_base_uri() -> String {
    "http://mu.semte.ch/services/validation-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with VALIDATION_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("VALIDATION")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Create a development configuration backed by in-memory storage
    pub fn development() -> Self {
        Self {
            store: StoreConfig {
                backend: StorageBackend::Memory,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
