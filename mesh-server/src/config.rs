//! Gateway configuration

use std::path::PathBuf;

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_LIGHTHOUSE_NODE_URL: &str = "https://node.lighthouse.storage";
pub const DEFAULT_LIGHTHOUSE_GATEWAY_URL: &str = "https://gateway.lighthouse.storage";
pub const DEFAULT_DECRYPT_BASE_URL: &str = "https://decrypt.mesh3.network/evm";

/// Env var holding the storage node API key; read per request, never cached.
pub const STORAGE_KEY_VAR: &str = "LH_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// PostgreSQL connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub lighthouse_node_url: String,
    pub lighthouse_gateway_url: String,
    /// Prefix of the decrypt link returned for saved datasets
    pub decrypt_base_url: String,
    /// Optional JSON seed catalogue replacing the built-in launch catalogue
    pub seed_catalog_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            environment: "development".into(),
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            lighthouse_node_url: DEFAULT_LIGHTHOUSE_NODE_URL.into(),
            lighthouse_gateway_url: DEFAULT_LIGHTHOUSE_GATEWAY_URL.into(),
            decrypt_base_url: DEFAULT_DECRYPT_BASE_URL.into(),
            seed_catalog_path: None,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            http_port: non_empty("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            environment: non_empty("ENVIRONMENT").unwrap_or(defaults.environment),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: non_empty("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            lighthouse_node_url: non_empty("LIGHTHOUSE_NODE_URL")
                .unwrap_or(defaults.lighthouse_node_url),
            lighthouse_gateway_url: non_empty("LIGHTHOUSE_GATEWAY_URL")
                .unwrap_or(defaults.lighthouse_gateway_url),
            decrypt_base_url: non_empty("DECRYPT_BASE_URL").unwrap_or(defaults.decrypt_base_url),
            seed_catalog_path: non_empty("SEED_CATALOG_PATH").map(PathBuf::from),
            log_level: non_empty("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: non_empty("LOG_DIR"),
        }
    }
}
