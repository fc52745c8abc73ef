use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    Filesystem,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub driver: StorageDriver,
    /// Root directory of the filesystem driver.
    pub root: String,
    /// Prefix for public file URLs: `{public_url}/{video_id}/{filename}`.
    pub public_url: String,
    /// Request body cap for upload routes, in bytes.
    pub max_upload_size: u64,
}

impl StorageConfig {
    pub fn file_url(&self, dir: &str, filename: &str) -> String {
        format!(
            "{}/{}",
            self.public_url.trim_end_matches('/'),
            common::storage::blob_path(dir, filename)
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

/// 1 GiB trailer limit plus room for the remaining multipart fields.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024 + 16 * 1024 * 1024;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://catalog.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("storage.driver", "filesystem")?
            .set_default("storage.root", "./storage")?
            .set_default("storage.public_url", "http://127.0.0.1:3000/api/v1/files")?
            .set_default("storage.max_upload_size", DEFAULT_MAX_UPLOAD_SIZE)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CATALOG__DATABASE__URL)
            .add_source(Environment::with_prefix("CATALOG").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
