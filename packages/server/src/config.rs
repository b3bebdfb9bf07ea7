use std::path::PathBuf;

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
    /// Employee directory database. Defaults to `url` when unset.
    pub empleados_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root of the public directory; attachments live under `uploads/`.
    pub public_dir: PathBuf,
    /// Maximum size of a single uploaded file in bytes.
    pub max_file_size: u64,
    /// Maximum size of a whole request body in bytes.
    pub max_request_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Endpoint of the external directory service used by `/auth/authenticate`.
    pub directory_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.public_dir", "./public")?
            .set_default("storage.max_file_size", 25 * 1024 * 1024)?
            .set_default("storage.max_request_size", 128 * 1024 * 1024)?
            .set_default("auth.timeout_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., INVENTARIO__DATABASE__URL)
            .add_source(Environment::with_prefix("INVENTARIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
