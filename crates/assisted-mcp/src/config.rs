use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use assisted_client::{DEFAULT_API_URL, DEFAULT_SSO_URL};
use serde::Deserialize;

use crate::error::ConfigError;

pub const OFFLINE_TOKEN_ENV: &str = "OFFLINE_TOKEN";
pub const CONFIG_FILE_NAME: &str = "assisted-mcp.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Resolve `host` to the addresses to listen on. Accepts IP literals
    /// (including bare IPv6 such as `::1`) and host names such as `localhost`.
    pub fn listen_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port).to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{} resolved to no addresses", self.host),
            ));
        }
        Ok(addrs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
    #[serde(default = "default_sso_url")]
    pub sso_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_sso_url() -> String {
    DEFAULT_SSO_URL.into()
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            sso_url: default_sso_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}
fn default_log_file_name() -> String {
    "assisted-service-mcp.log".into()
}
fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_max_backups() -> usize {
    5
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file_name: default_log_file_name(),
            max_bytes: default_max_bytes(),
            max_backups: default_max_backups(),
        }
    }
}

impl LoggingConfig {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

impl McpConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `explicit` if given, else the first of
    /// `./assisted-mcp.toml` and `~/.config/assisted-mcp/assisted-mcp.toml`
    /// that exists, else the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|d| d.join("assisted-mcp").join(CONFIG_FILE_NAME)),
        ];
        match candidates.into_iter().flatten().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Read the offline token from `OFFLINE_TOKEN`.
pub fn offline_token() -> Result<String, ConfigError> {
    resolve_offline_token(std::env::var(OFFLINE_TOKEN_ENV).ok())
}

fn resolve_offline_token(value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ConfigError::MissingOfflineToken),
    }
}
