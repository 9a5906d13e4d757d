use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_APP_HOST: &str = "localhost";
pub const DEFAULT_APP_PORT: u16 = 5001;
/// Seconds between reconcile sweeps over the job table.
pub const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 20;
/// Startup health gate: attempts × retry interval before giving up.
pub const DEFAULT_HEALTH_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_HEALTH_RETRY_SECS: u64 = 5;

/// Top-level config (wablast.toml + WABLAST_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WablastConfig {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Where the companion messaging service (the WhatsApp session holder)
/// listens. The scheduler only ever talks to it over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_host")]
    pub host: String,
    #[serde(default = "default_app_port")]
    pub port: u16,
}

impl AppConfig {
    /// Base URL for delivery and health calls, e.g. `http://localhost:5001`.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_app_host(),
            port: default_app_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between reconcile sweeps that pick up newly created jobs.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
    /// IANA timezone name in which cron expressions are evaluated.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Health gate: how many times to poll /health before giving up.
    #[serde(default = "default_health_attempts")]
    pub health_max_attempts: u32,
    /// Health gate: seconds between polls.
    #[serde(default = "default_health_retry")]
    pub health_retry_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval(),
            timezone: default_timezone(),
            health_max_attempts: default_health_attempts(),
            health_retry_secs: default_health_retry(),
        }
    }
}

fn default_app_host() -> String {
    DEFAULT_APP_HOST.to_string()
}
fn default_app_port() -> u16 {
    DEFAULT_APP_PORT
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.wablast/wablast.db", home)
}
fn default_reconcile_interval() -> u64 {
    DEFAULT_RECONCILE_INTERVAL_SECS
}
fn default_timezone() -> String {
    "UTC".to_string()
}
fn default_health_attempts() -> u32 {
    DEFAULT_HEALTH_MAX_ATTEMPTS
}
fn default_health_retry() -> u64 {
    DEFAULT_HEALTH_RETRY_SECS
}

impl WablastConfig {
    /// Load config from a TOML file with WABLAST_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.wablast/wablast.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: WablastConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("WABLAST_").split("_"))
            .extract()
            .map_err(|e| crate::error::WablastError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.wablast/wablast.toml", home)
}
