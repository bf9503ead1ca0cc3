use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{query::DateRange, utils::AXL_SYMBOL};

/// Which warehouse implementation answers the aggregation queries.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseBackend {
    #[default]
    Clickhouse,
    /// In-memory events loaded from `fixture_path`.
    Fixture,
}

/// Warehouse connection configuration.
///
/// Credentials are expected from the environment
/// (`AXELAR_STAKING__WAREHOUSE__USER`, `..__PASSWORD`), populated by the
/// deployment's secret store. They are only read, never written back.
#[derive(Debug, Deserialize, Clone)]
pub struct WarehouseSettings {
    #[serde(default)]
    pub backend: WarehouseBackend,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    /// Fully qualified staking fact table.
    #[serde(default = "default_fact_table")]
    pub fact_table: String,
    #[serde(default)]
    pub fixture_path: Option<String>,
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
}

fn default_url() -> String {
    "http://localhost:8123".to_string()
}

fn default_database() -> String {
    "axelar".to_string()
}

fn default_fact_table() -> String {
    "axelar.fact_staking".to_string()
}

fn default_connect_retries() -> u32 {
    3
}

impl Default for WarehouseSettings {
    fn default() -> Self {
        Self {
            backend: WarehouseBackend::default(),
            url: default_url(),
            user: None,
            password: None,
            database: default_database(),
            fact_table: default_fact_table(),
            fixture_path: None,
            connect_retries: default_connect_retries(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Defaults applied when a request omits its date pickers.
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_start")]
    pub default_start: String,
    #[serde(default = "default_end")]
    pub default_end: String,
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
}

fn default_start() -> String {
    "2022-01-01".to_string()
}

fn default_end() -> String {
    "2025-06-01".to_string()
}

fn default_token_symbol() -> String {
    AXL_SYMBOL.to_string()
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_start: default_start(),
            default_end: default_end(),
            token_symbol: default_token_symbol(),
        }
    }
}

impl DashboardSettings {
    pub fn default_range(&self) -> anyhow::Result<DateRange> {
        DateRange::parse(&self.default_start, &self.default_end)
    }
}

/// Root application configuration.
///
/// Layered: optional `config.{yaml,toml,json}` in the working directory,
/// then `AXELAR_STAKING__*` environment variables on top.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub warehouse: WarehouseSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("AXELAR_STAKING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
