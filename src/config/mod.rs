use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::payments::tinkoff;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    /// Override for tests; production uses the real acquiring endpoint.
    pub tinkoff_base_url: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            tinkoff_base_url: tinkoff::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("smtp.enabled", false)?
            .set_default("payments.tinkoff_base_url", tinkoff::DEFAULT_BASE_URL)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with OFFERFLOW__ prefix, double
            // underscore separates levels)
            .add_source(Environment::with_prefix("OFFERFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://offerflow.db".to_string(),
                max_connections: 10,
            },
            smtp: SmtpConfig::default(),
            payments: PaymentsConfig::default(),
        }
    }
}
