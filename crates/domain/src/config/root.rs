use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::IpAddr;
use std::str::FromStr;

use super::blocking::BlockingConfig;
use super::database::DatabaseConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::sinkhole::SinkholeConfig;
use super::upstream::UpstreamConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SINKHOLE_DNS_";

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["sinkhole-dns.toml", "/etc/sinkhole-dns/config.toml"];

/// Main configuration structure for Sinkhole DNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port, concurrency)
    #[serde(default)]
    pub server: ServerConfig,

    /// Where allowed queries are forwarded
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Answers synthesized for blocked domains
    #[serde(default)]
    pub sinkhole: SinkholeConfig,

    /// Decision cache and store failure policy
    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Block-set and query log storage
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file or use defaults, then apply environment
    /// overrides followed by command-line overrides.
    ///
    /// File priority order:
    /// 1. Explicitly provided path
    /// 2. sinkhole-dns.toml in current directory
    /// 3. /etc/sinkhole-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(Self::prefixed_env_vars(std::env::vars_os())?)?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Keeps the `SINKHOLE_DNS_*` entries of a raw environment. Keys that
    /// are not UTF-8 cannot carry the prefix and are skipped; a prefixed key
    /// whose value is not UTF-8 is an error.
    pub fn prefixed_env_vars<I>(vars: I) -> Result<Vec<(String, String)>, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut prefixed = Vec::new();
        for (key, value) in vars {
            let Ok(key) = key.into_string() else {
                continue;
            };
            if !key.starts_with(ENV_PREFIX) {
                continue;
            }
            match value.into_string() {
                Ok(value) => prefixed.push((key, value)),
                Err(raw) => {
                    let value = raw.to_string_lossy().into_owned();
                    return Err(ConfigError::InvalidOverride(key, value));
                }
            }
        }
        Ok(prefixed)
    }

    /// Apply `SINKHOLE_DNS_*` variables. Unrelated variables are ignored;
    /// a recognised variable with an unparseable value is an error.
    pub fn apply_env_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.trim();
            match name {
                "LISTEN_ADDRESS" => self.server.bind_address = value.to_string(),
                "LISTEN_PORT" => self.server.dns_port = parse_override(&key, value)?,
                "UPSTREAM_ADDRESS" => self.upstream.address = value.to_string(),
                "UPSTREAM_PORT" => self.upstream.port = parse_override(&key, value)?,
                "UPSTREAM_TIMEOUT_MS" => self.upstream.timeout_ms = parse_override(&key, value)?,
                "SINKHOLE_IPV4" => self.sinkhole.ipv4 = parse_override(&key, value)?,
                "SINKHOLE_IPV6" => self.sinkhole.ipv6 = parse_override(&key, value)?,
                "CACHE_CAPACITY" => self.blocking.cache_capacity = parse_override(&key, value)?,
                "DATABASE_PATH" => self.database.path = value.to_string(),
                "LOG_LEVEL" => self.logging.level = value.to_string(),
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if IpAddr::from_str(&self.server.bind_address).is_err() {
            return Err(ConfigError::Validation(format!(
                "Bind address '{}' is not an IP address",
                self.server.bind_address
            )));
        }

        if self.server.max_in_flight == 0 {
            return Err(ConfigError::Validation(
                "max_in_flight must be at least 1".to_string(),
            ));
        }

        if self.upstream.port == 0 {
            return Err(ConfigError::Validation(
                "Upstream port cannot be 0".to_string(),
            ));
        }

        self.upstream.socket_addr()?;

        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        if self.blocking.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "Decision cache capacity must be at least 1".to_string(),
            ));
        }

        if self.database.query_log_max_batch_size == 0
            || self.database.query_log_channel_capacity == 0
        {
            return Err(ConfigError::Validation(
                "Query log batch size and channel capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(|path| path.to_string())
    }
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidOverride(key.to_string(), value.to_string()))
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
}
