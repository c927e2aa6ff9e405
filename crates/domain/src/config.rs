mod blocking;
mod database;
mod errors;
mod logging;
mod root;
mod server;
mod sinkhole;
mod upstream;

pub use blocking::{BlockingConfig, StoreFailurePolicy};
pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config, ENV_PREFIX};
pub use server::ServerConfig;
pub use sinkhole::SinkholeConfig;
pub use upstream::UpstreamConfig;
