//! Shared configuration and logging setup for revq.

mod config;
mod logging;

pub use config::{get_config_home, Config, ConfigError, GithubConfig};
pub use logging::init_tracing;
