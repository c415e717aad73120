//! HTTP configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskload_config::domains::http::HttpConfig as ConfigHttpConfig;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,

    /// Maximum idle connections kept per host
    pub max_idle_per_host: usize,

    /// How long an idle connection is kept
    pub idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        ConfigHttpConfig::default().into()
    }
}

impl From<ConfigHttpConfig> for HttpConfig {
    fn from(config: ConfigHttpConfig) -> Self {
        Self {
            timeout: config.timeout,
            connect_timeout: config.connection_pool.connection_timeout,
            user_agent: config.user_agent,
            verify_ssl: config.verify_ssl,
            max_idle_per_host: config.connection_pool.max_idle_per_host,
            idle_timeout: config.connection_pool.idle_timeout,
        }
    }
}
