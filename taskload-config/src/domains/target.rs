//! Target service configuration

use crate::error::ConfigResult;
use crate::validation::{validate_path, validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Default base URL of the task API under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Where the task API lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL, without a trailing path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Task collection path
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,

    /// Health endpoint path
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tasks_path: default_tasks_path(),
            health_path: default_health_path(),
        }
    }
}

impl TargetConfig {
    /// Full URL of the task collection endpoint
    pub fn tasks_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.tasks_path)
    }

    /// Full URL of the health endpoint
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.health_path)
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_path(&self.tasks_path, "tasks_path", self.domain_name())?;
        validate_path(&self.health_path, "health_path", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_tasks_path() -> String {
    "/api/tasks".to_string()
}

fn default_health_path() -> String {
    "/actuator/health".to_string()
}
