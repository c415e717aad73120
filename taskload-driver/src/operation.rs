//! Operation kinds issued against the task API

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    List,
    Create,
    ReadById,
    Update,
    Delete,
    HealthCheck,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::List => "list",
            OperationKind::Create => "create",
            OperationKind::ReadById => "read_by_id",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::HealthCheck => "health_check",
        }
    }

    /// Operations that can be drawn by the weighted selector
    pub fn primary() -> &'static [OperationKind] {
        &[
            OperationKind::List,
            OperationKind::Create,
            OperationKind::ReadById,
            OperationKind::Update,
            OperationKind::Delete,
        ]
    }

    pub fn all() -> &'static [OperationKind] {
        &[
            OperationKind::List,
            OperationKind::Create,
            OperationKind::ReadById,
            OperationKind::Update,
            OperationKind::Delete,
            OperationKind::HealthCheck,
        ]
    }

    pub fn is_primary(&self) -> bool {
        !matches!(self, OperationKind::HealthCheck)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "list" => Ok(OperationKind::List),
            "create" => Ok(OperationKind::Create),
            "read_by_id" | "read" => Ok(OperationKind::ReadById),
            "update" => Ok(OperationKind::Update),
            "delete" => Ok(OperationKind::Delete),
            "health_check" | "health" => Ok(OperationKind::HealthCheck),
            _ => Err(DriverError::UnknownOperation(s.to_string())),
        }
    }
}
