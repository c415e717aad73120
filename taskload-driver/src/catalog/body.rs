//! Request body generators for create and update

use chrono::{SecondsFormat, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

pub const TASK_TITLES: &[&str] = &[
    "Complete project documentation",
    "Review code changes",
    "Deploy to production",
    "Update dependencies",
    "Fix critical bug",
    "Implement new feature",
    "Write unit tests",
    "Performance optimization",
];

pub const TASK_STATUSES: &[&str] = &["PENDING", "IN_PROGRESS", "COMPLETED"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl From<TaskPayload> for JsonValue {
    fn from(payload: TaskPayload) -> Self {
        json!({
            "title": payload.title,
            "description": payload.description,
            "status": payload.status,
        })
    }
}

fn pick<R: Rng>(rng: &mut R, values: &[&'static str]) -> &'static str {
    values.choose(rng).copied().unwrap_or_default()
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn create_payload<R: Rng>(rng: &mut R) -> TaskPayload {
    TaskPayload {
        title: pick(rng, TASK_TITLES).to_string(),
        description: format!("Load test task created at {}", timestamp()),
        status: pick(rng, TASK_STATUSES).to_string(),
    }
}

pub fn update_payload<R: Rng>(rng: &mut R) -> TaskPayload {
    TaskPayload {
        title: format!("Updated: {}", pick(rng, TASK_TITLES)),
        description: format!("Updated during load test at {}", timestamp()),
        status: pick(rng, TASK_STATUSES).to_string(),
    }
}
