//! Response assertions

use crate::pool::TaskId;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use taskload_http::{HttpError, TimedResponse};

/// Outcome of one named assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
}

/// Structural assertion on the decoded body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyCheck {
    None,
    /// Any well-formed JSON document
    Json,
    /// Object with a non-empty `id`
    HasId,
    /// Object whose `status` is `"UP"`
    StatusUp,
}

/// Everything a response must satisfy for the sample to pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub statuses: &'static [u16],
    pub latency_ceiling: Duration,
    pub body: BodyCheck,
}

impl Expectation {
    /// Evaluate against a response, or a transport failure.
    ///
    /// `decoded` is the JSON body when it parsed; a body that failed to
    /// parse fails any structural check.
    pub fn evaluate(
        &self,
        label: &str,
        response: &Result<TimedResponse, HttpError>,
        decoded: Option<&JsonValue>,
    ) -> Vec<Check> {
        let received = response.as_ref().ok();
        let mut checks = Vec::with_capacity(3);

        checks.push(Check {
            name: format!("{} status is {}", label, self.status_text()),
            passed: received.is_some_and(|r| self.statuses.contains(&r.status)),
        });

        checks.push(Check {
            name: format!(
                "{} response time < {}ms",
                label,
                self.latency_ceiling.as_millis()
            ),
            passed: received.is_some_and(|r| r.elapsed < self.latency_ceiling),
        });

        match self.body {
            BodyCheck::None => {}
            BodyCheck::Json => checks.push(Check {
                name: format!("{} returns JSON", label),
                passed: received.is_some() && decoded.is_some(),
            }),
            BodyCheck::HasId => checks.push(Check {
                name: format!("{} returns task with ID", label),
                passed: received.is_some() && decoded.and_then(extract_id).is_some(),
            }),
            BodyCheck::StatusUp => checks.push(Check {
                name: format!("{} status is UP", label),
                passed: received.is_some()
                    && decoded
                        .and_then(|body| body.get("status"))
                        .and_then(JsonValue::as_str)
                        == Some("UP"),
            }),
        }

        checks
    }

    fn status_text(&self) -> String {
        self.statuses
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// `id` field of a task object
pub fn extract_id(body: &JsonValue) -> Option<TaskId> {
    body.get("id").and_then(TaskId::from_json)
}

/// Ids of the first `limit` tasks of a list response
pub fn extract_ids(body: &JsonValue, limit: usize) -> Option<Vec<TaskId>> {
    let tasks = body.as_array()?;
    if tasks.is_empty() {
        return None;
    }
    Some(tasks.iter().take(limit).filter_map(extract_id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const READ: Expectation = Expectation {
        statuses: &[200, 404],
        latency_ceiling: Duration::from_millis(1000),
        body: BodyCheck::None,
    };

    const HEALTH: Expectation = Expectation {
        statuses: &[200],
        latency_ceiling: Duration::from_millis(500),
        body: BodyCheck::StatusUp,
    };

    fn response(status: u16, millis: u64) -> Result<TimedResponse, HttpError> {
        Ok(TimedResponse::new(status, Duration::from_millis(millis), Vec::new()))
    }

    #[test]
    fn test_check_names() {
        let checks = READ.evaluate("GET /api/tasks/{id}", &response(200, 5), None);
        let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "GET /api/tasks/{id} status is 200 or 404",
                "GET /api/tasks/{id} response time < 1000ms",
            ]
        );
    }

    #[test]
    fn test_not_found_is_accepted_when_listed() {
        let checks = READ.evaluate("GET", &response(404, 5), None);
        assert!(checks.iter().all(|c| c.passed));

        let checks = READ.evaluate("GET", &response(500, 5), None);
        assert!(!checks[0].passed);
        assert!(checks[1].passed);
    }

    #[test]
    fn test_latency_ceiling_is_exclusive() {
        let checks = READ.evaluate("GET", &response(200, 1000), None);
        assert!(!checks[1].passed);
        let checks = READ.evaluate("GET", &response(200, 999), None);
        assert!(checks[1].passed);
    }

    #[test]
    fn test_transport_failure_fails_every_check() {
        let failed: Result<TimedResponse, HttpError> =
            Err(HttpError::ConnectionFailed("refused".to_string()));
        let body = json!({"status": "UP"});
        let checks = HEALTH.evaluate("Health check", &failed, Some(&body));
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| !c.passed));
    }

    #[test]
    fn test_status_up_check() {
        let up = json!({"status": "UP"});
        let down = json!({"status": "DOWN"});
        assert!(HEALTH.evaluate("Health check", &response(200, 1), Some(&up))[2].passed);
        assert!(!HEALTH.evaluate("Health check", &response(200, 1), Some(&down))[2].passed);
        assert!(!HEALTH.evaluate("Health check", &response(200, 1), None)[2].passed);
    }

    #[test]
    fn test_json_check_needs_decoded_body() {
        let list = Expectation {
            statuses: &[200],
            latency_ceiling: Duration::from_millis(1000),
            body: BodyCheck::Json,
        };
        let checks = list.evaluate("GET /api/tasks", &response(200, 1), None);
        assert_eq!(checks[2].name, "GET /api/tasks returns JSON");
        assert!(!checks[2].passed);

        let body = json!({"content": []});
        let checks = list.evaluate("GET /api/tasks", &response(200, 1), Some(&body));
        assert!(checks.iter().all(|c| c.passed));
    }

    #[test]
    fn test_extract_ids() {
        let body = json!([{"id": 3}, {"title": "no id"}, {"id": 0}, {"id": "x"}]);
        assert_eq!(
            extract_ids(&body, 10),
            Some(vec![TaskId::new("3"), TaskId::new("x")])
        );
        assert_eq!(extract_ids(&body, 1), Some(vec![TaskId::new("3")]));
        assert_eq!(extract_ids(&json!([]), 10), None);
        assert_eq!(extract_ids(&json!({"id": 1}), 10), None);
    }
}
