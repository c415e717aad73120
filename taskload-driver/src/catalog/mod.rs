//! Operation catalog
//!
//! Each operation kind has one static [`OperationRecord`] describing the
//! request to issue, the checks its response must satisfy and what a
//! passing response does to the id pool. [`Catalog`] binds the records
//! to concrete endpoints and executes them.

pub mod body;
pub mod checks;

use crate::operation::OperationKind;
use crate::pool::{EntityIdPool, TaskId};
use crate::sample::Sample;
use body::{create_payload, update_payload};
use checks::{extract_id, extract_ids, BodyCheck, Expectation};
use rand::Rng;
use serde_json::Value as JsonValue;
use std::time::Duration;
use taskload_config::TargetConfig;
use taskload_http::{HttpClient, HttpMethod, HttpRequest};
use tracing::debug;

/// Which endpoint a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Collection,
    /// Collection url followed by `/{id}`
    Item,
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTemplate {
    None,
    Create,
    Update,
}

/// What must hold before the operation is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    None,
    /// Target id is a uniform pick from the pool
    PoolNonEmpty,
    /// Target id is popped from the pool before sending
    PoolAboveFloor,
}

/// What a passing response does to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolEffect {
    None,
    /// Replace the pool with ids from the returned array
    Seed,
    /// Append the returned id
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationRecord {
    pub kind: OperationKind,
    /// Prefix of every check name
    pub label: &'static str,
    pub method: HttpMethod,
    pub endpoint: Endpoint,
    pub body: BodyTemplate,
    pub expect: Expectation,
    pub precondition: Precondition,
    pub effect: PoolEffect,
}

static RECORDS: [OperationRecord; 6] = [
    OperationRecord {
        kind: OperationKind::List,
        label: "GET /api/tasks",
        method: HttpMethod::Get,
        endpoint: Endpoint::Collection,
        body: BodyTemplate::None,
        expect: Expectation {
            statuses: &[200],
            latency_ceiling: Duration::from_millis(1000),
            body: BodyCheck::Json,
        },
        precondition: Precondition::None,
        effect: PoolEffect::Seed,
    },
    OperationRecord {
        kind: OperationKind::Create,
        label: "POST /api/tasks",
        method: HttpMethod::Post,
        endpoint: Endpoint::Collection,
        body: BodyTemplate::Create,
        expect: Expectation {
            statuses: &[201],
            latency_ceiling: Duration::from_millis(2000),
            body: BodyCheck::HasId,
        },
        precondition: Precondition::None,
        effect: PoolEffect::Add,
    },
    OperationRecord {
        kind: OperationKind::ReadById,
        label: "GET /api/tasks/{id}",
        method: HttpMethod::Get,
        endpoint: Endpoint::Item,
        body: BodyTemplate::None,
        expect: Expectation {
            statuses: &[200, 404],
            latency_ceiling: Duration::from_millis(1000),
            body: BodyCheck::None,
        },
        precondition: Precondition::PoolNonEmpty,
        effect: PoolEffect::None,
    },
    OperationRecord {
        kind: OperationKind::Update,
        label: "PUT /api/tasks/{id}",
        method: HttpMethod::Put,
        endpoint: Endpoint::Item,
        body: BodyTemplate::Update,
        expect: Expectation {
            statuses: &[200, 404],
            latency_ceiling: Duration::from_millis(2000),
            body: BodyCheck::None,
        },
        precondition: Precondition::PoolNonEmpty,
        effect: PoolEffect::None,
    },
    OperationRecord {
        kind: OperationKind::Delete,
        label: "DELETE /api/tasks/{id}",
        method: HttpMethod::Delete,
        endpoint: Endpoint::Item,
        body: BodyTemplate::None,
        expect: Expectation {
            statuses: &[204, 404],
            latency_ceiling: Duration::from_millis(1000),
            body: BodyCheck::None,
        },
        precondition: Precondition::PoolAboveFloor,
        effect: PoolEffect::None,
    },
    OperationRecord {
        kind: OperationKind::HealthCheck,
        label: "Health check",
        method: HttpMethod::Get,
        endpoint: Endpoint::Health,
        body: BodyTemplate::None,
        expect: Expectation {
            statuses: &[200],
            latency_ceiling: Duration::from_millis(500),
            body: BodyCheck::StatusUp,
        },
        precondition: Precondition::None,
        effect: PoolEffect::None,
    },
];

impl OperationRecord {
    pub fn for_kind(kind: OperationKind) -> &'static OperationRecord {
        match kind {
            OperationKind::List => &RECORDS[0],
            OperationKind::Create => &RECORDS[1],
            OperationKind::ReadById => &RECORDS[2],
            OperationKind::Update => &RECORDS[3],
            OperationKind::Delete => &RECORDS[4],
            OperationKind::HealthCheck => &RECORDS[5],
        }
    }

    pub fn all() -> &'static [OperationRecord] {
        &RECORDS
    }

    fn decodes_body(&self) -> bool {
        self.expect.body != BodyCheck::None || self.effect != PoolEffect::None
    }
}

/// Operation records bound to the endpoints of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tasks_url: String,
    health_url: String,
}

impl Catalog {
    pub fn new(tasks_url: impl Into<String>, health_url: impl Into<String>) -> Self {
        Self {
            tasks_url: tasks_url.into().trim_end_matches('/').to_string(),
            health_url: health_url.into(),
        }
    }

    pub fn from_config(target: &TargetConfig) -> Self {
        Self::new(target.tasks_url(), target.health_url())
    }

    pub fn tasks_url(&self) -> &str {
        &self.tasks_url
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    fn url(&self, endpoint: Endpoint, id: Option<&TaskId>) -> String {
        match (endpoint, id) {
            (Endpoint::Collection, _) => self.tasks_url.clone(),
            (Endpoint::Item, Some(id)) => format!("{}/{}", self.tasks_url, id),
            (Endpoint::Item, None) => self.tasks_url.clone(),
            (Endpoint::Health, _) => self.health_url.clone(),
        }
    }

    /// Execute one operation.
    ///
    /// Returns `None` without touching the network when the precondition
    /// does not hold. Every other outcome, including transport errors and
    /// undecodable bodies, comes back as a sample.
    pub async fn execute<C, R>(
        &self,
        kind: OperationKind,
        client: &C,
        pool: &mut EntityIdPool,
        rng: &mut R,
    ) -> Option<Sample>
    where
        C: HttpClient + ?Sized,
        R: Rng + Send,
    {
        let record = OperationRecord::for_kind(kind);

        let id = match record.precondition {
            Precondition::None => None,
            Precondition::PoolNonEmpty => Some(pool.pick_random(rng)?),
            Precondition::PoolAboveFloor => Some(pool.remove_last_if_allowed()?),
        };

        let mut request = HttpRequest::new(record.method, self.url(record.endpoint, id.as_ref()));
        match record.body {
            BodyTemplate::None => {}
            BodyTemplate::Create => request = request.with_body(create_payload(rng).into()),
            BodyTemplate::Update => request = request.with_body(update_payload(rng).into()),
        }

        let response = client.send(request).await;

        let decoded = match &response {
            Ok(received) if record.decodes_body() => match received.json::<JsonValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("{} returned an undecodable body: {}", record.label, e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                debug!("{} failed: {}", record.label, e);
                None
            }
        };

        let checks = record
            .expect
            .evaluate(record.label, &response, decoded.as_ref());
        let sample = Sample::from_response(kind, &response, checks);

        if sample.passed {
            match (record.effect, decoded.as_ref()) {
                (PoolEffect::Seed, Some(body)) => {
                    if let Some(ids) = extract_ids(body, pool.limits().seed_cap) {
                        pool.seed(ids);
                    }
                }
                (PoolEffect::Add, Some(body)) => {
                    if let Some(id) = extract_id(body) {
                        pool.add(id);
                    }
                }
                _ => {}
            }
        }

        Some(sample)
    }
}
