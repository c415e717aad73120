//! Per-virtual-user working set of task ids

use crate::error::{DriverError, DriverResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::fmt;
use taskload_config::PoolConfig;

/// Ids taken from a list response
pub const DEFAULT_SEED_CAP: usize = 10;
/// Ids retained after a create
pub const DEFAULT_RETAIN_CAP: usize = 20;
/// Size at or below which deletes are skipped
pub const DEFAULT_DELETE_FLOOR: usize = 5;

/// Identifier of a task as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an id from a JSON value.
    ///
    /// Strings must be non-empty and numbers non-zero; anything else counts
    /// as a missing id.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) if !s.is_empty() => Some(Self(s.clone())),
            JsonValue::Number(n) if n.as_f64() != Some(0.0) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Pool size limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub seed_cap: usize,
    pub retain_cap: usize,
    pub delete_floor: usize,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            seed_cap: DEFAULT_SEED_CAP,
            retain_cap: DEFAULT_RETAIN_CAP,
            delete_floor: DEFAULT_DELETE_FLOOR,
        }
    }
}

impl PoolLimits {
    pub fn new(seed_cap: usize, retain_cap: usize, delete_floor: usize) -> DriverResult<Self> {
        if seed_cap == 0 || retain_cap == 0 {
            return Err(DriverError::InvalidPoolLimits(
                "seed_cap and retain_cap must be greater than 0".to_string(),
            ));
        }
        if seed_cap > retain_cap {
            return Err(DriverError::InvalidPoolLimits(format!(
                "seed_cap ({}) cannot exceed retain_cap ({})",
                seed_cap, retain_cap
            )));
        }
        if delete_floor >= retain_cap {
            return Err(DriverError::InvalidPoolLimits(format!(
                "delete_floor ({}) must be below retain_cap ({})",
                delete_floor, retain_cap
            )));
        }
        Ok(Self {
            seed_cap,
            retain_cap,
            delete_floor,
        })
    }
}

impl TryFrom<&PoolConfig> for PoolLimits {
    type Error = DriverError;

    fn try_from(config: &PoolConfig) -> Result<Self, Self::Error> {
        Self::new(config.seed_cap, config.retain_cap, config.delete_floor)
    }
}

/// Bounded working set of task ids known to one virtual user.
///
/// Oldest ids sit at the front. The pool never holds more than
/// `retain_cap` ids.
#[derive(Debug, Clone, Default)]
pub struct EntityIdPool {
    ids: VecDeque<TaskId>,
    limits: PoolLimits,
}

impl EntityIdPool {
    pub fn new() -> Self {
        Self::with_limits(PoolLimits::default())
    }

    pub fn with_limits(limits: PoolLimits) -> Self {
        Self {
            ids: VecDeque::with_capacity(limits.retain_cap + 1),
            limits,
        }
    }

    /// Replace the contents with the first `seed_cap` ids, in order
    pub fn seed<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = TaskId>,
    {
        self.ids.clear();
        self.ids.extend(ids.into_iter().take(self.limits.seed_cap));
    }

    /// Append an id, dropping the oldest ones past `retain_cap`
    pub fn add(&mut self, id: TaskId) {
        self.ids.push_back(id);
        while self.ids.len() > self.limits.retain_cap {
            self.ids.pop_front();
        }
    }

    /// Uniform choice over the current contents
    pub fn pick_random<R: Rng>(&self, rng: &mut R) -> Option<TaskId> {
        if self.ids.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.ids.len());
        self.ids.get(index).cloned()
    }

    /// Pop the most recent id unless that would go at or below the floor
    pub fn remove_last_if_allowed(&mut self) -> Option<TaskId> {
        if self.ids.len() <= self.limits.delete_floor {
            return None;
        }
        self.ids.pop_back()
    }

    /// Whether a delete would currently remove anything
    pub fn can_delete(&self) -> bool {
        self.ids.len() > self.limits.delete_floor
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn limits(&self) -> PoolLimits {
        self.limits
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskId> {
        self.ids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn ids(pool: &EntityIdPool) -> Vec<String> {
        pool.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_add_truncates_to_most_recent() {
        let mut pool = EntityIdPool::new();
        for i in 1..=25u64 {
            pool.add(TaskId::from(i));
            assert!(pool.len() <= DEFAULT_RETAIN_CAP);
        }

        let expected: Vec<String> = (6..=25).map(|i: u64| i.to_string()).collect();
        assert_eq!(ids(&pool), expected);
    }

    #[test]
    fn test_seed_takes_first_ids_in_order() {
        let mut pool = EntityIdPool::new();
        pool.add(TaskId::new("stale"));

        pool.seed((100..130u64).map(TaskId::from));

        let expected: Vec<String> = (100..110).map(|i: u64| i.to_string()).collect();
        assert_eq!(ids(&pool), expected);
    }

    #[test]
    fn test_seed_with_nothing_empties_pool() {
        let mut pool = EntityIdPool::new();
        pool.add(TaskId::from(1));
        pool.seed(Vec::new());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_remove_last_respects_floor() {
        let mut pool = EntityIdPool::new();
        for i in 1..=5u64 {
            pool.add(TaskId::from(i));
        }

        assert_eq!(pool.remove_last_if_allowed(), None);
        assert_eq!(pool.len(), 5);

        pool.add(TaskId::from(6));
        assert_eq!(pool.remove_last_if_allowed(), Some(TaskId::from(6)));
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.remove_last_if_allowed(), None);
    }

    #[test]
    fn test_pick_random_on_empty_pool() {
        let pool = EntityIdPool::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pool.pick_random(&mut rng), None);
    }

    #[test]
    fn test_pick_random_stays_within_pool_and_does_not_mutate() {
        let mut pool = EntityIdPool::new();
        for i in 1..=3u64 {
            pool.add(TaskId::from(i));
        }

        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let id = pool.pick_random(&mut rng).unwrap();
            assert!(pool.iter().any(|known| *known == id));
            seen.insert(id);
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_custom_limits() {
        let limits = PoolLimits::new(2, 3, 1).unwrap();
        let mut pool = EntityIdPool::with_limits(limits);
        pool.seed(["a", "b", "c"].into_iter().map(TaskId::new));
        assert_eq!(ids(&pool), vec!["a", "b"]);

        pool.add(TaskId::new("d"));
        pool.add(TaskId::new("e"));
        assert_eq!(ids(&pool), vec!["b", "d", "e"]);

        assert_eq!(pool.remove_last_if_allowed(), Some(TaskId::new("e")));
        assert_eq!(pool.remove_last_if_allowed(), None);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_invalid_limits() {
        assert!(PoolLimits::new(0, 20, 5).is_err());
        assert!(PoolLimits::new(25, 20, 5).is_err());
        assert!(PoolLimits::new(10, 20, 20).is_err());
        assert_eq!(
            PoolLimits::try_from(&PoolConfig::default()).unwrap(),
            PoolLimits::default()
        );
    }

    #[test]
    fn test_task_id_from_json() {
        assert_eq!(TaskId::from_json(&json!(42)), Some(TaskId::new("42")));
        assert_eq!(TaskId::from_json(&json!("a1b2")), Some(TaskId::new("a1b2")));
        assert_eq!(TaskId::from_json(&json!(0)), None);
        assert_eq!(TaskId::from_json(&json!("")), None);
        assert_eq!(TaskId::from_json(&json!(null)), None);
        assert_eq!(TaskId::from_json(&json!({"id": 1})), None);
    }
}
