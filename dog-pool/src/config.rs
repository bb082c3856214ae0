//! # Pool configuration
//!
//! [`PoolConfig`] carries the fixed worker count plus a few knobs for thread
//! naming and event buffering. Values can be set in code with the `with_*`
//! builders or layered from the environment:
//!
//! ```bash
//! export DOGPOOL__WORKER_COUNT=8
//! export DOGPOOL__THREAD_NAME_PREFIX=ingest
//! ```
//!
//! ```rust
//! use dog_pool::PoolConfig;
//! let config = PoolConfig::from_env("DOGPOOL__").unwrap();
//! assert!(config.worker_count >= 1);
//! ```

use crate::{PoolError, PoolResult};

const DEFAULT_THREAD_NAME_PREFIX: &str = "dog-pool-worker";
const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration for a job queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads launched by `start`
    pub worker_count: usize,
    /// Worker threads are named `{prefix}-{index}`
    pub thread_name_prefix: String,
    /// Buffer size of the job event broadcast channel
    pub event_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Default configuration with an explicit worker count
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Reject configurations the pool cannot run with
    pub fn validate(&self) -> PoolResult<()> {
        if self.worker_count == 0 {
            return Err(PoolError::InvalidWorkerCount(self.worker_count));
        }
        if self.event_capacity == 0 {
            return Err(PoolError::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Defaults overridden by environment variables starting with `prefix`.
    ///
    /// `DOGPOOL__WORKER_COUNT` → `worker_count`, and so on.
    pub fn from_env(prefix: &str) -> PoolResult<Self> {
        Self::default().with_overrides(prefix, std::env::vars())
    }

    /// Apply `(key, value)` overrides whose key starts with `prefix`.
    ///
    /// Keys are matched case-insensitively; unknown keys are ignored.
    pub fn with_overrides<I, K, V>(mut self, prefix: &str, vars: I) -> PoolResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(stripped) = key.as_ref().strip_prefix(prefix) else {
                continue;
            };
            let normalized = stripped.to_lowercase().replace("__", ".");
            let value = value.as_ref().trim();

            match normalized.as_str() {
                "worker_count" => self.worker_count = parse_usize(&normalized, value)?,
                "thread_name_prefix" => self.thread_name_prefix = value.to_string(),
                "event_capacity" => self.event_capacity = parse_usize(&normalized, value)?,
                _ => {}
            }
        }

        self.validate()?;
        Ok(self)
    }
}

fn parse_usize(key: &str, value: &str) -> PoolResult<usize> {
    value
        .parse()
        .map_err(|_| PoolError::Config(format!("{key}: expected an unsigned integer, got {value:?}")))
}
