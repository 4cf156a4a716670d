//! Query log collaborator and query collection.
//!
//! The host owns the log and keeps it isolated per request; the profiler only
//! resets it on scope entry and reads it back after the work completes.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// A single executed query as recorded by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    /// SQL text as executed
    pub sql_text: String,
    /// Wall time spent in the query
    pub duration_seconds: f64,
}

impl QueryRecord {
    /// Create a record from SQL text and a duration in seconds.
    pub fn new(sql_text: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            sql_text: sql_text.into(),
            duration_seconds,
        }
    }

    fn has_sql(&self) -> bool {
        !self.sql_text.trim().is_empty()
    }
}

/// Per-request query log maintained by the host.
pub trait QueryLog: Send + Sync {
    /// Discard every recorded query.
    fn reset(&self);

    /// Every query recorded since the last reset, in execution order.
    fn read_all(&self) -> Vec<QueryRecord>;
}

/// A simple mutex-guarded query log.
///
/// Suitable for single-request tools and tests. Hosts serving concurrent
/// requests should give each request its own instance.
#[derive(Debug, Default)]
pub struct InMemoryQueryLog {
    records: Mutex<Vec<QueryRecord>>,
}

impl InMemoryQueryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an executed query.
    pub fn record(&self, sql_text: impl Into<String>, duration: Duration) {
        self.push(QueryRecord::new(sql_text, duration.as_secs_f64()));
    }

    /// Append a prebuilt record.
    pub fn push(&self, record: QueryRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }

    /// Number of recorded queries.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueryLog for InMemoryQueryLog {
    fn reset(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    fn read_all(&self) -> Vec<QueryRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Keep the records with SQL text and order them slowest first.
///
/// The sort is stable, so queries with equal durations keep their
/// execution order.
pub fn collect_queries(records: Vec<QueryRecord>) -> Vec<QueryRecord> {
    let mut queries: Vec<QueryRecord> = records.into_iter().filter(QueryRecord::has_sql).collect();
    queries.sort_by(|a, b| b.duration_seconds.total_cmp(&a.duration_seconds));
    queries
}
