//! The outcome of one measured scope.

use serde::{Deserialize, Serialize};

use crate::error::ProfilerResult;
use crate::query_log::{collect_queries, QueryRecord};
use crate::snapshot::Snapshot;

/// Everything captured for one scope invocation.
///
/// Built fresh per invocation, rendered once and then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    /// Report title
    pub label: String,
    /// Process CPU time spent inside the scope
    pub elapsed_cpu_seconds: f64,
    /// Captured queries with SQL text, slowest first
    pub queries: Vec<QueryRecord>,
    /// Entries in the query log, including those without SQL text
    pub captured_count: usize,
    /// Sum of the durations in `queries`
    pub total_query_time: f64,
    /// Resident memory on entry, in bytes
    pub memory_before: u64,
    /// Resident memory on exit, in bytes
    pub memory_after: u64,
    /// `memory_after - memory_before`
    pub memory_delta: i64,
    /// When the scope completed
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl MeasurementResult {
    /// Build a result from the two snapshots and the raw query log.
    ///
    /// Entries without SQL text count towards `captured_count` but are
    /// neither listed nor summed into the total query time.
    pub fn new(
        label: impl Into<String>,
        before: &Snapshot,
        after: &Snapshot,
        records: Vec<QueryRecord>,
    ) -> Self {
        let captured_count = records.len();
        let queries = collect_queries(records);
        let total_query_time = queries.iter().map(|q| q.duration_seconds).sum();

        Self {
            label: label.into(),
            elapsed_cpu_seconds: after.cpu_seconds_since(before),
            queries,
            captured_count,
            total_query_time,
            memory_before: before.memory_rss,
            memory_after: after.memory_rss,
            memory_delta: after.memory_delta_since(before),
            captured_at: chrono::Utc::now(),
        }
    }

    /// Number of entries the query log held when the scope completed.
    pub fn query_count(&self) -> usize {
        self.captured_count
    }

    /// The `n` slowest queries.
    pub fn top_queries(&self, n: usize) -> &[QueryRecord] {
        &self.queries[..n.min(self.queries.len())]
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ProfilerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
