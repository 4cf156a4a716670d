//! Request Profiler
//!
//! Debug-only instrumentation for request handlers. A measured scope reports:
//! - Process CPU time spent in the scope
//! - Database queries issued in the scope, slowest first, with their total time
//! - Resident memory before and after, and the difference
//!
//! The report is printed as three terminal tables. When the profiler is built
//! with the debug flag off, every scope is a pass-through with no measurement
//! and no output.
//!
//! # Example
//!
//! ```rust
//! use profiler::{InMemoryQueryLog, Profiler, ProfilerConfig, ScopeOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let log = Arc::new(InMemoryQueryLog::new());
//! let profiler = Profiler::new(ProfilerConfig::from_env(), log.clone());
//!
//! // Closure form
//! let body = profiler.profile(profiler::profile_label!("get_countries"), || {
//!     log.record("SELECT * FROM country", Duration::from_millis(3));
//!     "OK"
//! });
//! assert_eq!(body, "OK");
//!
//! // Guard form
//! let scope = profiler.scope(ScopeOptions::new("get_cities").full(true));
//! log.record("SELECT * FROM city", Duration::from_millis(5));
//! scope.finish();
//! ```
//!
//! # Modules
//!
//! - [`config`] - Debug flag and display settings
//! - [`scope`] - The profiler and its measured scopes
//! - [`snapshot`] - CPU and memory probes
//! - [`query_log`] - Query log collaborator and query ordering
//! - [`report`] - Table rendering
//! - [`size`] - Human-readable byte sizes

pub mod config;
mod error;
pub mod query_log;
pub mod report;
mod result;
pub mod scope;
pub mod size;
pub mod snapshot;
mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ProfilerConfig;
pub use error::{ProfilerError, ProfilerResult};
pub use query_log::{InMemoryQueryLog, QueryLog, QueryRecord};
pub use report::ReportFormatter;
pub use result::MeasurementResult;
pub use scope::{ProfileScope, Profiler, ScopeOptions};
pub use size::format_bytes;
pub use snapshot::{CpuClock, MemoryReader, ProcessCpuClock, ProcessMemoryReader, Snapshot};
