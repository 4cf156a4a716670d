//! Measurement scopes.
//!
//! One primitive (begin, run, complete) is exposed in two shapes: closure
//! wrappers ([`Profiler::profile`], [`Profiler::wrap`]) and a guard
//! ([`Profiler::scope`]) that reports when [`ProfileScope::finish`] is
//! called.
//!
//! When the debug flag is off every entry point is a pass-through: no probe
//! is read, the query log is left alone and nothing is printed. When the
//! profiled work fails, by returning `Err`, unwinding, or dropping the guard
//! early, the measurement is discarded without a report.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::config::ProfilerConfig;
use crate::query_log::QueryLog;
use crate::report::ReportFormatter;
use crate::result::MeasurementResult;
use crate::snapshot::{CpuClock, MemoryReader, ProcessCpuClock, ProcessMemoryReader, Snapshot};

/// Build a `"<module path> [<line>]"` label at the call site.
///
/// ```rust
/// let label = profiler::profile_label!();
/// assert!(label.contains(" ["));
///
/// let named = profiler::profile_label!("checkout");
/// assert!(named.starts_with("checkout ["));
/// ```
#[macro_export]
macro_rules! profile_label {
    () => {
        concat!(module_path!(), " [", line!(), "]")
    };
    ($name:literal) => {
        concat!($name, " [", line!(), "]")
    };
}

/// Per-scope options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Title used for every table of the report
    pub label: String,
    /// Overrides [`ProfilerConfig::full`] for this scope
    pub full: Option<bool>,
}

impl ScopeOptions {
    /// Create options with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            full: None,
        }
    }

    /// List every query for this scope instead of the top N.
    pub fn full(mut self, full: bool) -> Self {
        self.full = Some(full);
        self
    }
}

impl From<&str> for ScopeOptions {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ScopeOptions {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

/// State carried from scope entry to completion.
#[derive(Debug)]
struct ActiveMeasurement {
    label: String,
    full: bool,
    before: Snapshot,
}

/// Debug-only profiler for request handlers.
///
/// # Example
///
/// ```rust
/// use profiler::{InMemoryQueryLog, Profiler, ProfilerConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let log = Arc::new(InMemoryQueryLog::new());
/// let profiler = Profiler::new(ProfilerConfig::new(true), log.clone())
///     .with_sink(std::io::sink());
///
/// let rows = profiler.profile("list_countries", || {
///     log.record("SELECT * FROM country", Duration::from_millis(4));
///     42
/// });
/// assert_eq!(rows, 42);
/// ```
pub struct Profiler {
    config: ProfilerConfig,
    formatter: ReportFormatter,
    query_log: Arc<dyn QueryLog>,
    clock: Box<dyn CpuClock>,
    memory: Box<dyn MemoryReader>,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Profiler {
    /// Create a profiler reading the host's query log, probing the current
    /// process and writing reports to stdout.
    pub fn new(config: ProfilerConfig, query_log: Arc<dyn QueryLog>) -> Self {
        Self {
            formatter: ReportFormatter::from_config(&config),
            config,
            query_log,
            clock: Box::new(ProcessCpuClock::new()),
            memory: Box::new(ProcessMemoryReader::new()),
            sink: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    /// Replace the CPU clock.
    pub fn with_cpu_clock(mut self, clock: impl CpuClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the memory reader.
    pub fn with_memory_reader(mut self, memory: impl MemoryReader + 'static) -> Self {
        self.memory = Box::new(memory);
        self
    }

    /// Write reports to `sink` instead of stdout.
    pub fn with_sink(mut self, sink: impl Write + Send + 'static) -> Self {
        self.sink = Mutex::new(Box::new(sink));
        self
    }

    /// The configuration this profiler was built with.
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Whether scopes measure at all.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.debug
    }

    /// Run `work` inside a measured scope and return its value unchanged.
    ///
    /// A panic in `work` unwinds straight through; no report is written.
    pub fn profile<T>(&self, options: impl Into<ScopeOptions>, work: impl FnOnce() -> T) -> T {
        if !self.is_enabled() {
            return work();
        }

        let active = self.begin(options.into());
        let value = work();
        self.finish(active);
        value
    }

    /// Run fallible `work` inside a measured scope.
    ///
    /// `Ok` values are reported and returned; an `Err` is returned untouched
    /// and the measurement is discarded.
    pub fn try_profile<T, E>(
        &self,
        options: impl Into<ScopeOptions>,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        if !self.is_enabled() {
            return work();
        }

        let active = self.begin(options.into());
        match work() {
            Ok(value) => {
                self.finish(active);
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(target: "profiler", label = %active.label, "work failed, report skipped");
                Err(err)
            }
        }
    }

    /// Run `work` inside a measured scope and hand back the measurement
    /// instead of printing it. The result is `None` when debug is off.
    pub fn measure<T>(
        &self,
        options: impl Into<ScopeOptions>,
        work: impl FnOnce() -> T,
    ) -> (T, Option<MeasurementResult>) {
        if !self.is_enabled() {
            return (work(), None);
        }

        let active = self.begin(options.into());
        let value = work();
        (value, Some(self.complete(active)))
    }

    /// Wrap `handler` so that every call is profiled.
    ///
    /// The returned function has the same argument and return types. Pass
    /// several arguments as a tuple.
    pub fn wrap<'a, A, T, F>(
        &'a self,
        options: impl Into<ScopeOptions>,
        handler: F,
    ) -> impl Fn(A) -> T + 'a
    where
        F: Fn(A) -> T + 'a,
        A: 'a,
        T: 'a,
    {
        let options = options.into();
        move |arg| self.profile(options.clone(), || handler(arg))
    }

    /// Wrap a fallible `handler`; failed calls are not reported.
    pub fn try_wrap<'a, A, T, E, F>(
        &'a self,
        options: impl Into<ScopeOptions>,
        handler: F,
    ) -> impl Fn(A) -> Result<T, E> + 'a
    where
        F: Fn(A) -> Result<T, E> + 'a,
        A: 'a,
        T: 'a,
        E: 'a,
    {
        let options = options.into();
        move |arg| self.try_profile(options.clone(), || handler(arg))
    }

    /// Open a guard-based scope around a block of code.
    ///
    /// Call [`ProfileScope::finish`] at the end of the block. If the guard is
    /// dropped first, for instance by an early `?` return, nothing is
    /// reported.
    pub fn scope(&self, options: impl Into<ScopeOptions>) -> ProfileScope<'_> {
        let active = if self.is_enabled() {
            Some(self.begin(options.into()))
        } else {
            None
        };

        ProfileScope {
            profiler: self,
            active,
        }
    }

    fn begin(&self, options: ScopeOptions) -> ActiveMeasurement {
        tracing::trace!(target: "profiler", label = %options.label, "scope entered");

        let before = Snapshot::capture(self.clock.as_ref(), self.memory.as_ref());
        self.query_log.reset();

        ActiveMeasurement {
            full: options.full.unwrap_or(self.config.full),
            label: options.label,
            before,
        }
    }

    fn complete(&self, active: ActiveMeasurement) -> MeasurementResult {
        let after = Snapshot::capture(self.clock.as_ref(), self.memory.as_ref());
        let records = self.query_log.read_all();
        MeasurementResult::new(active.label, &active.before, &after, records)
    }

    fn finish(&self, active: ActiveMeasurement) {
        let full = active.full;
        let result = self.complete(active);
        self.report(&result, full);
    }

    fn report(&self, result: &MeasurementResult, full: bool) {
        tracing::debug!(
            target: "profiler",
            label = %result.label,
            elapsed_cpu_seconds = result.elapsed_cpu_seconds,
            query_count = result.query_count(),
            total_query_time = result.total_query_time,
            memory_delta = result.memory_delta,
            "scope measured"
        );

        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = self.formatter.write_report(&mut **sink, result, full) {
            tracing::warn!(target: "profiler", error = %err, "failed to write report");
        }
    }
}

/// Guard returned by [`Profiler::scope`].
#[must_use = "a scope reports only when `finish` is called"]
pub struct ProfileScope<'p> {
    profiler: &'p Profiler,
    active: Option<ActiveMeasurement>,
}

impl ProfileScope<'_> {
    /// Whether this scope is measuring (debug mode was on at entry).
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Close the scope and write its report.
    pub fn finish(mut self) {
        if let Some(active) = self.active.take() {
            self.profiler.finish(active);
        }
    }
}

impl Drop for ProfileScope<'_> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(
                target: "profiler",
                label = %active.label,
                "scope dropped before finish, report skipped"
            );
        }
    }
}
