//! Point-in-time process probes.
//!
//! A [`Snapshot`] pairs the process CPU time with its resident memory. Both
//! readings come through small traits so hosts and tests can substitute
//! their own sources.

use cpu_time::ProcessTime;
use std::sync::Mutex;
use std::time::Duration;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::{ProfilerError, ProfilerResult};

/// Source of CPU time consumed by the running process.
///
/// Readings must be monotonically non-decreasing.
pub trait CpuClock: Send + Sync {
    /// CPU time consumed so far, relative to an arbitrary fixed origin.
    fn cpu_time(&self) -> Duration;
}

/// Source of the running process's resident set size.
pub trait MemoryReader: Send + Sync {
    /// Current resident memory in bytes.
    fn resident_bytes(&self) -> ProfilerResult<u64>;
}

/// Process CPU clock backed by the OS per-process CPU accounting.
#[derive(Debug)]
pub struct ProcessCpuClock {
    origin: ProcessTime,
}

impl ProcessCpuClock {
    /// Create a clock whose origin is the current CPU time.
    pub fn new() -> Self {
        Self {
            origin: ProcessTime::now(),
        }
    }
}

impl Default for ProcessCpuClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuClock for ProcessCpuClock {
    fn cpu_time(&self) -> Duration {
        ProcessTime::now().duration_since(self.origin)
    }
}

/// Resident memory reader for the current process.
pub struct ProcessMemoryReader {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessMemoryReader {
    /// Create a reader bound to the current process.
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                tracing::warn!(target: "profiler", error = err, "cannot resolve current pid");
                None
            }
        };

        Self {
            pid,
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for ProcessMemoryReader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessMemoryReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMemoryReader")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

impl MemoryReader for ProcessMemoryReader {
    fn resident_bytes(&self) -> ProfilerResult<u64> {
        let pid = self
            .pid
            .ok_or_else(|| ProfilerError::MemoryUnavailable("current pid unknown".to_string()))?;

        let mut system = self
            .system
            .lock()
            .map_err(|_| ProfilerError::MemoryUnavailable("probe lock poisoned".to_string()))?;

        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            false,
            ProcessRefreshKind::new().with_memory(),
        );

        system
            .process(pid)
            .map(|process| process.memory())
            .ok_or_else(|| ProfilerError::MemoryUnavailable(format!("process {pid} not found")))
    }
}

/// CPU time and resident memory captured at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Process CPU time at capture
    pub cpu_time: Duration,
    /// Resident memory in bytes at capture
    pub memory_rss: u64,
}

impl Snapshot {
    /// Capture a snapshot from the given probes.
    ///
    /// A failed memory read is logged and recorded as zero.
    pub fn capture(clock: &dyn CpuClock, memory: &dyn MemoryReader) -> Self {
        let memory_rss = memory.resident_bytes().unwrap_or_else(|err| {
            tracing::warn!(target: "profiler", error = %err, "memory probe failed");
            0
        });

        Self {
            cpu_time: clock.cpu_time(),
            memory_rss,
        }
    }

    /// CPU seconds elapsed between `earlier` and this snapshot.
    pub fn cpu_seconds_since(&self, earlier: &Snapshot) -> f64 {
        self.cpu_time.saturating_sub(earlier.cpu_time).as_secs_f64()
    }

    /// Signed memory change since `earlier`, saturating at the `i64` range.
    pub fn memory_delta_since(&self, earlier: &Snapshot) -> i64 {
        let delta = i128::from(self.memory_rss) - i128::from(earlier.memory_rss);
        delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}
