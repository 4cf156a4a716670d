//! Deterministic probes and sinks for tests.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ProfilerError, ProfilerResult};
use crate::query_log::{InMemoryQueryLog, QueryLog, QueryRecord};
use crate::snapshot::{CpuClock, MemoryReader};

/// Replays a script of readings, repeating the last one when exhausted.
#[derive(Debug)]
struct Script<T: Copy> {
    values: Vec<T>,
    next: AtomicUsize,
}

impl<T: Copy> Script<T> {
    fn new(values: &[T]) -> Self {
        assert!(!values.is_empty(), "script needs at least one reading");
        Self {
            values: values.to_vec(),
            next: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> T {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        self.values[i.min(self.values.len() - 1)]
    }
}

/// CPU clock returning scripted readings in seconds.
#[derive(Debug)]
pub struct FakeClock(Script<f64>);

impl FakeClock {
    pub fn new(seconds: &[f64]) -> Self {
        Self(Script::new(seconds))
    }
}

impl CpuClock for FakeClock {
    fn cpu_time(&self) -> Duration {
        Duration::from_secs_f64(self.0.next())
    }
}

/// Memory reader returning scripted byte counts.
#[derive(Debug)]
pub struct FakeMemory(Script<u64>);

impl FakeMemory {
    pub fn new(bytes: &[u64]) -> Self {
        Self(Script::new(bytes))
    }
}

impl MemoryReader for FakeMemory {
    fn resident_bytes(&self) -> ProfilerResult<u64> {
        Ok(self.0.next())
    }
}

/// Memory reader that always fails.
#[derive(Debug)]
pub struct FailingMemory;

impl MemoryReader for FailingMemory {
    fn resident_bytes(&self) -> ProfilerResult<u64> {
        Err(ProfilerError::MemoryUnavailable("probe disabled".to_string()))
    }
}

/// Query log that counts resets.
#[derive(Debug, Default)]
pub struct CountingLog {
    inner: InMemoryQueryLog,
    resets: AtomicUsize,
}

impl CountingLog {
    pub fn record(&self, sql: &str, duration: Duration) {
        self.inner.record(sql, duration);
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

impl QueryLog for CountingLog {
    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.inner.reset();
    }

    fn read_all(&self) -> Vec<QueryRecord> {
        self.inner.read_all()
    }
}

/// Cloneable in-memory output sink.
#[derive(Debug, Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
