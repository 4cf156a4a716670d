//! Error types for the profiler.

use thiserror::Error;

/// Errors raised by the measurement and reporting machinery.
///
/// These never surface through the profiled work itself: the scope logs
/// them and degrades instead.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// The resident memory of the current process could not be read
    #[error("Memory probe unavailable: {0}")]
    MemoryUnavailable(String),

    /// Writing the report to the output sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize a measurement
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for profiler operations.
pub type ProfilerResult<T> = Result<T, ProfilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProfilerError::MemoryUnavailable("no such process".to_string());
        assert_eq!(err.to_string(), "Memory probe unavailable: no such process");

        let err: ProfilerError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert_eq!(err.to_string(), "I/O error: pipe closed");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err: Result<(), serde_json::Error> = serde_json::from_str::<()>("invalid json");
        let err: ProfilerError = json_err.unwrap_err().into();
        assert!(matches!(err, ProfilerError::Serialization(_)));
    }
}
