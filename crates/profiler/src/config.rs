//! Profiler configuration.
//!
//! The debug flag is fixed when the [`Profiler`](crate::Profiler) is built
//! and stays read-only for the life of the process.

use serde::{Deserialize, Serialize};

/// Number of queries shown in the compact query table.
pub const DEFAULT_TOP_QUERIES: usize = 10;

/// Maximum SQL characters per row in the compact query table.
pub const DEFAULT_MAX_SQL_CHARS: usize = 200;

/// Configuration for a [`Profiler`](crate::Profiler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilerConfig {
    /// Master switch. When false every scope is a pass-through.
    pub debug: bool,
    /// Emit every captured query instead of the top N.
    pub full: bool,
    /// Rows shown in the compact query table
    pub top_queries: usize,
    /// SQL truncation length in the compact query table
    pub max_sql_chars: usize,
    /// Emit ANSI colors
    pub color: bool,
    /// Strip double quotes and space out commas in displayed SQL
    pub prettify_sql: bool,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            full: false,
            top_queries: DEFAULT_TOP_QUERIES,
            max_sql_chars: DEFAULT_MAX_SQL_CHARS,
            color: true,
            prettify_sql: true,
        }
    }
}

impl ProfilerConfig {
    /// Create a config with the given debug flag and default display settings.
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            ..Default::default()
        }
    }

    /// Read the config from process environment variables.
    ///
    /// See [`ProfilerConfig::from_lookup`] for the recognized variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a key lookup.
    ///
    /// Recognized keys: `PROFILER_DEBUG`, `PROFILER_FULL`,
    /// `PROFILER_TOP_QUERIES`, `PROFILER_COLOR` and `NO_COLOR`. Unset or
    /// unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(debug) = lookup("PROFILER_DEBUG").and_then(|v| parse_flag(&v)) {
            config.debug = debug;
        }
        if let Some(full) = lookup("PROFILER_FULL").and_then(|v| parse_flag(&v)) {
            config.full = full;
        }
        if let Some(top) = lookup("PROFILER_TOP_QUERIES").and_then(|v| v.trim().parse().ok()) {
            config.top_queries = top;
        }
        if let Some(color) = lookup("PROFILER_COLOR").and_then(|v| parse_flag(&v)) {
            config.color = color;
        }
        // https://no-color.org: any non-empty value disables color
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            config.color = false;
        }

        config
    }

    /// Set the debug flag.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Emit every captured query by default.
    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    /// Set the number of rows in the compact query table.
    pub fn with_top_queries(mut self, count: usize) -> Self {
        self.top_queries = count;
        self
    }

    /// Set the SQL truncation length for the compact query table.
    pub fn with_max_sql_chars(mut self, chars: usize) -> Self {
        self.max_sql_chars = chars;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Enable or disable SQL prettifying.
    pub fn with_prettify_sql(mut self, prettify: bool) -> Self {
        self.prettify_sql = prettify;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
