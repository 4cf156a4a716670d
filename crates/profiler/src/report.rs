//! Report rendering.
//!
//! A [`MeasurementResult`] is rendered as three blocks in a fixed order:
//! timing, queries, memory. Rendering is pure; writing to a sink is a
//! separate step.

use colored::Colorize;
use std::io::Write;

use crate::config::ProfilerConfig;
use crate::error::ProfilerResult;
use crate::query_log::QueryRecord;
use crate::result::MeasurementResult;
use crate::size::{format_bytes, format_signed_bytes};
use crate::table::Table;

/// Placeholder row for a scope that issued no queries.
pub const NO_QUERIES: &str = "No queries captured";

/// Renders measurement results as terminal tables.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    top_queries: usize,
    max_sql_chars: usize,
    color: bool,
    prettify_sql: bool,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::from_config(&ProfilerConfig::default())
    }
}

impl ReportFormatter {
    /// Create a formatter using the display settings of `config`.
    pub fn from_config(config: &ProfilerConfig) -> Self {
        Self {
            top_queries: config.top_queries,
            max_sql_chars: config.max_sql_chars,
            color: config.color,
            prettify_sql: config.prettify_sql,
        }
    }

    /// Render the full report. `full` lists every query untruncated.
    pub fn render(&self, result: &MeasurementResult, full: bool) -> String {
        let queries = if full {
            self.render_all_queries(result)
        } else {
            self.render_top_queries(result)
        };

        let mut output = String::new();
        output.push('\n');
        output.push_str(&self.render_timing(result));
        output.push('\n');
        output.push_str(&queries);
        output.push('\n');
        output.push_str(&self.render_memory(result));
        output.push('\n');
        output
    }

    /// Render and write the report to `sink`.
    pub fn write_report<W: Write + ?Sized>(
        &self,
        sink: &mut W,
        result: &MeasurementResult,
        full: bool,
    ) -> ProfilerResult<()> {
        sink.write_all(self.render(result, full).as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Elapsed CPU time, total query time and query count.
    pub fn render_timing(&self, result: &MeasurementResult) -> String {
        Table::new(format!(" {} time ", result.label))
            .row([
                self.paint("Total time:", Tint::Green),
                format!("{:.4}s", result.elapsed_cpu_seconds),
            ])
            .row([
                self.paint("Database queries time:", Tint::Yellow),
                format!("{:.4}s", result.total_query_time),
            ])
            .row([
                self.paint("Queries count:", Tint::Cyan),
                result.query_count().to_string(),
            ])
            .render()
    }

    /// The slowest queries, one row each, SQL truncated.
    pub fn render_top_queries(&self, result: &MeasurementResult) -> String {
        let shown = result.top_queries(self.top_queries);
        let title = format!(
            " {} top {} of {} queries ",
            result.label,
            shown.len(),
            result.query_count()
        );

        let mut table = Table::new(title);
        if result.queries.is_empty() {
            table = table.row([NO_QUERIES]);
        }
        for query in shown {
            let sql: String = self.display_sql(query).chars().take(self.max_sql_chars).collect();
            table = table.row([format!("{} {}", self.duration_tag(query), sql)]);
        }
        table.render()
    }

    /// Every query as a `[duration] sql` line, untruncated.
    pub fn render_all_queries(&self, result: &MeasurementResult) -> String {
        let mut output = format!(" {} all {} queries \n", result.label, result.queries.len());
        if result.queries.is_empty() {
            output.push_str(NO_QUERIES);
            output.push('\n');
        }
        for query in &result.queries {
            output.push_str(&format!("{} {}\n", self.duration_tag(query), self.display_sql(query)));
        }
        output
    }

    /// Memory before, after and the signed difference.
    pub fn render_memory(&self, result: &MeasurementResult) -> String {
        Table::new(format!(" {} memory ", result.label))
            .row([
                self.paint("Memory before:", Tint::Green),
                format_bytes(result.memory_before),
            ])
            .row([
                self.paint("Memory after:", Tint::Yellow),
                format_bytes(result.memory_after),
            ])
            .row([
                self.paint("Memory difference:", Tint::Cyan),
                format_signed_bytes(result.memory_delta),
            ])
            .render()
    }

    fn display_sql(&self, query: &QueryRecord) -> String {
        if self.prettify_sql {
            prettify_sql(&query.sql_text)
        } else {
            query.sql_text.clone()
        }
    }

    fn duration_tag(&self, query: &QueryRecord) -> String {
        let tag = format!("[{:.3}]", query.duration_seconds);
        if self.color {
            tag.red().bold().to_string()
        } else {
            tag
        }
    }

    fn paint(&self, text: &str, tint: Tint) -> String {
        if !self.color {
            return text.to_string();
        }
        match tint {
            Tint::Green => text.green().to_string(),
            Tint::Yellow => text.yellow().to_string(),
            Tint::Cyan => text.cyan().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tint {
    Green,
    Yellow,
    Cyan,
}

/// Drop double quotes and put a space after every comma.
pub fn prettify_sql(sql: &str) -> String {
    sql.replace('"', "").replace(',', ", ")
}
