//! Box-drawn terminal tables with a title in the top border.
//!
//! ```text
//! ┌ checkout [42] time ───┐
//! │ Total time: │ 0.1200s │
//! └─────────────┴─────────┘
//! ```

const HORIZONTAL: char = '\u{2500}';
const VERTICAL: char = '\u{2502}';
const TOP_LEFT: char = '\u{250C}';
const TOP_RIGHT: char = '\u{2510}';
const TOP_JOIN: char = '\u{252C}';
const BOTTOM_LEFT: char = '\u{2514}';
const BOTTOM_RIGHT: char = '\u{2518}';
const BOTTOM_JOIN: char = '\u{2534}';

/// A single-border table with auto-sized columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: String,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Cells may contain ANSI color codes and line breaks.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Render the table, one line per border or row, newline-terminated.
    pub fn render(&self) -> String {
        let mut widths = self.column_widths();
        let title_len = visible_len(&self.title);

        // Widen the last column until the title fits in the top border
        let inner = inner_width(&widths);
        if title_len > inner {
            if let Some(last) = widths.last_mut() {
                *last += title_len - inner;
            } else {
                widths.push(title_len.saturating_sub(2));
            }
        }

        let mut output = String::new();

        let mut top: Vec<char> = border(&widths, TOP_JOIN).chars().collect();
        for (slot, c) in top.iter_mut().zip(self.title.chars()) {
            *slot = c;
        }
        output.push(TOP_LEFT);
        output.extend(top);
        output.push(TOP_RIGHT);
        output.push('\n');

        for row in &self.rows {
            let cells: Vec<Vec<&str>> = (0..widths.len())
                .map(|i| cell_lines(row.get(i).map(String::as_str).unwrap_or("")))
                .collect();
            let height = cells.iter().map(Vec::len).max().unwrap_or(1);

            for line in 0..height {
                output.push(VERTICAL);
                for (cell, width) in cells.iter().zip(&widths) {
                    let text = cell.get(line).copied().unwrap_or("");
                    let padding = width.saturating_sub(visible_len(text));
                    output.push(' ');
                    output.push_str(text);
                    output.push_str(&" ".repeat(padding));
                    output.push(' ');
                    output.push(VERTICAL);
                }
                output.push('\n');
            }
        }

        output.push(BOTTOM_LEFT);
        output.push_str(&border(&widths, BOTTOM_JOIN));
        output.push(BOTTOM_RIGHT);
        output.push('\n');

        output
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        (0..columns)
            .map(|i| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .flat_map(|cell| cell_lines(cell))
                    .map(visible_len)
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Physical lines of a cell; an empty cell still occupies one line.
fn cell_lines(cell: &str) -> Vec<&str> {
    let lines: Vec<&str> = cell.lines().collect();
    if lines.is_empty() {
        vec![""]
    } else {
        lines
    }
}

fn inner_width(widths: &[usize]) -> usize {
    if widths.is_empty() {
        return 0;
    }
    widths.iter().map(|w| w + 2).sum::<usize>() + widths.len() - 1
}

fn border(widths: &[usize], join: char) -> String {
    widths
        .iter()
        .map(|w| HORIZONTAL.to_string().repeat(w + 2))
        .collect::<Vec<_>>()
        .join(&join.to_string())
}

/// Printable width of `s`, ignoring ANSI escape sequences.
pub fn visible_len(s: &str) -> usize {
    strip_ansi_codes(s).chars().count()
}

/// Remove ANSI SGR sequences (`ESC [ ... m`).
pub fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_two_columns() {
        let table = Table::new(" t ")
            .row(["a", "1"])
            .row(["bbb", "22"]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "┌ t ──┬────┐");
        assert_eq!(lines[1], "│ a   │ 1  │");
        assert_eq!(lines[2], "│ bbb │ 22 │");
        assert_eq!(lines[3], "└─────┴────┘");
    }

    #[test]
    fn test_long_title_widens_last_column() {
        let rendered = Table::new(" a rather long title ").row(["x"]).render();
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();

        assert!(rendered.starts_with("┌ a rather long title ┐"));
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_ansi_codes_do_not_count() {
        let colored = "\x1b[32mok\x1b[0m";
        assert_eq!(visible_len(colored), 2);
        assert_eq!(strip_ansi_codes(colored), "ok");

        let rendered = Table::new("").row([colored, "x"]).row(["ok", "y"]).render();
        let plain = strip_ansi_codes(&rendered);
        let widths: Vec<usize> = plain.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_multiline_cells_stay_boxed() {
        let rendered = Table::new(" q ")
            .row(["[0.003] SELECT a\nFROM t\nWHERE x = 1", "n"])
            .row(["short", "m\r\no"])
            .render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "│ [0.003] SELECT a │ n │");
        assert_eq!(lines[2], "│ FROM t           │   │");
        assert_eq!(lines[3], "│ WHERE x = 1      │   │");
        assert_eq!(lines[4], "│ short            │ m │");
        assert_eq!(lines[5], "│                  │ o │");

        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_empty_table() {
        let rendered = Table::new(" empty ").render();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.starts_with("┌ empty "));
    }
}
