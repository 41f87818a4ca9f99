//! Markdown pipe tables.
//!
//! Alignment markers in the underline row are discarded; a rendered table
//! always uses a plain `|-|-|` underline.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::TableError;

static ROW_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|.*\|$").unwrap());
static LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(?P<text>[^\]]*)\]\([^)]*\)").unwrap());

/// A markdown table: column headings plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headings: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given column headings.
    pub fn new<I, S>(headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headings: headings.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Appends a body row.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Index of the column whose heading equals `heading` (case-insensitive).
    pub fn column(&self, heading: &str) -> Option<usize> {
        self.headings
            .iter()
            .position(|h| h.eq_ignore_ascii_case(heading))
    }

    /// Finds the first row whose `key_column` cell, once normalised, equals `key`.
    pub fn find_row(&self, key_column: &str, key: &str) -> Option<&[String]> {
        let col = self.column(key_column)?;
        self.rows
            .iter()
            .find(|row| row.get(col).is_some_and(|cell| normalize_cell(cell) == key))
            .map(Vec::as_slice)
    }

    /// Returns a cell of `row` by column heading.
    pub fn cell<'a>(&self, row: &'a [String], heading: &str) -> Option<&'a str> {
        let col = self.column(heading)?;
        row.get(col).map(String::as_str)
    }

    /// Tokenises the table starting at `lines[*ix]`.
    ///
    /// Returns `Ok(None)` and leaves `ix` untouched when that line is not a
    /// table row. Otherwise `ix` is left on the first line after the table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::CellCountMismatch`] when a row's cell count
    /// differs from the heading row's.
    pub fn parse_next(
        file_name: &str,
        lines: &[String],
        ix: &mut usize,
    ) -> Result<Option<Table>, TableError> {
        let Some(first) = lines.get(*ix).and_then(|l| as_row(l)) else {
            return Ok(None);
        };

        let mut table = Table {
            headings: split_cells(first),
            rows: Vec::new(),
        };
        *ix += 1;

        let mut underline_seen = false;
        while let Some(row) = lines.get(*ix).and_then(|l| as_row(l)) {
            let cells = split_cells(row);
            if cells.len() != table.headings.len() {
                return Err(TableError::CellCountMismatch {
                    file: file_name.to_string(),
                    line: *ix + 1,
                    expected: table.headings.len(),
                    found: cells.len(),
                });
            }
            if underline_seen {
                table.rows.push(cells);
            } else {
                underline_seen = true;
            }
            *ix += 1;
        }

        Ok(Some(table))
    }

    /// Renders the table as markdown, one line per row, without a trailing newline.
    pub fn render(&self) -> String {
        let mut out = render_row(&self.headings);
        out.push('\n');
        out.push('|');
        for _ in &self.headings {
            out.push_str("-|");
        }
        for row in &self.rows {
            out.push('\n');
            out.push_str(&render_row(row));
        }
        out
    }
}

fn render_row(cells: &[String]) -> String {
    let mut out = String::from("|");
    for cell in cells {
        out.push(' ');
        out.push_str(cell);
        out.push_str(" |");
    }
    out
}

fn as_row(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    ROW_REGEX.is_match(trimmed).then_some(trimmed)
}

/// Splits `| a | b |` into trimmed cells; `\|` is kept as part of a cell.
fn split_cells(row: &str) -> Vec<String> {
    let inner = row
        .strip_prefix('|')
        .and_then(|r| r.strip_suffix('|'))
        .unwrap_or(row);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in inner.chars() {
        match ch {
            '|' if !escaped => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
        escaped = ch == '\\' && !escaped;
    }
    cells.push(current.trim().to_string());
    cells
}

/// Strips markdown decoration from a cell so it can be compared with a plain name.
///
/// `[**OneXEnabled**](#onexenabled)` becomes `OneXEnabled`.
pub fn normalize_cell(cell: &str) -> String {
    let unlinked = LINK_REGEX.replace_all(cell, "$text");
    unlinked
        .replace("\\_", "_")
        .replace(['*', '`'], "")
        .trim()
        .to_string()
}
