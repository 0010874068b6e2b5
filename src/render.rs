//! Text rendering for query results.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use rusqlite::types::ValueRef;
use rusqlite::{Params, Statement};
use serde::Deserialize;
use tabled::settings::Style;

use crate::error::{Error, Result};

/// Printed (and measured) in place of SQL NULL.
pub const NULL_MARKER: &str = "NULL";

/// Spaces added after the widest value of every column.
const COLUMN_GAP: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Left-aligned fixed-width columns
    #[default]
    Column,
    /// ASCII-art table
    Ascii,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// Column names and rows of one query, captured for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Runs a prepared query to completion and captures every row.
    pub fn from_query<P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<Self> {
        let mut table = Self::new(stmt.column_names());
        let column_count = stmt.column_count();

        let mut rows = stmt.query(params)?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                cells.push(format_value(row.get_ref(idx)?));
            }
            table.push_row(cells)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest of the column name and every cell, per column.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell_text(cell).chars().count());
            }
        }
        widths
    }

    pub fn render(&self, mode: OutputMode) -> String {
        match mode {
            OutputMode::Column => self.to_string(),
            OutputMode::Ascii => self.render_ascii(),
        }
    }

    fn render_ascii(&self) -> String {
        let mut builder = tabled::builder::Builder::new();
        builder.set_header(self.columns.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().map(|cell| cell_text(cell).to_string()));
        }
        let mut table = builder.build();
        table.with(Style::ascii());
        format!("\n{table}\n\n")
    }
}

/// The fixed-width column layout, surrounded by blank lines.
impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        writeln!(f)?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "{:<w$}", name, w = width + COLUMN_GAP)?;
        }
        writeln!(f)?;

        for width in &widths {
            write!(f, "{}", "-".repeat(width + COLUMN_GAP))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "{:<w$}", cell_text(cell), w = width + COLUMN_GAP)?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

fn cell_text(cell: &Option<String>) -> &str {
    cell.as_deref().unwrap_or(NULL_MARKER)
}

// Presents SQLite values in human-readable form
fn format_value(v: ValueRef) -> Option<String> {
    match v {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(format!("{i}")),
        ValueRef::Real(r) => Some(format!("{r}")),
        ValueRef::Text(s) => Some(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Some(format!("0x{}", general_purpose::STANDARD_NO_PAD.encode(b))),
    }
}
