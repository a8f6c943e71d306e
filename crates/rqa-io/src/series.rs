//! Delimited numeric text: one sample per row, one series per column.
//!
//! Blank lines and lines starting with `#` are skipped. The first remaining
//! line is treated as a header when any of its cells fails to parse as a
//! number; any later non-numeric cell is an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IoError, Result};

/// How cells are separated within a line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    /// Any run of whitespace and/or commas.
    #[default]
    Auto,
    Char(char),
}

impl Delimiter {
    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match *self {
            Delimiter::Auto => line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|cell| !cell.is_empty())
                .collect(),
            Delimiter::Char(c) => line.split(c).map(str::trim).collect(),
        }
    }
}

/// Parsed columns of a series file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Columns {
    pub header: Option<Vec<String>>,
    columns: Vec<Vec<f64>>,
}

impl Columns {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of samples per column.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, index: usize) -> Result<&[f64]> {
        self.columns.get(index).map(Vec::as_slice).ok_or_else(|| {
            IoError::InvalidData(format!(
                "column {index} requested, file has {} column(s)",
                self.width()
            ))
        })
    }

    /// Look up a column by header name.
    pub fn column_named(&self, name: &str) -> Result<&[f64]> {
        let index = self
            .header
            .as_ref()
            .and_then(|h| h.iter().position(|col| col == name))
            .ok_or_else(|| IoError::InvalidData(format!("no column named {name:?}")))?;
        self.column(index)
    }

    /// Row-major view, one `Vec` per sample, for pre-embedded input.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|i| self.columns.iter().map(|col| col[i]).collect())
            .collect()
    }
}

pub fn read_columns(reader: impl BufRead, delimiter: Delimiter) -> Result<Columns> {
    let mut header: Option<Vec<String>> = None;
    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut first = true;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let cells = delimiter.split(trimmed);
        let parsed: std::result::Result<Vec<f64>, usize> = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| cell.parse::<f64>().map_err(|_| col))
            .collect();

        match parsed {
            Err(_) if first => {
                header = Some(cells.iter().map(|c| c.to_string()).collect());
            }
            Err(col) => {
                return Err(IoError::parse(
                    lineno,
                    format!("column {col}: {:?} is not a number", cells[col]),
                ));
            }
            Ok(values) => {
                if columns.is_empty() {
                    columns = vec![Vec::new(); values.len()];
                }
                if values.len() != columns.len() {
                    return Err(IoError::parse(
                        lineno,
                        format!("expected {} cells, found {}", columns.len(), values.len()),
                    ));
                }
                for (col, v) in columns.iter_mut().zip(values) {
                    col.push(v);
                }
            }
        }
        first = false;
    }

    if let Some(h) = &header
        && !columns.is_empty()
        && h.len() != columns.len()
    {
        return Err(IoError::InvalidData(format!(
            "header has {} names but rows have {} cells",
            h.len(),
            columns.len()
        )));
    }

    tracing::debug!(
        width = columns.len(),
        len = columns.first().map_or(0, Vec::len),
        header = header.is_some(),
        "read series"
    );
    Ok(Columns { header, columns })
}

pub fn read_columns_path(path: &Path, delimiter: Delimiter) -> Result<Columns> {
    let file = File::open(path)?;
    read_columns(BufReader::new(file), delimiter)
}
