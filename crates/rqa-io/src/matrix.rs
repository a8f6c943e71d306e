use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rqa_core::RecurrenceMatrix;

use crate::error::Result;

/// One text row per matrix row, cells as `0`/`1` separated by single spaces.
pub fn write_matrix(mut out: impl Write, r: &RecurrenceMatrix) -> Result<()> {
    let mut line = String::with_capacity(r.cols() * 2);
    for i in 0..r.rows() {
        line.clear();
        for (j, &cell) in r.row(i).iter().enumerate() {
            if j > 0 {
                line.push(' ');
            }
            line.push(if cell == 1 { '1' } else { '0' });
        }
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_matrix_path(path: &Path, r: &RecurrenceMatrix) -> Result<()> {
    let file = File::create(path)?;
    write_matrix(BufWriter::new(file), r)?;
    tracing::debug!(path = %path.display(), rows = r.rows(), cols = r.cols(), "wrote recurrence matrix");
    Ok(())
}
