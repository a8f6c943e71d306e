use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatrix;
use crate::error::{Result, RqaError};
use crate::params::AnalysisMode;

/// Cells around the main diagonal that never count as recurrences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionBand {
    /// Nothing excluded (cross recurrence).
    None,
    /// Cells with `|i - j| <= w` are excluded. `Theiler(0)` drops only the main diagonal.
    Theiler(usize),
}

impl ExclusionBand {
    pub fn for_mode(mode: AnalysisMode, theiler_window: usize) -> Self {
        match mode {
            AnalysisMode::Auto => Self::Theiler(theiler_window),
            AnalysisMode::Cross => Self::None,
        }
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        match *self {
            Self::None => false,
            Self::Theiler(w) => i.abs_diff(j) <= w,
        }
    }

    /// Whether the whole diagonal at offset `d = j - i` is excluded.
    pub fn excludes_offset(&self, d: isize) -> bool {
        match *self {
            Self::None => false,
            Self::Theiler(w) => d.unsigned_abs() <= w,
        }
    }

    /// Half-open row range `[lo, hi)` of column `j` that lies inside the band.
    /// Empty (`lo == hi`) when the column has no excluded cells.
    pub(crate) fn rows_in_column(&self, j: usize, rows: usize) -> (usize, usize) {
        match *self {
            Self::None => (0, 0),
            Self::Theiler(w) => {
                let lo = j.saturating_sub(w).min(rows);
                let hi = j.saturating_add(w).saturating_add(1).min(rows);
                (lo, hi.max(lo))
            }
        }
    }
}

/// Length of the diagonal at offset `d = j - i` in a `rows x cols` matrix.
pub fn diagonal_len(rows: usize, cols: usize, d: isize) -> usize {
    let k = d.unsigned_abs();
    if d >= 0 {
        if k >= cols { 0 } else { rows.min(cols - k) }
    } else if k >= rows {
        0
    } else {
        (rows - k).min(cols)
    }
}

/// Number of cells outside `band`; the recurrence-rate denominator.
pub fn eligible_cells(rows: usize, cols: usize, band: ExclusionBand) -> usize {
    let total = rows * cols;
    match band {
        ExclusionBand::None => total,
        ExclusionBand::Theiler(w) => {
            let w = w.min(rows.max(cols)) as isize;
            let excluded: usize = (-w..=w).map(|d| diagonal_len(rows, cols, d)).sum();
            total - excluded
        }
    }
}

/// Longest diagonal that survives the band; no diagonal line can be longer.
pub fn longest_possible_line(rows: usize, cols: usize, band: ExclusionBand) -> usize {
    let lo = -(rows as isize - 1);
    let hi = cols as isize - 1;
    (lo..=hi)
        .filter(|&d| !band.excludes_offset(d))
        .map(|d| diagonal_len(rows, cols, d))
        .max()
        .unwrap_or(0)
}

/// Binary recurrence matrix, row-major, one byte per cell (0 or 1).
///
/// Deserialization goes through [`RecurrenceMatrix::from_cells`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct RecurrenceMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl RecurrenceMatrix {
    /// 0x0 matrix returned alongside degenerate-input outcomes.
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
        }
    }

    /// Build from raw 0/1 cells. Returns `None` on a shape mismatch or a
    /// cell value other than 0 or 1.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Option<Self> {
        if cells.len() != rows.checked_mul(cols)? || cells.iter().any(|&c| c > 1) {
            return None;
        }
        Some(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> u8 {
        self.cells[i * self.cols + j]
    }

    pub fn is_recurrent(&self, i: usize, j: usize) -> bool {
        self.get(i, j) == 1
    }

    pub fn row(&self, i: usize) -> &[u8] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Number of 1-cells. Excluded cells are stored as 0, so this is the
    /// count outside the band.
    pub fn recurrence_count(&self) -> usize {
        self.cells.iter().map(|&c| c as usize).sum()
    }

    pub fn is_symmetric(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|i| ((i + 1)..self.cols).all(|j| self.get(i, j) == self.get(j, i)))
    }
}

#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl TryFrom<RawMatrix> for RecurrenceMatrix {
    type Error = String;

    fn try_from(raw: RawMatrix) -> std::result::Result<Self, Self::Error> {
        let (rows, cols, len) = (raw.rows, raw.cols, raw.cells.len());
        Self::from_cells(rows, cols, raw.cells).ok_or_else(|| {
            format!("recurrence matrix {rows}x{cols} needs {rows}*{cols} cells of 0 or 1, got {len}")
        })
    }
}

/// `R[i,j] = 1` iff `rescaled[i,j] <= radius` and `(i, j)` lies outside `band`.
pub fn threshold(
    rescaled: &DistanceMatrix,
    radius: f64,
    band: ExclusionBand,
) -> Result<RecurrenceMatrix> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(RqaError::degenerate(format!(
            "radius must be finite and >= 0, got {radius}"
        )));
    }
    let rows = rescaled.rows();
    let cols = rescaled.cols();
    if eligible_cells(rows, cols, band) == 0 {
        return Err(RqaError::degenerate(format!(
            "exclusion band {band:?} leaves no cells in a {rows}x{cols} matrix"
        )));
    }

    let mut cells = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            let hit = !band.contains(i, j) && rescaled.get(i, j) <= radius;
            cells.push(u8::from(hit));
        }
    }

    Ok(RecurrenceMatrix { rows, cols, cells })
}
