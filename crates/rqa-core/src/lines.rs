//! Line extraction over a recurrence matrix.
//!
//! Three independent passes, each a pure function of the same immutable
//! matrix:
//!
//! - diagonal runs of 1s, one scan per non-excluded diagonal offset;
//! - vertical runs of 1s, one scan per column;
//! - white vertical runs: runs of 0s in a column bounded by 1s on both ends.
//!
//! Column scans are split at the exclusion band so a run never includes or
//! bridges excluded cells. Every pass touches each eligible cell once.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::threshold::{ExclusionBand, RecurrenceMatrix, diagonal_len};

/// A maximal run of equal cells along one line of the matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRun {
    /// Diagonal offset `j - i` for diagonal runs, column index for vertical runs.
    pub index: isize,
    /// Row at which the run begins.
    pub start: usize,
    pub length: usize,
}

/// Every maximal diagonal run of 1s with `length >= min_len`, ordered by
/// offset then start row.
pub fn diagonal_runs(r: &RecurrenceMatrix, band: ExclusionBand, min_len: usize) -> Vec<LineRun> {
    if r.is_empty() {
        return Vec::new();
    }
    let lo = -(r.rows() as isize - 1);
    let hi = r.cols() as isize - 1;

    #[cfg(feature = "rayon")]
    {
        (lo..=hi)
            .into_par_iter()
            .filter(|&d| !band.excludes_offset(d))
            .flat_map_iter(|d| runs_on_diagonal(r, d, min_len))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        (lo..=hi)
            .filter(|&d| !band.excludes_offset(d))
            .flat_map(|d| runs_on_diagonal(r, d, min_len))
            .collect()
    }
}

/// Every maximal vertical run of 1s with `length >= min_len`, ordered by
/// column then start row.
pub fn vertical_runs(r: &RecurrenceMatrix, band: ExclusionBand, min_len: usize) -> Vec<LineRun> {
    per_column(r, |j| {
        let mut out = Vec::new();
        for (start, end) in column_segments(r, band, j) {
            scan_black(column(r, j, start, end), start, min_len, |s, len| {
                out.push(LineRun {
                    index: j as isize,
                    start: s,
                    length: len,
                });
            });
        }
        out
    })
}

/// Every maximal vertical run of 0s bounded above and below by a 1, with
/// `length >= min_len`. Runs touching the matrix edge or the exclusion band
/// are open-ended and are not recorded.
pub fn white_vertical_runs(
    r: &RecurrenceMatrix,
    band: ExclusionBand,
    min_len: usize,
) -> Vec<LineRun> {
    per_column(r, |j| {
        let mut out = Vec::new();
        for (start, end) in column_segments(r, band, j) {
            scan_white(column(r, j, start, end), start, min_len, |s, len| {
                out.push(LineRun {
                    index: j as isize,
                    start: s,
                    length: len,
                });
            });
        }
        out
    })
}

fn runs_on_diagonal(r: &RecurrenceMatrix, d: isize, min_len: usize) -> Vec<LineRun> {
    let len = diagonal_len(r.rows(), r.cols(), d);
    let row0 = if d >= 0 { 0 } else { d.unsigned_abs() };
    let col0 = if d >= 0 { d.unsigned_abs() } else { 0 };

    let cells = (0..len).map(|k| r.get(row0 + k, col0 + k));
    let mut out = Vec::new();
    scan_black(cells, row0, min_len, |start, length| {
        out.push(LineRun {
            index: d,
            start,
            length,
        });
    });
    out
}

fn per_column<F>(r: &RecurrenceMatrix, scan: F) -> Vec<LineRun>
where
    F: Fn(usize) -> Vec<LineRun> + Sync + Send,
{
    if r.is_empty() {
        return Vec::new();
    }

    #[cfg(feature = "rayon")]
    {
        (0..r.cols()).into_par_iter().flat_map_iter(scan).collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        (0..r.cols()).flat_map(scan).collect()
    }
}

/// Row ranges of column `j` outside the band: above it, then below it.
fn column_segments(
    r: &RecurrenceMatrix,
    band: ExclusionBand,
    j: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let (lo, hi) = band.rows_in_column(j, r.rows());
    let segments = if lo == hi {
        [(0, r.rows()), (0, 0)]
    } else {
        [(0, lo), (hi, r.rows())]
    };
    segments.into_iter().filter(|(s, e)| e > s)
}

fn column(
    r: &RecurrenceMatrix,
    j: usize,
    start: usize,
    end: usize,
) -> impl Iterator<Item = u8> + '_ {
    (start..end).map(move |i| r.get(i, j))
}

/// Report `(start, length)` of each maximal run of 1s with `length >= min_len`.
/// `first` is the row (or position) of the first cell yielded.
fn scan_black(
    cells: impl Iterator<Item = u8>,
    first: usize,
    min_len: usize,
    mut emit: impl FnMut(usize, usize),
) {
    let mut run_start = 0;
    let mut run_len = 0;
    for (k, cell) in cells.enumerate() {
        if cell == 1 {
            if run_len == 0 {
                run_start = first + k;
            }
            run_len += 1;
        } else {
            if run_len > 0 && run_len >= min_len {
                emit(run_start, run_len);
            }
            run_len = 0;
        }
    }
    if run_len > 0 && run_len >= min_len {
        emit(run_start, run_len);
    }
}

/// Report each run of 0s that has a 1 directly before and after it.
fn scan_white(
    cells: impl Iterator<Item = u8>,
    first: usize,
    min_len: usize,
    mut emit: impl FnMut(usize, usize),
) {
    let mut seen_black = false;
    let mut run_start = 0;
    let mut run_len = 0;
    for (k, cell) in cells.enumerate() {
        if cell == 0 {
            if seen_black {
                if run_len == 0 {
                    run_start = first + k;
                }
                run_len += 1;
            }
        } else {
            if run_len > 0 && run_len >= min_len {
                emit(run_start, run_len);
            }
            run_len = 0;
            seen_black = true;
        }
    }
    // a trailing run of 0s is open-ended
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[u8]]) -> RecurrenceMatrix {
        let n_rows = rows.len();
        let n_cols = rows[0].len();
        let cells = rows.iter().flat_map(|r| r.iter().copied()).collect();
        RecurrenceMatrix::from_cells(n_rows, n_cols, cells).unwrap()
    }

    fn lengths(runs: &[LineRun]) -> Vec<usize> {
        runs.iter().map(|r| r.length).collect()
    }

    #[test]
    fn test_scan_black_edges() {
        let mut got = Vec::new();
        scan_black([1, 1, 0, 1, 0, 1, 1, 1].into_iter(), 10, 1, |s, l| {
            got.push((s, l))
        });
        assert_eq!(got, vec![(10, 2), (13, 1), (15, 3)]);

        let mut got = Vec::new();
        scan_black([1, 1, 0, 1, 0, 1, 1, 1].into_iter(), 0, 2, |s, l| {
            got.push((s, l))
        });
        assert_eq!(got, vec![(0, 2), (5, 3)]);
    }

    #[test]
    fn test_scan_white_requires_both_bounds() {
        let mut got = Vec::new();
        scan_white([0, 1, 0, 0, 1, 0, 1, 0, 0].into_iter(), 0, 1, |s, l| {
            got.push((s, l))
        });
        assert_eq!(got, vec![(2, 2), (5, 1)]);
    }

    #[test]
    fn test_diagonal_runs_identity_block() {
        // all-ones 4x4, main diagonal excluded
        let r = matrix(&[&[0, 1, 1, 1], &[1, 0, 1, 1], &[1, 1, 0, 1], &[1, 1, 1, 0]]);
        let runs = diagonal_runs(&r, ExclusionBand::Theiler(0), 1);
        let offsets: Vec<isize> = runs.iter().map(|r| r.index).collect();
        assert_eq!(offsets, vec![-3, -2, -1, 1, 2, 3]);
        assert_eq!(lengths(&runs), vec![1, 2, 3, 3, 2, 1]);
        assert_eq!(runs[2].start, 1); // offset -1 starts at row 1
        assert_eq!(runs[3].start, 0);

        let long = diagonal_runs(&r, ExclusionBand::Theiler(0), 3);
        assert_eq!(lengths(&long), vec![3, 3]);
    }

    #[test]
    fn test_diagonal_runs_break_on_zero() {
        let r = matrix(&[
            &[1, 1, 0, 0, 0],
            &[0, 1, 1, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 1, 1],
            &[0, 0, 0, 0, 1],
        ]);
        let runs = diagonal_runs(&r, ExclusionBand::None, 1);
        // offset 0: 1,1,0,1,1 ; offset 1: 1,1,0,1
        let main: Vec<(usize, usize)> = runs
            .iter()
            .filter(|r| r.index == 0)
            .map(|r| (r.start, r.length))
            .collect();
        assert_eq!(main, vec![(0, 2), (3, 2)]);
        let upper: Vec<(usize, usize)> = runs
            .iter()
            .filter(|r| r.index == 1)
            .map(|r| (r.start, r.length))
            .collect();
        assert_eq!(upper, vec![(0, 2), (3, 1)]);
    }

    #[test]
    fn test_diagonal_runs_rectangular() {
        let r = matrix(&[&[1, 1, 1], &[1, 1, 1]]);
        let runs = diagonal_runs(&r, ExclusionBand::None, 1);
        let offsets: Vec<isize> = runs.iter().map(|r| r.index).collect();
        assert_eq!(offsets, vec![-1, 0, 1, 2]);
        assert_eq!(lengths(&runs), vec![1, 2, 2, 1]);
        let total: usize = runs.iter().map(|r| r.length).sum();
        assert_eq!(total, r.recurrence_count());
    }

    #[test]
    fn test_vertical_runs_split_at_band() {
        let r = matrix(&[&[0, 1, 1, 1], &[1, 0, 1, 1], &[1, 1, 0, 1], &[1, 1, 1, 0]]);
        let runs = vertical_runs(&r, ExclusionBand::Theiler(0), 1);
        // column 0: rows 1..4 ; column 1: row 0, rows 2..4 ; column 2: rows 0..2, row 3 ; column 3: rows 0..3
        let got: Vec<(isize, usize, usize)> =
            runs.iter().map(|r| (r.index, r.start, r.length)).collect();
        assert_eq!(
            got,
            vec![(0, 1, 3), (1, 0, 1), (1, 2, 2), (2, 0, 2), (2, 3, 1), (3, 0, 3)]
        );
    }

    #[test]
    fn test_white_runs_do_not_cross_band() {
        // column 2 has 1 at row 0, band at row 1..=3 (Theiler 1), 1 at row 4:
        // the zeros inside the band must not form a white run.
        let r = matrix(&[
            &[0, 0, 1, 0, 1],
            &[0, 0, 0, 0, 0],
            &[1, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[1, 0, 1, 0, 0],
        ]);
        let band = ExclusionBand::Theiler(1);
        let white = white_vertical_runs(&r, band, 1);
        // column 0: below band rows 2..5 -> 1,0,1 -> white (3,1)
        assert_eq!(white, vec![LineRun { index: 0, start: 3, length: 1 }]);
    }

    #[test]
    fn test_white_runs_cross_mode() {
        let r = matrix(&[&[1, 0], &[0, 0], &[0, 1], &[1, 0]]);
        let white = white_vertical_runs(&r, ExclusionBand::None, 1);
        assert_eq!(white, vec![LineRun { index: 0, start: 1, length: 2 }]);
        assert!(white_vertical_runs(&r, ExclusionBand::None, 3).is_empty());
    }

    #[test]
    fn test_empty_matrix() {
        let r = RecurrenceMatrix::empty();
        assert!(diagonal_runs(&r, ExclusionBand::None, 1).is_empty());
        assert!(vertical_runs(&r, ExclusionBand::None, 1).is_empty());
        assert!(white_vertical_runs(&r, ExclusionBand::None, 1).is_empty());
    }
}
