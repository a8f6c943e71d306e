use serde::{Deserialize, Serialize};

use crate::threshold::{ExclusionBand, RecurrenceMatrix, diagonal_len};

/// Recurrence density of each diagonal, keyed by distance from the main diagonal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagonalDensities {
    /// `(k, density)` for the diagonal at offset `+k` (above the main diagonal).
    pub upper: Vec<(usize, f64)>,
    /// `(k, density)` for the diagonal at offset `-k` (below the main diagonal).
    pub lower: Vec<(usize, f64)>,
}

/// Density of 1s on every non-excluded off-main diagonal, `k >= 1`.
pub fn diagonal_densities(r: &RecurrenceMatrix, band: ExclusionBand) -> DiagonalDensities {
    let density = |d: isize| {
        let len = diagonal_len(r.rows(), r.cols(), d);
        let row0 = if d >= 0 { 0 } else { d.unsigned_abs() };
        let col0 = if d >= 0 { d.unsigned_abs() } else { 0 };
        let ones: usize = (0..len)
            .map(|k| r.get(row0 + k, col0 + k) as usize)
            .sum();
        ones as f64 / len as f64
    };

    let upper = (1..r.cols())
        .filter(|&k| !band.excludes_offset(k as isize))
        .map(|k| (k, density(k as isize)))
        .collect();
    let lower = (1..r.rows())
        .filter(|&k| !band.excludes_offset(-(k as isize)))
        .map(|k| (k, density(-(k as isize))))
        .collect();

    DiagonalDensities { upper, lower }
}

/// Slope of recurrence density against distance from the main diagonal.
///
/// A flat profile (slope near 0) indicates stationarity; a systematic drift
/// of density away from the diagonal indicates non-stationarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub lower: f64,
    pub upper: f64,
}

impl TrendSummary {
    pub fn from_densities(densities: &DiagonalDensities) -> Self {
        Self {
            lower: ols_slope(&densities.lower),
            upper: ols_slope(&densities.upper),
        }
    }

    pub fn from_matrix(r: &RecurrenceMatrix, band: ExclusionBand) -> Self {
        Self::from_densities(&diagonal_densities(r, band))
    }
}

/// Ordinary least-squares slope. Zero with fewer than two points or a
/// degenerate x spread.
fn ols_slope(points: &[(usize, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len() as f64;
    let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for &(k, y) in points {
        let x = k as f64;
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }
    let denom = n * sxx - sx * sx;
    if denom == 0.0 {
        return 0.0;
    }
    (n * sxy - sx * sy) / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(rows: &[&[u8]]) -> RecurrenceMatrix {
        let cells = rows.iter().flat_map(|r| r.iter().copied()).collect();
        RecurrenceMatrix::from_cells(rows.len(), rows[0].len(), cells).unwrap()
    }

    #[test]
    fn test_ols_slope() {
        assert_relative_eq!(ols_slope(&[(1, 1.0), (2, 3.0), (3, 5.0)]), 2.0);
        assert_eq!(ols_slope(&[(1, 1.0)]), 0.0);
        assert_eq!(ols_slope(&[]), 0.0);
    }

    #[test]
    fn test_densities_skip_band() {
        let r = matrix(&[&[0, 1, 0, 1], &[1, 0, 1, 0], &[0, 1, 0, 1], &[1, 0, 1, 0]]);
        let d = diagonal_densities(&r, ExclusionBand::Theiler(1));
        assert_eq!(d.upper, vec![(2, 0.0), (3, 1.0)]);
        assert_eq!(d.lower, vec![(2, 0.0), (3, 1.0)]);
    }

    #[test]
    fn test_trend_decreasing_away_from_diagonal() {
        // density 1 next to the diagonal, 0 far away
        let r = matrix(&[
            &[0, 1, 1, 0, 0],
            &[1, 0, 1, 1, 0],
            &[1, 1, 0, 1, 1],
            &[0, 1, 1, 0, 1],
            &[0, 0, 1, 1, 0],
        ]);
        let t = TrendSummary::from_matrix(&r, ExclusionBand::Theiler(0));
        // k = 1..4 densities: 1, 1, 0, 0
        assert_relative_eq!(t.upper, -0.4);
        assert_relative_eq!(t.lower, -0.4);
    }

    #[test]
    fn test_flat_profile_has_zero_trend() {
        let r = matrix(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]]);
        let t = TrendSummary::from_matrix(&r, ExclusionBand::None);
        assert_eq!(t, TrendSummary { lower: 0.0, upper: 0.0 });
    }
}
