use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RqaError};
use crate::lines::LineRun;
use crate::threshold::{ExclusionBand, RecurrenceMatrix, eligible_cells, longest_possible_line};
use crate::trend::TrendSummary;

/// Frequency of each run length, ascending by length.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineHistogram {
    pub counts: BTreeMap<usize, usize>,
}

impl LineHistogram {
    pub fn from_runs(runs: &[LineRun]) -> Self {
        let mut counts = BTreeMap::new();
        for run in runs {
            *counts.entry(run.length).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct lengths.
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total_lines(&self) -> usize {
        self.counts.values().sum()
    }

    /// Cells covered by all lines.
    pub fn total_points(&self) -> usize {
        self.counts.iter().map(|(len, count)| len * count).sum()
    }

    pub fn max_length(&self) -> usize {
        self.counts.keys().next_back().copied().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        let lines = self.total_lines();
        if lines == 0 {
            return 0.0;
        }
        self.total_points() as f64 / lines as f64
    }

    /// Population (not sample) standard deviation of line lengths.
    pub fn population_std(&self) -> f64 {
        let lines = self.total_lines();
        if lines == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let sq: f64 = self
            .counts
            .iter()
            .map(|(&len, &count)| {
                let dev = len as f64 - mean;
                dev * dev * count as f64
            })
            .sum();
        (sq / lines as f64).sqrt()
    }

    /// Shannon entropy in bits of the normalized length histogram.
    /// Zero when fewer than two distinct lengths exist.
    pub fn shannon_entropy(&self) -> f64 {
        if self.bins() < 2 {
            return 0.0;
        }
        let total = self.total_lines() as f64;
        let h: f64 = self
            .counts
            .values()
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum();
        h.max(0.0)
    }

    /// `log2(n_states) - H`: how far the distribution is from uniform over
    /// `n_states` possible lengths.
    pub fn remaining_information(&self, n_states: usize) -> f64 {
        let h = self.shannon_entropy();
        if n_states == 0 || h == 0.0 {
            return 0.0;
        }
        ((n_states as f64).log2() - h).max(0.0)
    }
}

/// Histograms of the three line families, all already filtered by minimum length.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineHistograms {
    pub diagonal: LineHistogram,
    pub vertical: LineHistogram,
    pub white_vertical: LineHistogram,
}

impl LineHistograms {
    pub fn from_runs(diagonal: &[LineRun], vertical: &[LineRun], white_vertical: &[LineRun]) -> Self {
        Self {
            diagonal: LineHistogram::from_runs(diagonal),
            vertical: LineHistogram::from_runs(vertical),
            white_vertical: LineHistogram::from_runs(white_vertical),
        }
    }
}

/// Flat record of recurrence quantification measures.
///
/// Every field is zero when the analysis ended in a non-`Ok` code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RqaStatistics {
    /// Recurrent cells / eligible cells.
    pub recurrence_rate: f64,
    /// Share of recurrent cells lying on qualifying diagonal lines.
    pub determinism: f64,
    pub max_diag_line: usize,
    pub mean_diag_line: f64,
    pub std_diag_line: f64,
    pub count_diag_line: usize,
    /// Shannon entropy (bits) of the diagonal line length histogram.
    pub entropy: f64,
    pub entropy_remaining: f64,
    /// Share of recurrent cells lying on qualifying vertical lines.
    pub laminarity: f64,
    pub trapping_time: f64,
    pub vmax: usize,
    pub mean_white_vertical_line: f64,
    pub max_white_vertical_line: usize,
    pub divergence: f64,
    pub trend_lower_diag: f64,
    pub trend_upper_diag: f64,
    pub recurrent_points: usize,
    pub eligible_points: usize,
    pub max_line_possible: usize,
}

impl RqaStatistics {
    /// Combine the recurrence matrix, its line histograms and the trend fit.
    ///
    /// Fails with `NoRecurrence` when no eligible cell is recurrent, or when
    /// `min_len` exceeds the longest diagonal that fits outside the band.
    pub fn aggregate(
        r: &RecurrenceMatrix,
        band: ExclusionBand,
        min_len: usize,
        lines: &LineHistograms,
        trend: TrendSummary,
    ) -> Result<Self> {
        let eligible = eligible_cells(r.rows(), r.cols(), band);
        let recurrent = r.recurrence_count();
        let max_possible = longest_possible_line(r.rows(), r.cols(), band);

        if recurrent == 0 {
            return Err(RqaError::no_recurrence(format!(
                "0 of {eligible} eligible cells are recurrent"
            )));
        }
        if min_len > max_possible {
            return Err(RqaError::no_recurrence(format!(
                "min_line_length {min_len} exceeds the longest possible line {max_possible}"
            )));
        }

        let diag = &lines.diagonal;
        let vert = &lines.vertical;
        let white = &lines.white_vertical;
        let max_diag = diag.max_length();

        Ok(Self {
            recurrence_rate: recurrent as f64 / eligible as f64,
            determinism: diag.total_points() as f64 / recurrent as f64,
            max_diag_line: max_diag,
            mean_diag_line: diag.mean(),
            std_diag_line: diag.population_std(),
            count_diag_line: diag.total_lines(),
            entropy: diag.shannon_entropy(),
            entropy_remaining: diag.remaining_information(max_possible + 1 - min_len),
            laminarity: vert.total_points() as f64 / recurrent as f64,
            trapping_time: vert.mean(),
            vmax: vert.max_length(),
            mean_white_vertical_line: white.mean(),
            max_white_vertical_line: white.max_length(),
            divergence: if max_diag > 0 {
                1.0 / max_diag as f64
            } else {
                0.0
            },
            trend_lower_diag: trend.lower,
            trend_upper_diag: trend.upper,
            recurrent_points: recurrent,
            eligible_points: eligible,
            max_line_possible: max_possible,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{diagonal_runs, vertical_runs, white_vertical_runs};
    use approx::assert_relative_eq;

    fn run(length: usize) -> LineRun {
        LineRun {
            index: 0,
            start: 0,
            length,
        }
    }

    fn matrix(rows: &[&[u8]]) -> RecurrenceMatrix {
        let cells = rows.iter().flat_map(|r| r.iter().copied()).collect();
        RecurrenceMatrix::from_cells(rows.len(), rows[0].len(), cells).unwrap()
    }

    fn aggregate(r: &RecurrenceMatrix, band: ExclusionBand, min_len: usize) -> Result<RqaStatistics> {
        let lines = LineHistograms::from_runs(
            &diagonal_runs(r, band, min_len),
            &vertical_runs(r, band, min_len),
            &white_vertical_runs(r, band, min_len),
        );
        let trend = TrendSummary::from_matrix(r, band);
        RqaStatistics::aggregate(r, band, min_len, &lines, trend)
    }

    #[test]
    fn test_histogram_moments() {
        let h = LineHistogram::from_runs(&[run(2), run(2), run(4)]);
        assert_eq!(h.bins(), 2);
        assert_eq!(h.total_lines(), 3);
        assert_eq!(h.total_points(), 8);
        assert_eq!(h.max_length(), 4);
        assert_relative_eq!(h.mean(), 8.0 / 3.0);
        // deviations: -2/3, -2/3, 4/3 -> (4/9 + 4/9 + 16/9) / 3 = 24/27
        assert_relative_eq!(h.population_std(), (24.0_f64 / 27.0).sqrt());
    }

    #[test]
    fn test_entropy_bits() {
        let h = LineHistogram::from_runs(&[run(2), run(3)]);
        assert_relative_eq!(h.shannon_entropy(), 1.0);
        assert_relative_eq!(h.remaining_information(4), 1.0);

        let same = LineHistogram::from_runs(&[run(3), run(3), run(3)]);
        assert_eq!(same.shannon_entropy(), 0.0);
        assert_eq!(same.remaining_information(4), 0.0);
    }

    #[test]
    fn test_empty_histogram() {
        let h = LineHistogram::default();
        assert!(h.is_empty());
        assert_eq!(h.mean(), 0.0);
        assert_eq!(h.population_std(), 0.0);
        assert_eq!(h.max_length(), 0);
        assert_eq!(h.shannon_entropy(), 0.0);
    }

    #[test]
    fn test_full_matrix_statistics() {
        // all ones outside the main diagonal, 4x4
        let r = matrix(&[&[0, 1, 1, 1], &[1, 0, 1, 1], &[1, 1, 0, 1], &[1, 1, 1, 0]]);
        let s = aggregate(&r, ExclusionBand::Theiler(0), 2).unwrap();
        assert_eq!(s.eligible_points, 12);
        assert_eq!(s.recurrent_points, 12);
        assert_relative_eq!(s.recurrence_rate, 1.0);
        // qualifying diagonals: 2, 3, 3, 2 -> 10 of 12 cells
        assert_eq!(s.count_diag_line, 4);
        assert_relative_eq!(s.determinism, 10.0 / 12.0);
        assert_eq!(s.max_diag_line, 3);
        assert_relative_eq!(s.mean_diag_line, 2.5);
        assert_relative_eq!(s.std_diag_line, 0.5);
        assert_relative_eq!(s.entropy, 1.0);
        assert_relative_eq!(s.divergence, 1.0 / 3.0);
        assert_eq!(s.max_line_possible, 3);
        // vertical: col0 3, col1 1+2, col2 2+1, col3 3 -> qualifying 3, 2, 2, 3
        assert_relative_eq!(s.laminarity, 10.0 / 12.0);
        assert_relative_eq!(s.trapping_time, 2.5);
        assert_eq!(s.vmax, 3);
        assert_eq!(s.max_white_vertical_line, 0);
    }

    #[test]
    fn test_no_recurrence() {
        let r = matrix(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]]);
        let err = aggregate(&r, ExclusionBand::None, 1).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NoRecurrence);
    }

    #[test]
    fn test_min_line_longer_than_matrix() {
        let r = matrix(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]]);
        let err = aggregate(&r, ExclusionBand::None, 4).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::NoRecurrence);
        assert!(aggregate(&r, ExclusionBand::None, 3).is_ok());
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = matrix(&[&[1, 0, 1], &[0, 1, 0], &[1, 0, 1]]);
        let s = aggregate(&r, ExclusionBand::None, 1).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: RqaStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
