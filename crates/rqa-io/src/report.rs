use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use rqa_core::{RqaOutcome, RqaParams};
use serde::Serialize;

use crate::error::Result;

pub const HEADER: &str = "label,dimension,lag,rescale,radius_pct,recurrence_pct,determinism_pct,\
max_diag_line,mean_diag_line,entropy,laminarity_pct,trapping_time,vmax,divergence,\
trend_lower,trend_upper,error_code";

/// One line of the summary CSV. Percentages are 0-100.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub dimension: usize,
    pub lag: usize,
    pub rescale: String,
    pub radius_pct: f64,
    pub recurrence_pct: f64,
    pub determinism_pct: f64,
    pub max_diag_line: usize,
    pub mean_diag_line: f64,
    pub entropy: f64,
    pub laminarity_pct: f64,
    pub trapping_time: f64,
    pub vmax: usize,
    pub divergence: f64,
    pub trend_lower: f64,
    pub trend_upper: f64,
    pub error_code: i32,
}

impl ReportRow {
    /// Parameters are always recorded; measures are zero unless the outcome is `Ok`.
    pub fn from_outcome(label: impl Into<String>, params: &RqaParams, outcome: &RqaOutcome) -> Self {
        let s = &outcome.stats;
        let mut row = Self {
            label: label.into(),
            dimension: params.embedding.dimension.get(),
            lag: params.embedding.lag.get(),
            rescale: params.rescale.as_str().to_string(),
            radius_pct: params.radius * 100.0,
            recurrence_pct: s.recurrence_rate * 100.0,
            determinism_pct: s.determinism * 100.0,
            max_diag_line: s.max_diag_line,
            mean_diag_line: s.mean_diag_line,
            entropy: s.entropy,
            laminarity_pct: s.laminarity * 100.0,
            trapping_time: s.trapping_time,
            vmax: s.vmax,
            divergence: s.divergence,
            trend_lower: s.trend_lower_diag,
            trend_upper: s.trend_upper_diag,
            error_code: outcome.code.as_i32(),
        };
        if !outcome.is_ok() {
            row.zero_measures();
        }
        row
    }

    fn zero_measures(&mut self) {
        self.recurrence_pct = 0.0;
        self.determinism_pct = 0.0;
        self.max_diag_line = 0;
        self.mean_diag_line = 0.0;
        self.entropy = 0.0;
        self.laminarity_pct = 0.0;
        self.trapping_time = 0.0;
        self.vmax = 0;
        self.divergence = 0.0;
        self.trend_lower = 0.0;
        self.trend_upper = 0.0;
    }

    /// CSV line without trailing newline, floats to three decimals.
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{},{:.3},{:.3},{:.3},{},{:.3},{:.3},{:.3},{:.3},{},{:.3},{:.3},{:.3},{}",
            csv_field(&self.label),
            self.dimension,
            self.lag,
            self.rescale,
            self.radius_pct,
            self.recurrence_pct,
            self.determinism_pct,
            self.max_diag_line,
            self.mean_diag_line,
            self.entropy,
            self.laminarity_pct,
            self.trapping_time,
            self.vmax,
            self.divergence,
            self.trend_lower,
            self.trend_upper,
            self.error_code,
        )
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Append `row` to the CSV at `path`, writing the header first if the file
/// is new or empty.
pub fn append_report(path: &Path, row: &ReportRow) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "{HEADER}")?;
    }
    writeln!(file, "{}", row.to_csv())?;
    tracing::debug!(path = %path.display(), label = %row.label, "appended report row");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rqa_core::{ErrorCode, RecurrenceMatrix, RqaStatistics};

    fn outcome(code: ErrorCode) -> RqaOutcome {
        RqaOutcome {
            matrix: RecurrenceMatrix::empty(),
            stats: RqaStatistics {
                recurrence_rate: 0.05,
                determinism: 0.8125,
                max_diag_line: 12,
                mean_diag_line: 3.5,
                entropy: 1.25,
                laminarity: 0.5,
                trapping_time: 2.0,
                vmax: 4,
                divergence: 1.0 / 12.0,
                trend_lower_diag: -0.00175,
                trend_upper_diag: 0.002,
                ..RqaStatistics::default()
            },
            code,
            message: String::new(),
        }
    }

    fn params() -> RqaParams {
        RqaParams::default()
            .with_embedding(3, 10)
            .unwrap()
            .with_radius(0.2)
            .with_rescale(rqa_core::RescaleMode::Max)
    }

    #[test]
    fn test_header_matches_columns() {
        let row = ReportRow::from_outcome("a.txt", &params(), &outcome(ErrorCode::Ok));
        assert_eq!(HEADER.split(',').count(), row.to_csv().split(',').count());
    }

    #[test]
    fn test_ok_row() {
        let row = ReportRow::from_outcome("a.txt", &params(), &outcome(ErrorCode::Ok));
        assert_eq!(
            row.to_csv(),
            "a.txt,3,10,max,20.000,5.000,81.250,12,3.500,1.250,50.000,2.000,4,0.083,-0.002,0.002,0"
        );
    }

    #[test]
    fn test_error_row_is_zeroed() {
        let row = ReportRow::from_outcome("b.txt", &params(), &outcome(ErrorCode::NoRecurrence));
        assert_eq!(
            row.to_csv(),
            "b.txt,3,10,max,20.000,0.000,0.000,0,0.000,0.000,0.000,0.000,0,0.000,0.000,0.000,2"
        );
    }

    #[test]
    fn test_label_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        let row = ReportRow::from_outcome("a.txt", &params(), &outcome(ErrorCode::Ok));
        append_report(&path, &row).unwrap();
        append_report(&path, &row).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], lines[2]);
    }
}
