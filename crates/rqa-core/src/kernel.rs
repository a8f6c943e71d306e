//! Single-pass RQA pipeline: embed, distance, rescale, threshold, scan
//! lines, fit trends, aggregate.
//!
//! `analyze` never fails: every problem with the input is folded into the
//! returned [`RqaOutcome`] as an [`ErrorCode`] plus message. `try_analyze`
//! is the same pipeline for callers that prefer `?`.
//!
//! The distance and recurrence matrices are both `M x M` for `M` embedded
//! points, so memory grows quadratically with series length. Downsample long
//! series before calling.

use serde::Serialize;
use tracing::debug;

use crate::distance::DistanceMatrix;
use crate::embedding::{PhaseSpace, embed};
use crate::error::{ErrorCode, Result, RqaError};
use crate::lines::{diagonal_runs, vertical_runs, white_vertical_runs};
use crate::params::{AnalysisMode, RqaParams};
use crate::rescale::rescale;
use crate::stats::{LineHistograms, RqaStatistics};
use crate::threshold::{ExclusionBand, RecurrenceMatrix, threshold};
use crate::trend::TrendSummary;

/// Result of one `analyze` call. `stats` is all zeros unless `code` is `Ok`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RqaOutcome {
    /// Empty for `DegenerateInput`; the computed matrix otherwise.
    pub matrix: RecurrenceMatrix,
    pub stats: RqaStatistics,
    pub code: ErrorCode,
    /// Empty when `code` is `Ok`.
    pub message: String,
}

impl RqaOutcome {
    fn failed(matrix: RecurrenceMatrix, err: RqaError) -> Self {
        Self {
            matrix,
            stats: RqaStatistics::default(),
            code: err.code(),
            message: err.message().to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}

/// Successful analysis with the line histograms behind the statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RqaAnalysis {
    pub matrix: RecurrenceMatrix,
    pub stats: RqaStatistics,
    pub histograms: LineHistograms,
}

/// Run the full pipeline on one series (auto) or two (cross).
pub fn analyze(x: &[f64], y: Option<&[f64]>, params: &RqaParams) -> RqaOutcome {
    let staged = embed_inputs(x, y, params)
        .and_then(|(xs, ys)| recurrence_matrix(&xs, ys.as_ref(), params));
    into_outcome(staged, params)
}

/// Run the pipeline on points that are already in phase space.
pub fn analyze_embedded(x: &PhaseSpace, y: Option<&PhaseSpace>, params: &RqaParams) -> RqaOutcome {
    let staged = check_mode(params, y.is_some()).and_then(|()| recurrence_matrix(x, y, params));
    into_outcome(staged, params)
}

/// Like [`analyze`], but returns the first error instead of an outcome code.
pub fn try_analyze(x: &[f64], y: Option<&[f64]>, params: &RqaParams) -> Result<RqaAnalysis> {
    let (xs, ys) = embed_inputs(x, y, params)?;
    let (matrix, band) = recurrence_matrix(&xs, ys.as_ref(), params)?;
    let (stats, histograms) = quantify(&matrix, band, params)?;
    Ok(RqaAnalysis {
        matrix,
        stats,
        histograms,
    })
}

fn into_outcome(staged: Result<(RecurrenceMatrix, ExclusionBand)>, params: &RqaParams) -> RqaOutcome {
    let (matrix, band) = match staged {
        Ok(staged) => staged,
        Err(err) => {
            debug!(code = %err.code(), "analysis stopped before thresholding: {err}");
            return RqaOutcome::failed(RecurrenceMatrix::empty(), err);
        }
    };

    match quantify(&matrix, band, params) {
        Ok((stats, _)) => RqaOutcome {
            matrix,
            stats,
            code: ErrorCode::Ok,
            message: String::new(),
        },
        Err(err) => {
            debug!(code = %err.code(), "analysis stopped after thresholding: {err}");
            RqaOutcome::failed(matrix, err)
        }
    }
}

fn check_mode(params: &RqaParams, has_y: bool) -> Result<()> {
    params.validate()?;
    match (params.mode, has_y) {
        (AnalysisMode::Auto, true) => Err(RqaError::degenerate(
            "auto mode takes a single series, but a second one was given",
        )),
        (AnalysisMode::Cross, false) => Err(RqaError::degenerate(
            "cross mode needs a second series",
        )),
        _ => Ok(()),
    }
}

fn embed_inputs(
    x: &[f64],
    y: Option<&[f64]>,
    params: &RqaParams,
) -> Result<(PhaseSpace, Option<PhaseSpace>)> {
    check_mode(params, y.is_some())?;
    let xs = embed(x, &params.embedding)?;
    let ys = y.map(|y| embed(y, &params.embedding)).transpose()?;
    debug!(
        n = x.len(),
        m = xs.len(),
        dimension = xs.dimension(),
        lag = params.embedding.lag.get(),
        "embedded"
    );
    Ok((xs, ys))
}

fn recurrence_matrix(
    x: &PhaseSpace,
    y: Option<&PhaseSpace>,
    params: &RqaParams,
) -> Result<(RecurrenceMatrix, ExclusionBand)> {
    let distances = match y {
        Some(y) => DistanceMatrix::cross(x, y)?,
        None => DistanceMatrix::auto(x),
    };
    let rescaled = rescale(&distances, params.rescale)?;
    debug!(
        rows = rescaled.rows(),
        cols = rescaled.cols(),
        rescale = params.rescale.as_str(),
        "distances ready"
    );

    let band = ExclusionBand::for_mode(params.mode, params.theiler_window);
    let matrix = threshold(&rescaled, params.radius, band)?;
    debug!(
        radius = params.radius,
        ?band,
        recurrent = matrix.recurrence_count(),
        "thresholded"
    );
    Ok((matrix, band))
}

fn quantify(
    matrix: &RecurrenceMatrix,
    band: ExclusionBand,
    params: &RqaParams,
) -> Result<(RqaStatistics, LineHistograms)> {
    let min_len = params.min_line_length.get();
    let histograms = LineHistograms::from_runs(
        &diagonal_runs(matrix, band, min_len),
        &vertical_runs(matrix, band, min_len),
        &white_vertical_runs(matrix, band, min_len),
    );
    let trend = TrendSummary::from_matrix(matrix, band);
    debug!(
        diagonal = histograms.diagonal.total_lines(),
        vertical = histograms.vertical.total_lines(),
        white = histograms.white_vertical.total_lines(),
        "lines scanned"
    );
    let stats = RqaStatistics::aggregate(matrix, band, min_len, &histograms, trend)?;
    Ok((stats, histograms))
}
