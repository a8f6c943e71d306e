//! Time-delay embedding: a scalar series becomes a cloud of phase-space points.
//!
//! Point `i` of a `dimension`-dimensional embedding with lag `tau` is
//! `(x[i], x[i + tau], ..., x[i + (dimension - 1) * tau])`.

use crate::constants::VARIANCE_FLOOR;
use crate::error::{Result, RqaError};
use crate::params::EmbeddingParams;

/// Row-major set of embedded vectors, `len() x dimension()`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseSpace {
    coords: Vec<f64>,
    dimension: usize,
}

impl PhaseSpace {
    /// Build from pre-embedded points, e.g. simultaneously recorded channels
    /// where each row is already a point in phase space.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dimension = rows.first().map_or(0, Vec::len);
        if dimension == 0 {
            return Err(RqaError::degenerate("phase space needs at least one non-empty row"));
        }
        if rows.len() < 2 {
            return Err(RqaError::degenerate(format!(
                "phase space needs at least 2 points, got {}",
                rows.len()
            )));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(RqaError::degenerate(format!(
                "row {i} has width {}, expected {dimension}",
                row.len()
            )));
        }

        let coords: Vec<f64> = rows.iter().flatten().copied().collect();
        if let Some(pos) = coords.iter().position(|v| !v.is_finite()) {
            return Err(RqaError::degenerate(format!(
                "non-finite coordinate at row {}, column {}",
                pos / dimension,
                pos % dimension
            )));
        }
        let constant_column = |c: usize| rows.iter().all(|row| row[c] == rows[0][c]);
        if (0..dimension).all(constant_column) {
            return Err(RqaError::degenerate(
                "every phase-space column is constant (all points are identical)",
            ));
        }

        Ok(Self { coords, dimension })
    }

    pub fn len(&self) -> usize {
        self.coords.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Coordinates of point `i`.
    pub fn point(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dimension..(i + 1) * self.dimension]
    }

    pub fn points(&self) -> impl Iterator<Item = &[f64]> {
        self.coords.chunks_exact(self.dimension)
    }
}

/// Embed `series` with the given dimension and lag.
///
/// Fails with `DegenerateInput` when fewer than two points can be embedded,
/// when a sample is not finite, or when the series has zero variance.
pub fn embed(series: &[f64], params: &EmbeddingParams) -> Result<PhaseSpace> {
    let n = series.len();
    let dimension = params.dimension.get();
    let lag = params.lag.get();

    let m = params.embedded_len(n).unwrap_or(0);
    if m <= 1 {
        return Err(RqaError::degenerate(format!(
            "series of length {n} leaves {m} embedded points with dimension={dimension}, lag={lag}"
        )));
    }
    if let Some(i) = series.iter().position(|v| !v.is_finite()) {
        return Err(RqaError::degenerate(format!("non-finite sample at index {i}")));
    }
    if series.iter().all(|&v| v == series[0]) {
        return Err(RqaError::degenerate(format!(
            "series is constant at {} (zero variance)",
            series[0]
        )));
    }
    let var = population_variance(series);
    if var < VARIANCE_FLOOR {
        return Err(RqaError::degenerate(format!(
            "series has zero variance (var={var:e})"
        )));
    }

    let mut coords = Vec::with_capacity(m * dimension);
    for i in 0..m {
        for k in 0..dimension {
            coords.push(series[i + k * lag]);
        }
    }

    Ok(PhaseSpace { coords, dimension })
}

/// Computed on values divided by the largest magnitude so that sums of
/// samples near `f64::MAX` stay finite.
fn population_variance(series: &[f64]) -> f64 {
    let scale = series.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return 0.0;
    }
    let n = series.len() as f64;
    let mean = series.iter().map(|v| v / scale).sum::<f64>() / n;
    let var = series
        .iter()
        .map(|v| {
            let d = v / scale - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var * scale * scale
}
