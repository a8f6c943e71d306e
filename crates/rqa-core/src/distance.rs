#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::embedding::PhaseSpace;
use crate::error::{Result, RqaError};
use crate::threshold::ExclusionBand;

/// Dense row-major matrix of pairwise Euclidean distances.
///
/// Rows index points of X, columns index points of Y.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub(crate) fn from_parts(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { rows, cols, values }
    }

    /// Distances of a phase space to itself. Symmetric with an exact zero diagonal.
    pub fn auto(x: &PhaseSpace) -> Self {
        let m = x.len();
        tracing::debug!(m, dimension = x.dimension(), "computing auto distance matrix");

        #[cfg(feature = "rayon")]
        {
            Self::fill_parallel(x, x)
        }

        #[cfg(not(feature = "rayon"))]
        {
            let mut values = vec![0.0; m * m];
            for i in 0..m {
                let a = x.point(i);
                for j in (i + 1)..m {
                    let d = euclidean(a, x.point(j));
                    values[i * m + j] = d;
                    values[j * m + i] = d;
                }
            }
            Self::from_parts(m, m, values)
        }
    }

    /// Distances between every point of `x` and every point of `y`.
    pub fn cross(x: &PhaseSpace, y: &PhaseSpace) -> Result<Self> {
        if x.dimension() != y.dimension() {
            return Err(RqaError::degenerate(format!(
                "phase-space dimension mismatch: {} vs {}",
                x.dimension(),
                y.dimension()
            )));
        }
        tracing::debug!(
            rows = x.len(),
            cols = y.len(),
            dimension = x.dimension(),
            "computing cross distance matrix"
        );

        #[cfg(feature = "rayon")]
        {
            Ok(Self::fill_parallel(x, y))
        }

        #[cfg(not(feature = "rayon"))]
        {
            let mut values = Vec::with_capacity(x.len() * y.len());
            for a in x.points() {
                values.extend(y.points().map(|b| euclidean(a, b)));
            }
            Ok(Self::from_parts(x.len(), y.len(), values))
        }
    }

    /// Each row belongs to exactly one worker; `(a-b)^2 == (b-a)^2` keeps the
    /// auto case bit-identical to the sequential mirror fill.
    #[cfg(feature = "rayon")]
    fn fill_parallel(x: &PhaseSpace, y: &PhaseSpace) -> Self {
        let rows = x.len();
        let cols = y.len();
        let mut values = vec![0.0; rows * cols];
        values
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(i, row)| {
                let a = x.point(i);
                for (j, cell) in row.iter_mut().enumerate() {
                    *cell = euclidean(a, y.point(j));
                }
            });
        Self::from_parts(rows, cols, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.cols + j]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest distance in the matrix (0 for an empty matrix).
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Mean distance over every cell, diagonal included.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Nearest-rank quantile of the distances outside `band`.
    ///
    /// Thresholding at `quantile(q, band)` gives a recurrence rate of about `q`,
    /// which is the usual way to pick a radius for a target density.
    pub fn quantile(&self, q: f64, band: ExclusionBand) -> Option<f64> {
        let mut kept: Vec<f64> = Vec::with_capacity(self.values.len());
        for i in 0..self.rows {
            for j in 0..self.cols {
                if !band.contains(i, j) {
                    kept.push(self.get(i, j));
                }
            }
        }
        if kept.is_empty() || !q.is_finite() {
            return None;
        }
        kept.sort_by(f64::total_cmp);
        let q = q.clamp(0.0, 1.0);
        let rank = (q * kept.len() as f64).ceil() as usize;
        Some(kept[rank.saturating_sub(1).min(kept.len() - 1)])
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
