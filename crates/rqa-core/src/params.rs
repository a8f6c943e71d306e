use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSION, DEFAULT_LAG, DEFAULT_MIN_LINE_LENGTH, DEFAULT_RADIUS};
use crate::error::{Result, RqaError};

/// Time-delay embedding parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingParams {
    pub dimension: NonZeroUsize,
    pub lag: NonZeroUsize,
}

impl EmbeddingParams {
    /// Returns `None` if either value is zero.
    pub fn new(dimension: usize, lag: usize) -> Option<Self> {
        Some(Self {
            dimension: NonZeroUsize::new(dimension)?,
            lag: NonZeroUsize::new(lag)?,
        })
    }

    /// Number of embeddable points for a series of length `n`:
    /// `n - (dimension - 1) * lag`, or `None` when the window does not fit.
    pub fn embedded_len(&self, n: usize) -> Option<usize> {
        let span = (self.dimension.get() - 1).checked_mul(self.lag.get())?;
        n.checked_sub(span).filter(|&m| m > 0)
    }
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            dimension: nonzero(DEFAULT_DIMENSION),
            lag: nonzero(DEFAULT_LAG),
        }
    }
}

/// How raw distances are normalized before thresholding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RescaleMode {
    /// Distances unchanged.
    #[default]
    None,
    /// Divide by the matrix maximum.
    Max,
    /// Divide by the matrix mean.
    Mean,
}

impl RescaleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Max => "max",
            Self::Mean => "mean",
        }
    }
}

/// Auto-recurrence (one series against itself) or cross-recurrence (two series).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Auto,
    Cross,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cross => "cross",
        }
    }
}

/// Full parameter set for one analysis call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RqaParams {
    pub embedding: EmbeddingParams,
    pub rescale: RescaleMode,
    pub radius: f64,
    /// Half-width of the excluded band around the main diagonal (auto mode only).
    /// `0` excludes just the main diagonal.
    pub theiler_window: usize,
    pub min_line_length: NonZeroUsize,
    pub mode: AnalysisMode,
}

impl Default for RqaParams {
    fn default() -> Self {
        Self {
            embedding: EmbeddingParams::default(),
            rescale: RescaleMode::None,
            radius: DEFAULT_RADIUS,
            theiler_window: 0,
            min_line_length: nonzero(DEFAULT_MIN_LINE_LENGTH),
            mode: AnalysisMode::Auto,
        }
    }
}

impl RqaParams {
    /// Reject parameter values the type system cannot rule out.
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(RqaError::degenerate(format!(
                "radius must be finite and >= 0, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    /// Fails with `DegenerateInput` if either value is zero.
    pub fn with_embedding(mut self, dimension: usize, lag: usize) -> Result<Self> {
        self.embedding = EmbeddingParams::new(dimension, lag).ok_or_else(|| {
            RqaError::degenerate(format!(
                "dimension and lag must be >= 1, got dimension={dimension}, lag={lag}"
            ))
        })?;
        Ok(self)
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_rescale(mut self, rescale: RescaleMode) -> Self {
        self.rescale = rescale;
        self
    }

    pub fn with_theiler_window(mut self, theiler_window: usize) -> Self {
        self.theiler_window = theiler_window;
        self
    }

    /// Fails with `DegenerateInput` if `min_line_length` is zero.
    pub fn with_min_line_length(mut self, min_line_length: usize) -> Result<Self> {
        self.min_line_length = NonZeroUsize::new(min_line_length)
            .ok_or_else(|| RqaError::degenerate("min_line_length must be >= 1"))?;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }
}

fn nonzero(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
}
