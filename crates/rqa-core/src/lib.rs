//! Recurrence quantification analysis (RQA) kernel.
//!
//! A scalar series is time-delay embedded into phase space, every pair of
//! points is compared, and the resulting binary recurrence matrix is scanned
//! for diagonal and vertical line structures. Those lines summarise how
//! deterministic, laminar and stationary the underlying dynamics are.
//!
//! Zero I/O: reading series and writing reports live in `rqa-io`.

pub mod constants;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod kernel;
pub mod lines;
pub mod params;
pub mod rescale;
pub mod stats;
pub mod threshold;
pub mod trend;

pub use constants::{
    DEFAULT_DIMENSION, DEFAULT_LAG, DEFAULT_MIN_LINE_LENGTH, DEFAULT_RADIUS, EPSILON,
    VARIANCE_FLOOR,
};
pub use distance::DistanceMatrix;
pub use embedding::{PhaseSpace, embed};
pub use error::{ErrorCode, Result, RqaError};
pub use kernel::{RqaAnalysis, RqaOutcome, analyze, analyze_embedded, try_analyze};
pub use lines::{LineRun, diagonal_runs, vertical_runs, white_vertical_runs};
pub use params::{AnalysisMode, EmbeddingParams, RescaleMode, RqaParams};
pub use rescale::rescale;
pub use stats::{LineHistogram, LineHistograms, RqaStatistics};
pub use threshold::{
    ExclusionBand, RecurrenceMatrix, eligible_cells, longest_possible_line, threshold,
};
pub use trend::{DiagonalDensities, TrendSummary, diagonal_densities};
