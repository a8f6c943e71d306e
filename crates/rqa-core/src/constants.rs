/// Population variance below which a series is treated as constant.
pub const VARIANCE_FLOOR: f64 = 1e-12;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;

/// Default embedding dimension used when no parameter file is given.
pub const DEFAULT_DIMENSION: usize = 3;

/// Default embedding lag (samples).
pub const DEFAULT_LAG: usize = 15;

/// Default recurrence radius, in rescaled distance units.
pub const DEFAULT_RADIUS: f64 = 0.2;

/// Default minimum length for diagonal, vertical and white vertical lines.
pub const DEFAULT_MIN_LINE_LENGTH: usize = 2;
