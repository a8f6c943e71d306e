use crate::constants::EPSILON;
use crate::distance::DistanceMatrix;
use crate::error::{Result, RqaError};
use crate::params::RescaleMode;

/// Normalize raw distances before thresholding.
///
/// The divisor is taken over the whole matrix, before any exclusion band is
/// applied. A near-zero (or non-finite) divisor means the input was degenerate.
pub fn rescale(distances: &DistanceMatrix, mode: RescaleMode) -> Result<DistanceMatrix> {
    let divisor = match mode {
        RescaleMode::None => return Ok(distances.clone()),
        RescaleMode::Max => distances.max(),
        RescaleMode::Mean => distances.mean(),
    };

    if !divisor.is_finite() || divisor <= EPSILON {
        return Err(RqaError::degenerate(format!(
            "rescale divisor ({}) is {divisor}",
            mode.as_str()
        )));
    }

    let values = distances.values().iter().map(|d| d / divisor).collect();
    Ok(DistanceMatrix::from_parts(
        distances.rows(),
        distances.cols(),
        values,
    ))
}
