use std::path::{Path, PathBuf};

use rqa_core::RqaParams;

use crate::error::Result;

/// Environment variable naming a default parameter file.
pub const CONFIG_ENV: &str = "RQA_CONFIG";

/// Parse TOML parameter text. Missing keys fall back to defaults.
///
/// ```toml
/// radius = 0.25
/// rescale = "max"
/// theiler_window = 1
/// min_line_length = 2
///
/// [embedding]
/// dimension = 3
/// lag = 15
/// ```
pub fn parse_params(text: &str) -> Result<RqaParams> {
    let params: RqaParams = toml::from_str(text)?;
    params.validate()?;
    Ok(params)
}

pub fn load_params(path: &Path) -> Result<RqaParams> {
    let text = std::fs::read_to_string(path)?;
    let params = parse_params(&text)?;
    tracing::debug!(path = %path.display(), ?params, "loaded parameters");
    Ok(params)
}

/// An explicit path wins; otherwise `RQA_CONFIG` if it is set and non-empty.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
}
