use std::fmt;

use rqa_core::RqaError;

#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    /// Malformed input text; `line` is 1-based.
    Parse { line: usize, msg: String },
    InvalidData(String),
    Rqa(RqaError),
}

impl IoError {
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        IoError::Parse {
            line,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Io(e) => write!(f, "I/O error: {e}"),
            IoError::Toml(e) => write!(f, "invalid parameter file: {e}"),
            IoError::Parse { line, msg } => write!(f, "line {line}: {msg}"),
            IoError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            IoError::Rqa(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Io(e) => Some(e),
            IoError::Toml(e) => Some(e),
            IoError::Rqa(e) => Some(e),
            IoError::Parse { .. } | IoError::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Io(e)
    }
}

impl From<toml::de::Error> for IoError {
    fn from(e: toml::de::Error) -> Self {
        IoError::Toml(e)
    }
}

impl From<RqaError> for IoError {
    fn from(e: RqaError) -> Self {
        IoError::Rqa(e)
    }
}

pub type Result<T> = std::result::Result<T, IoError>;
