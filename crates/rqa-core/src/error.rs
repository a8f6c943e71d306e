use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal status of one analysis call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    #[default]
    Ok,
    /// Embedding impossible, zero-variance input, or a zero rescale divisor.
    DegenerateInput,
    /// Valid computation, but nothing recurrent survived the threshold.
    NoRecurrence,
}

impl ErrorCode {
    /// Stable numeric code written into report rows.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::DegenerateInput => 1,
            Self::NoRecurrence => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::DegenerateInput => "degenerate_input",
            Self::NoRecurrence => "no_recurrence",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RqaError {
    DegenerateInput(String),
    NoRecurrence(String),
}

impl RqaError {
    pub fn degenerate(msg: impl Into<String>) -> Self {
        RqaError::DegenerateInput(msg.into())
    }

    pub fn no_recurrence(msg: impl Into<String>) -> Self {
        RqaError::NoRecurrence(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RqaError::DegenerateInput(_) => ErrorCode::DegenerateInput,
            RqaError::NoRecurrence(_) => ErrorCode::NoRecurrence,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RqaError::DegenerateInput(msg) | RqaError::NoRecurrence(msg) => msg,
        }
    }
}

impl fmt::Display for RqaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RqaError::DegenerateInput(msg) => write!(f, "degenerate input: {msg}"),
            RqaError::NoRecurrence(msg) => write!(f, "no recurrence: {msg}"),
        }
    }
}

impl std::error::Error for RqaError {}

pub type Result<T> = std::result::Result<T, RqaError>;
