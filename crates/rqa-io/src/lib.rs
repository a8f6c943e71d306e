pub mod config;
pub mod error;
pub mod matrix;
pub mod report;
pub mod series;

pub use config::{CONFIG_ENV, config_path, load_params, parse_params};
pub use error::{IoError, Result};
pub use matrix::{write_matrix, write_matrix_path};
pub use report::{HEADER, ReportRow, append_report};
pub use series::{Columns, Delimiter, read_columns, read_columns_path};
