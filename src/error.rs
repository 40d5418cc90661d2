use thiserror::Error;

use crate::field::Field;

/// Failures raised by the filter/aggregate pipeline itself.
///
/// I/O, CSV and rendering problems are reported through `anyhow` with
/// context instead; these variants are the ones a caller is expected to
/// match on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    #[error("unmapped label '{0}'")]
    Unmapped(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is not numeric")]
    NotNumeric(Field),

    #[error("field '{0}' cannot be used as a category")]
    NotCategorical(Field),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}
