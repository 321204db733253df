use thiserror::Error;

use super::{ComparisonOp, DataType};

/// Errors raised while resolving columns or constructing predicates.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PredicateError {
    /// The column name does not exist in the schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// A declared or literal type disagrees with the column's type.
    #[error("type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Type declared by the schema.
        expected: DataType,
        /// Type supplied by the caller.
        actual: DataType,
    },
    /// Ordering comparisons cannot test for absence.
    #[error("comparison '{op}' on column '{column}' does not accept a null literal")]
    NullLiteral {
        /// Column name.
        column: String,
        /// Offending operator.
        op: ComparisonOp,
    },
}
