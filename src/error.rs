//! Error types shared across the crate.

use std::io;

use arrow::error::ArrowError;
use colsieve_predicate::{DataType, PredicateError};
use parquet::errors::ParquetError;
use thiserror::Error;

use crate::storage::DecodeError;

/// Errors raised while declaring a schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A schema must declare at least one column.
    #[error("schema declares no columns")]
    Empty,
    /// Two columns share a name.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
    /// An Arrow field uses a type with no column counterpart.
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        /// Field name.
        column: String,
        /// Arrow type, rendered.
        data_type: String,
    },
}

/// Errors raised while materializing a record against a schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The number of values differs from the number of columns.
    #[error("record has {actual} values, schema declares {expected} columns")]
    Arity {
        /// Column count of the schema.
        expected: usize,
        /// Value count of the record.
        actual: usize,
    },
    /// A value's type differs from its column's type.
    #[error("column '{column}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared type.
        expected: DataType,
        /// Supplied type.
        actual: DataType,
    },
    /// A required column holds no value.
    #[error("required column '{0}' is null")]
    MissingRequired(String),
    /// The record was built against another schema than the table's.
    #[error("record schema does not match the table schema")]
    SchemaMismatch,
}

/// Errors surfaced by the filter pipeline and the table adapters.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid predicate or column reference.
    #[error(transparent)]
    Predicate(#[from] PredicateError),
    /// A block could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Invalid schema declaration.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Invalid record.
    #[error(transparent)]
    Record(#[from] RecordError),
    /// Filesystem failure while opening or writing a table.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Parquet failure while opening or writing a table.
    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),
    /// Arrow failure while building a batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}
