#![deny(missing_docs)]
//! Predicate pushdown and record filtering over columnar blocks.
//!
//! A table is a sequence of blocks, each carrying per-column statistics.
//! A scan walks the blocks in order, skips the ones whose statistics rule out
//! every record, and filters the records of the rest. Predicates are built
//! with the functions re-exported from [`colsieve_predicate`] and resolved
//! against a [`Schema`].
//!
//! Two block stores ship with the crate: [`MemoryTable`] and the Parquet
//! backed [`ParquetTable`], where every row group is one block.

mod observability;
pub(crate) mod pruning;

/// Synthetic reads table.
pub mod dataset;
/// Error types.
pub mod error;
/// Filtered scans.
pub mod filter;
/// Convenience re-exports.
pub mod prelude;
/// Materialized rows.
pub mod record;
/// Table schemas.
pub mod schema;
/// Block stores.
pub mod storage;

pub use colsieve_predicate::{
    and, can_drop, eq, evaluate, gt, gt_eq, inverse_can_drop, lt, lt_eq, not, not_eq, or,
    user_defined, ColumnRef, ColumnValue, ComparisonOp, DataType, ExclusiveRange, Predicate,
    PredicateError, PredicateNode, RecordView, ScalarValue, Statistics, StatisticsBuilder,
    StatisticsProvider, UserDefinedLeaf, UserDefinedPredicate, ValueStatistics,
};

pub use crate::{
    error::{FilterError, RecordError, SchemaError},
    filter::{apply_filter, apply_filter_with, Filter, FilterOptions, FilteredRecords, ScanMetrics},
    record::Record,
    schema::{Column, Repetition, Schema, SchemaBuilder, SchemaRef},
    storage::{
        memory::{MemoryTable, MemoryTableWriter},
        parquet::{ParquetTable, ParquetTableWriter, ParquetWriteOptions, TempParquetTable},
        BlockHandle, BlockSource, DecodeError,
    },
};
