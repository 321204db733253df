#![deny(missing_docs)]
//! colsieve predicate facade crate.
//!
//! Predicates are immutable trees of typed column comparisons, user-defined
//! leaves and boolean combinators. The same tree drives two evaluators: a
//! record-level one that decides whether a single materialized row is kept,
//! and a statistics-level one that decides, conservatively, whether a whole
//! block of rows can be skipped without decoding it.

mod core;

pub use self::core::{
    and, can_drop, eq, evaluate, gt, gt_eq, inverse_can_drop, lt, lt_eq, not, not_eq, or,
    user_defined, ColumnRef, ColumnValue, ComparisonOp, DataType, ExclusiveRange, Predicate,
    PredicateError, PredicateNode, RecordView, ScalarValue, Statistics, StatisticsBuilder,
    StatisticsProvider, UserDefinedLeaf, UserDefinedPredicate, ValueStatistics,
};
