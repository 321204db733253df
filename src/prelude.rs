//! Convenience re-exports for common colsieve usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use colsieve::prelude::*;
//!
//! let table = ParquetTable::open("reads.parquet")?;
//! let location = table.schema().int64_column("mapLocation")?;
//! for record in apply_filter(&table, gt(&location, 30_i64)?) {
//!     println!("{}", record?);
//! }
//! ```

pub use crate::{
    and, apply_filter, apply_filter_with, eq, gt, gt_eq, lt, lt_eq, not, not_eq, or,
    user_defined, BlockSource, DataType, ExclusiveRange, Filter, FilterError, FilterOptions,
    MemoryTable, ParquetTable, Predicate, Record, ScalarValue, Schema, SchemaRef,
};
