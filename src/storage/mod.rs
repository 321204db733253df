//! Block storage boundary consumed by the filter pipeline.
//!
//! A table is a sequence of sealed blocks. Each block exposes per-column
//! [`Statistics`] without decoding, and decodes into records on demand.

pub mod memory;
pub mod parquet;

use std::io;

use arrow::error::ArrowError;
use colsieve_predicate::{ColumnRef, Statistics};
use ::parquet::errors::ParquetError;
use thiserror::Error;

use crate::{error::RecordError, record::Record, schema::SchemaRef};

/// Identifies one block of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    /// Position of the block in file order.
    pub index: usize,
    /// Number of records in the block.
    pub row_count: u64,
}

impl BlockHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(index: usize, row_count: u64) -> Self {
        Self { index, row_count }
    }

    /// True when the block holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Errors raised while decoding a block.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The handle does not name a block of this table.
    #[error("block {0} does not exist")]
    UnknownBlock(usize),
    /// A column's physical data cannot be read as its declared type.
    #[error("column '{column}' cannot be decoded: {reason}")]
    Column {
        /// Column name.
        column: String,
        /// Description of the mismatch.
        reason: String,
    },
    /// The block's metadata is unusable.
    #[error("block {index} is corrupt: {reason}")]
    CorruptBlock {
        /// Block position.
        index: usize,
        /// Description of the damage.
        reason: String,
    },
    /// A decoded row violates the schema.
    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
    /// Underlying read failure.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Parquet decoding failure.
    #[error("parquet error: {0}")]
    Parquet(#[from] ParquetError),
    /// Arrow decoding failure.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Read access to a table's blocks.
///
/// Listing is finite and restartable: calling [`BlockSource::list_blocks`]
/// again yields the same handles in the same order.
pub trait BlockSource: Send + Sync {
    /// Schema shared by every block.
    fn schema(&self) -> &SchemaRef;

    /// Handles of all blocks, in file order.
    fn list_blocks(&self) -> Vec<BlockHandle>;

    /// Statistics of `column` within the block, or `None` when unavailable.
    fn statistics_of(&self, handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics>;

    /// Materializes every record of the block, in storage order.
    fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError>;
}

impl<S> BlockSource for &S
where
    S: BlockSource + ?Sized,
{
    fn schema(&self) -> &SchemaRef {
        (**self).schema()
    }

    fn list_blocks(&self) -> Vec<BlockHandle> {
        (**self).list_blocks()
    }

    fn statistics_of(&self, handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics> {
        (**self).statistics_of(handle, column)
    }

    fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError> {
        (**self).decode(handle)
    }
}
