//! In-memory block store.

use colsieve_predicate::{ColumnRef, Statistics, StatisticsBuilder};

use super::{BlockHandle, BlockSource, DecodeError};
use crate::{error::RecordError, record::Record, schema::SchemaRef};

#[derive(Clone, Debug)]
struct MemoryBlock {
    records: Vec<Record>,
    // One entry per schema column; `None` when statistics were withheld.
    statistics: Vec<Option<Statistics>>,
}

/// Table whose blocks live in memory, sealed by [`MemoryTableWriter`].
#[derive(Clone, Debug)]
pub struct MemoryTable {
    schema: SchemaRef,
    blocks: Vec<MemoryBlock>,
}

impl MemoryTable {
    /// Seals each group of records as one block, in order. Empty groups
    /// produce empty blocks.
    pub fn from_blocks<I>(schema: SchemaRef, blocks: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = Vec<Record>>,
    {
        let mut writer = MemoryTableWriter::new(schema, usize::MAX);
        for block in blocks {
            for record in block {
                writer.append(record)?;
            }
            writer.seal_block();
        }
        Ok(writer.finish())
    }

    /// Number of sealed blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Drops the statistics of `column` from every block, as a store that
    /// never recorded them would.
    #[must_use]
    pub fn without_statistics(mut self, column: &str) -> Self {
        if let Some(index) = self.schema.index_of(column) {
            for block in &mut self.blocks {
                block.statistics[index] = None;
            }
        }
        self
    }

    fn block(&self, handle: &BlockHandle) -> Option<&MemoryBlock> {
        self.blocks.get(handle.index)
    }
}

impl BlockSource for MemoryTable {
    fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn list_blocks(&self) -> Vec<BlockHandle> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| BlockHandle::new(index, block.records.len() as u64))
            .collect()
    }

    fn statistics_of(&self, handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics> {
        let index = self.schema.index_of(column.name())?;
        self.block(handle)?.statistics.get(index)?.clone()
    }

    fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError> {
        self.block(handle)
            .map(|block| block.records.clone())
            .ok_or(DecodeError::UnknownBlock(handle.index))
    }
}

/// Accumulates records into blocks of at most `rows_per_block` rows.
///
/// Statistics are folded while records are appended and frozen when the
/// block is sealed.
#[derive(Debug)]
pub struct MemoryTableWriter {
    schema: SchemaRef,
    rows_per_block: usize,
    pending: Vec<Record>,
    builders: Vec<StatisticsBuilder>,
    blocks: Vec<MemoryBlock>,
}

impl MemoryTableWriter {
    /// Creates a writer; `rows_per_block` is clamped to at least one.
    #[must_use]
    pub fn new(schema: SchemaRef, rows_per_block: usize) -> Self {
        let builders = vec![StatisticsBuilder::new(); schema.len()];
        Self {
            schema,
            rows_per_block: rows_per_block.max(1),
            pending: Vec::new(),
            builders,
            blocks: Vec::new(),
        }
    }

    /// Appends a record, sealing the current block once it is full.
    pub fn append(&mut self, record: Record) -> Result<(), RecordError> {
        if !record.shares_schema(&self.schema) {
            return Err(RecordError::SchemaMismatch);
        }
        for (builder, value) in self.builders.iter_mut().zip(record.values()) {
            builder.update(value);
        }
        self.pending.push(record);
        if self.pending.len() >= self.rows_per_block {
            self.seal_block();
        }
        Ok(())
    }

    /// Seals the records appended so far as one block, even when empty.
    pub fn seal_block(&mut self) {
        let fresh = vec![StatisticsBuilder::new(); self.schema.len()];
        let statistics = std::mem::replace(&mut self.builders, fresh)
            .into_iter()
            .map(|builder| Some(builder.build()))
            .collect();
        self.blocks.push(MemoryBlock {
            records: std::mem::take(&mut self.pending),
            statistics,
        });
    }

    /// Seals any pending records and returns the table.
    #[must_use]
    pub fn finish(mut self) -> MemoryTable {
        if !self.pending.is_empty() {
            self.seal_block();
        }
        MemoryTable {
            schema: self.schema,
            blocks: self.blocks,
        }
    }
}
