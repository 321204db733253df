//! Parquet-backed block store: one row group per block.
//!
//! Block statistics come from the row-group footer, so pruning never touches
//! column data. Decoding reads exactly one row group.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::{
    array::{Array, ArrayRef, AsArray, Int64Array, StringArray},
    datatypes::{Int64Type, SchemaRef as ArrowSchemaRef},
    error::ArrowError,
    record_batch::RecordBatch,
};
use colsieve_predicate::{ColumnRef, DataType, ScalarValue, Statistics};
use parquet::{
    arrow::{
        arrow_reader::{ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder},
        ArrowWriter,
    },
    basic::Compression,
    file::{
        properties::{EnabledStatistics, WriterProperties},
        statistics::Statistics as ParquetStatistics,
    },
};
use tempfile::NamedTempFile;

use super::{BlockHandle, BlockSource, DecodeError};
use crate::{
    error::{FilterError, RecordError},
    observability::{log_debug, log_warn},
    record::Record,
    schema::{Column, Schema, SchemaRef},
};

const DEFAULT_ROWS_PER_BLOCK: usize = 1024;
const DEFAULT_BATCH_SIZE: usize = 1024;

/// Configuration for [`ParquetTableWriter`].
#[derive(Debug, Clone)]
pub struct ParquetWriteOptions {
    pub(crate) rows_per_block: usize,
    pub(crate) write_statistics: bool,
    pub(crate) compression: Compression,
}

impl Default for ParquetWriteOptions {
    fn default() -> Self {
        Self {
            rows_per_block: DEFAULT_ROWS_PER_BLOCK,
            write_statistics: true,
            compression: Compression::UNCOMPRESSED,
        }
    }
}

impl ParquetWriteOptions {
    /// Maximum number of records per block (row group). Clamped to at least one.
    #[must_use]
    pub fn rows_per_block(self, rows_per_block: usize) -> Self {
        ParquetWriteOptions {
            rows_per_block: rows_per_block.max(1),
            ..self
        }
    }

    /// Whether column chunk statistics are written to the footer.
    #[must_use]
    pub fn write_statistics(self, write_statistics: bool) -> Self {
        ParquetWriteOptions {
            write_statistics,
            ..self
        }
    }

    /// Page compression codec.
    #[must_use]
    pub fn compression(self, compression: Compression) -> Self {
        ParquetWriteOptions {
            compression,
            ..self
        }
    }

    fn properties(&self) -> WriterProperties {
        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };
        WriterProperties::builder()
            .set_max_row_group_size(self.rows_per_block)
            .set_statistics_enabled(statistics)
            .set_compression(self.compression)
            .build()
    }
}

/// Writes records into a Parquet file, one row group per block.
pub struct ParquetTableWriter<W>
where
    W: Write + Send,
{
    writer: ArrowWriter<W>,
    schema: SchemaRef,
    arrow_schema: ArrowSchemaRef,
    rows_per_block: usize,
    pending: Vec<Record>,
    blocks_written: usize,
}

impl<W> ParquetTableWriter<W>
where
    W: Write + Send,
{
    /// Creates a writer over `sink`.
    pub fn try_new(
        sink: W,
        schema: SchemaRef,
        options: ParquetWriteOptions,
    ) -> Result<Self, FilterError> {
        let arrow_schema = schema.to_arrow();
        let writer = ArrowWriter::try_new(
            sink,
            Arc::clone(&arrow_schema),
            Some(options.properties()),
        )?;
        Ok(Self {
            writer,
            schema,
            arrow_schema,
            rows_per_block: options.rows_per_block,
            pending: Vec::with_capacity(options.rows_per_block.min(DEFAULT_ROWS_PER_BLOCK)),
            blocks_written: 0,
        })
    }

    /// Appends a record, sealing the current block once it is full.
    pub fn append(&mut self, record: Record) -> Result<(), FilterError> {
        if !record.shares_schema(&self.schema) {
            return Err(RecordError::SchemaMismatch.into());
        }
        self.pending.push(record);
        if self.pending.len() >= self.rows_per_block {
            self.seal_block()?;
        }
        Ok(())
    }

    /// Writes pending records as one row group. Does nothing when no record
    /// is pending.
    pub fn seal_block(&mut self) -> Result<(), FilterError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = records_to_batch(&self.schema, &self.arrow_schema, &self.pending)?;
        self.writer.write(&batch)?;
        self.writer.flush()?;
        self.pending.clear();
        self.blocks_written += 1;
        Ok(())
    }

    /// Seals pending records, writes the footer and returns the block count.
    pub fn finish(mut self) -> Result<usize, FilterError> {
        self.seal_block()?;
        self.writer.close()?;
        log_debug!(
            component = "parquet",
            event = "table_written",
            blocks = self.blocks_written,
        );
        Ok(self.blocks_written)
    }
}

/// Parquet file opened for filtered scans.
#[derive(Debug, Clone)]
pub struct ParquetTable {
    path: PathBuf,
    metadata: ArrowReaderMetadata,
    schema: SchemaRef,
    batch_size: usize,
}

impl ParquetTable {
    /// Opens `path` and loads its footer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let metadata = ArrowReaderMetadata::load(&file, ArrowReaderOptions::default())?;
        let schema = Arc::new(Schema::try_from_arrow(metadata.schema())?);
        log_debug!(
            component = "parquet",
            event = "table_opened",
            path = %path.display(),
            row_groups = metadata.metadata().num_row_groups(),
        );
        Ok(Self {
            path,
            metadata,
            schema,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Records per Arrow batch while decoding a block.
    #[must_use]
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        ParquetTable {
            batch_size: batch_size.max(1),
            ..self
        }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of blocks (row groups).
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }
}

impl BlockSource for ParquetTable {
    fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn list_blocks(&self) -> Vec<BlockHandle> {
        self.metadata
            .metadata()
            .row_groups()
            .iter()
            .enumerate()
            .map(|(index, row_group)| {
                // A corrupt count must not read as empty, decode reports it instead.
                let row_count = block_row_count(index, row_group.num_rows()).unwrap_or(u64::MAX);
                BlockHandle::new(index, row_count)
            })
            .collect()
    }

    fn statistics_of(&self, handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics> {
        let index = self.schema.index_of(column.name())?;
        let row_group = self.metadata.metadata().row_groups().get(handle.index)?;
        let row_count = u64::try_from(row_group.num_rows()).ok()?;
        let statistics = row_group.columns().get(index)?.statistics()?;
        convert_statistics(&self.schema.columns()[index], statistics, row_count)
    }

    fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError> {
        let row_group = self
            .metadata
            .metadata()
            .row_groups()
            .get(handle.index)
            .ok_or(DecodeError::UnknownBlock(handle.index))?;
        let row_count = block_row_count(handle.index, row_group.num_rows())?;
        let file = File::open(&self.path)?;
        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(file, self.metadata.clone())
            .with_row_groups(vec![handle.index])
            .with_batch_size(self.batch_size)
            .build()?;
        let mut records = Vec::with_capacity(usize::try_from(row_count).unwrap_or(0));
        for batch in reader {
            records.extend(batch_to_records(&self.schema, &batch?)?);
        }
        Ok(records)
    }
}

fn block_row_count(index: usize, num_rows: i64) -> Result<u64, DecodeError> {
    u64::try_from(num_rows).map_err(|_| DecodeError::CorruptBlock {
        index,
        reason: format!("negative row count {num_rows}"),
    })
}

/// Parquet table backed by a temporary file removed on drop.
#[derive(Debug)]
pub struct TempParquetTable {
    table: ParquetTable,
    _file: NamedTempFile,
}

impl TempParquetTable {
    /// The opened table.
    #[must_use]
    pub fn table(&self) -> &ParquetTable {
        &self.table
    }

    /// Location of the temporary file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.table.path()
    }
}

impl BlockSource for TempParquetTable {
    fn schema(&self) -> &SchemaRef {
        self.table.schema()
    }

    fn list_blocks(&self) -> Vec<BlockHandle> {
        self.table.list_blocks()
    }

    fn statistics_of(&self, handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics> {
        self.table.statistics_of(handle, column)
    }

    fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError> {
        self.table.decode(handle)
    }
}

/// Writes `records` to a fresh temporary Parquet file and opens it.
pub fn write_temp<I>(
    schema: SchemaRef,
    records: I,
    options: ParquetWriteOptions,
) -> Result<TempParquetTable, FilterError>
where
    I: IntoIterator<Item = Record>,
{
    let file = tempfile::Builder::new()
        .prefix("colsieve-")
        .suffix(".parquet")
        .tempfile()?;
    let mut writer = ParquetTableWriter::try_new(file.reopen()?, schema, options)?;
    for record in records {
        writer.append(record)?;
    }
    writer.finish()?;
    let table = ParquetTable::open(file.path())?;
    Ok(TempParquetTable { table, _file: file })
}

/// Writes `records` to `path`, replacing any existing file.
pub fn write_file<I>(
    path: impl AsRef<Path>,
    schema: SchemaRef,
    records: I,
    options: ParquetWriteOptions,
) -> Result<usize, FilterError>
where
    I: IntoIterator<Item = Record>,
{
    let mut writer = ParquetTableWriter::try_new(File::create(path)?, schema, options)?;
    for record in records {
        writer.append(record)?;
    }
    writer.finish()
}

fn records_to_batch(
    schema: &SchemaRef,
    arrow_schema: &ArrowSchemaRef,
    records: &[Record],
) -> Result<RecordBatch, ArrowError> {
    let arrays = schema
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| -> ArrayRef {
            let values = records.iter().map(|record| &record.values()[index]);
            match column.data_type() {
                DataType::Int64 => {
                    Arc::new(values.map(ScalarValue::as_i64).collect::<Int64Array>())
                }
                DataType::Utf8 => {
                    Arc::new(values.map(ScalarValue::as_utf8).collect::<StringArray>())
                }
            }
        })
        .collect();
    RecordBatch::try_new(Arc::clone(arrow_schema), arrays)
}

enum TypedArray<'a> {
    Int64(&'a Int64Array),
    Utf8(&'a StringArray),
}

impl TypedArray<'_> {
    fn value(&self, row: usize) -> ScalarValue {
        match self {
            TypedArray::Int64(array) if array.is_valid(row) => ScalarValue::Int64(array.value(row)),
            TypedArray::Utf8(array) if array.is_valid(row) => ScalarValue::from(array.value(row)),
            _ => ScalarValue::Null,
        }
    }
}

fn typed_array<'a>(column: &Column, array: &'a ArrayRef) -> Result<TypedArray<'a>, DecodeError> {
    let typed = match column.data_type() {
        DataType::Int64 => array.as_primitive_opt::<Int64Type>().map(TypedArray::Int64),
        DataType::Utf8 => array.as_string_opt::<i32>().map(TypedArray::Utf8),
    };
    typed.ok_or_else(|| DecodeError::Column {
        column: column.name().to_owned(),
        reason: format!("expected {}, found {}", column.data_type(), array.data_type()),
    })
}

fn batch_to_records(schema: &SchemaRef, batch: &RecordBatch) -> Result<Vec<Record>, DecodeError> {
    if batch.num_columns() != schema.len() {
        return Err(RecordError::Arity {
            expected: schema.len(),
            actual: batch.num_columns(),
        }
        .into());
    }
    let arrays = schema
        .columns()
        .iter()
        .zip(batch.columns())
        .map(|(column, array)| typed_array(column, array))
        .collect::<Result<Vec<_>, _>>()?;
    (0..batch.num_rows())
        .map(|row| {
            let values = arrays.iter().map(|array| array.value(row)).collect();
            Record::try_new(Arc::clone(schema), values).map_err(DecodeError::from)
        })
        .collect()
}

fn convert_statistics(
    column: &Column,
    statistics: &ParquetStatistics,
    row_count: u64,
) -> Option<Statistics> {
    let null_count = statistics.null_count_opt()?;
    let bounds = match (column.data_type(), statistics) {
        (DataType::Int64, ParquetStatistics::Int64(values)) => {
            let exact = (values.min_opt().is_none() || values.min_is_exact())
                && (values.max_opt().is_none() || values.max_is_exact());
            exact.then(|| {
                (
                    values.min_opt().map(|min| ScalarValue::Int64(*min)),
                    values.max_opt().map(|max| ScalarValue::Int64(*max)),
                )
            })
        }
        (DataType::Utf8, ParquetStatistics::ByteArray(values)) => {
            // Truncated string bounds are rejected outright rather than widened.
            let exact = (values.min_opt().is_none() || values.min_is_exact())
                && (values.max_opt().is_none() || values.max_is_exact());
            let min = values.min_opt().map(|min| min.as_utf8().map(ScalarValue::from));
            let max = values.max_opt().map(|max| max.as_utf8().map(ScalarValue::from));
            match (exact, min.transpose(), max.transpose()) {
                (true, Ok(min), Ok(max)) => Some((min, max)),
                _ => None,
            }
        }
        _ => None,
    };
    let Some((min, max)) = bounds else {
        log_warn!(
            component = "parquet",
            event = "statistics_unusable",
            column = column.name(),
        );
        return None;
    };
    Some(Statistics::new(min, max, null_count, row_count))
}
