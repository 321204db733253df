//! Common test utilities for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use colsieve::{
    apply_filter_with,
    dataset::ReadGenerator,
    evaluate,
    storage::parquet::{write_temp, TempParquetTable},
    BlockSource, Filter, FilterOptions, MemoryTable, ParquetWriteOptions, Record, SchemaRef,
};

pub const SEED: u64 = 0x5eed_f11e;

/// Reads from a fixed seed, with the generator's default bounds.
pub fn reads(count: usize) -> (SchemaRef, Vec<Record>) {
    let mut generator = ReadGenerator::new(SEED);
    let reads = generator.generate(count).expect("generate reads");
    (Arc::clone(generator.schema()), reads)
}

pub fn memory_table(schema: &SchemaRef, records: &[Record], rows_per_block: usize) -> MemoryTable {
    let blocks = records.chunks(rows_per_block.max(1)).map(<[Record]>::to_vec);
    MemoryTable::from_blocks(Arc::clone(schema), blocks).expect("memory table")
}

pub fn parquet_table(
    schema: &SchemaRef,
    records: &[Record],
    options: ParquetWriteOptions,
) -> TempParquetTable {
    write_temp(Arc::clone(schema), records.to_vec(), options).expect("parquet table")
}

/// Runs a scan to completion, panicking on any error.
pub fn scan<S>(source: &S, filter: impl Into<Filter>, options: FilterOptions) -> Vec<Record>
where
    S: BlockSource + ?Sized,
{
    apply_filter_with(source, filter, options)
        .collect::<Result<Vec<_>, _>>()
        .expect("scan")
}

/// Records the filter keeps, computed without any storage in between.
pub fn expected(records: &[Record], filter: &Filter) -> Vec<Record> {
    match filter.predicate() {
        None => records.to_vec(),
        Some(predicate) => records
            .iter()
            .filter(|record| evaluate(predicate, *record))
            .cloned()
            .collect(),
    }
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|record| record.get_i64("id").expect("id"))
        .collect()
}
