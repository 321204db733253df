mod common;

use colsieve::{
    and,
    dataset::{columns, MapBounds},
    eq, gt, gt_eq, lt, lt_eq, not, not_eq, or, user_defined, BlockSource, ColumnRef, DataType,
    ExclusiveRange, Filter, FilterOptions, ParquetWriteOptions, Predicate, Record, ScalarValue,
    Schema, UserDefinedPredicate, ValueStatistics,
};
use common::{expected, memory_table, parquet_table, reads, scan};

const READS: usize = 240;
const ROUNDS: usize = 150;

/// Keeps reads whose DNA string starts with a fixed prefix.
#[derive(Debug)]
struct DnaPrefix(&'static str);

impl UserDefinedPredicate for DnaPrefix {
    type Value = str;

    fn keep(&self, value: &str) -> bool {
        value.starts_with(self.0)
    }

    fn can_drop(&self, statistics: &ValueStatistics<'_, str>) -> bool {
        let min = statistics.min();
        statistics.max() < self.0 || (min > self.0 && !min.starts_with(self.0))
    }

    fn inverse_can_drop(&self, statistics: &ValueStatistics<'_, str>) -> bool {
        statistics.min().starts_with(self.0) && statistics.max().starts_with(self.0)
    }
}

fn random_literal(rng: &mut fastrand::Rng, column: &ColumnRef) -> ScalarValue {
    match column.name() {
        columns::DNA_STRING => {
            let pinned = ["AGTCACTG", "CTGACTA", "TCAGCTACG", "XYXYXY", "A", "T"];
            ScalarValue::from(pinned[rng.usize(..pinned.len())])
        }
        columns::MAP_LOCATION => ScalarValue::Int64(rng.i64(-110..=110)),
        columns::ID => ScalarValue::Int64(rng.i64(0..=2 * READS as i64 + 2)),
        _ => ScalarValue::Int64(rng.i64(0..=310)),
    }
}

fn random_leaf(rng: &mut fastrand::Rng, schema: &Schema) -> Predicate {
    let declared = &schema.columns()[rng.usize(..schema.len())];
    let column = schema
        .column(declared.name(), declared.data_type())
        .expect("column");
    if column.data_type == DataType::Int64 && rng.u8(..6) == 0 {
        let lower = rng.i64(-120..=300);
        let upper = lower + rng.i64(0..=120);
        return user_defined(&column, ExclusiveRange::new(lower, upper)).expect("udp");
    }
    if column.data_type == DataType::Utf8 && rng.u8(..4) == 0 {
        let prefixes = ["A", "TC", "AG", "CTGA", "X", ""];
        let prefix = prefixes[rng.usize(..prefixes.len())];
        return user_defined(&column, DnaPrefix(prefix)).expect("udp");
    }
    if column.nullable && rng.u8(..4) == 0 {
        let built = if rng.bool() {
            eq(&column, ScalarValue::Null)
        } else {
            not_eq(&column, ScalarValue::Null)
        };
        return built.expect("null literal");
    }
    let literal = random_literal(rng, &column);
    let built = match rng.u8(..6) {
        0 => eq(&column, literal),
        1 => not_eq(&column, literal),
        2 => lt(&column, literal),
        3 => lt_eq(&column, literal),
        4 => gt(&column, literal),
        _ => gt_eq(&column, literal),
    };
    built.expect("literal matches column type")
}

fn random_tree(rng: &mut fastrand::Rng, schema: &Schema, depth: u32) -> Predicate {
    if depth == 0 || rng.u8(..3) == 0 {
        return random_leaf(rng, schema);
    }
    match rng.u8(..3) {
        0 => and(
            random_tree(rng, schema, depth - 1),
            random_tree(rng, schema, depth - 1),
        ),
        1 => or(
            random_tree(rng, schema, depth - 1),
            random_tree(rng, schema, depth - 1),
        ),
        _ => not(random_tree(rng, schema, depth - 1)),
    }
}

fn assert_sound<S>(source: &S, reads: &[Record], seed: u64)
where
    S: BlockSource,
{
    let mut rng = fastrand::Rng::with_seed(seed);
    let schema = source.schema();
    let full_scan = FilterOptions::default().prune_blocks(false);
    let parallel = FilterOptions::default().parallel_pruning(true);
    for round in 0..ROUNDS {
        let filter = Filter::from(random_tree(&mut rng, schema, 4));
        let want = expected(reads, &filter);

        let pruned = scan(source, filter.clone(), FilterOptions::default());
        assert_eq!(pruned, want, "round {round}: {filter}");
        assert_eq!(
            scan(source, filter.clone(), full_scan),
            want,
            "round {round} without pruning: {filter}"
        );
        assert_eq!(
            scan(source, filter.clone(), parallel),
            want,
            "round {round} with parallel pruning: {filter}"
        );
    }
}

#[test]
fn pruning_matches_full_scan_in_memory() {
    let (schema, reads) = reads(READS);
    let table = memory_table(&schema, &reads, 16);
    assert_sound(&table, &reads, 1);
}

#[test]
fn pruning_matches_full_scan_on_parquet() {
    let (schema, reads) = reads(READS);
    let table = parquet_table(
        &schema,
        &reads,
        ParquetWriteOptions::default().rows_per_block(16),
    );
    assert_sound(&table, &reads, 2);
}

#[test]
fn missing_statistics_never_prune_wrongly() {
    let (schema, reads) = reads(READS);
    let memory = memory_table(&schema, &reads, 16)
        .without_statistics(columns::MAP_LOCATION)
        .without_statistics(columns::RANDOM_KEY_1);
    assert_sound(&memory, &reads, 3);

    let bare = parquet_table(
        &schema,
        &reads,
        ParquetWriteOptions::default()
            .rows_per_block(16)
            .write_statistics(false),
    );
    assert_sound(&bare, &reads, 4);
}

#[test]
fn middle_half_range_is_sound_across_block_sizes() {
    let (schema, reads) = reads(READS);
    let location = schema
        .int64_column(columns::MAP_LOCATION)
        .expect("mapLocation");
    let (lower, upper) = MapBounds::default().middle_half();
    let range = user_defined(&location, ExclusiveRange::new(lower, upper)).expect("udp");
    let filter = Filter::from(range);
    let want = expected(&reads, &filter);
    assert!(!want.is_empty());

    for rows_per_block in [1, 7, 64, READS] {
        let table = memory_table(&schema, &reads, rows_per_block);
        assert_eq!(
            scan(&table, filter.clone(), FilterOptions::default()),
            want,
            "memory, {rows_per_block} rows per block"
        );
        let options = ParquetWriteOptions::default().rows_per_block(rows_per_block);
        let parquet = parquet_table(&schema, &reads, options);
        assert_eq!(
            scan(&parquet, filter.clone(), FilterOptions::default()),
            want,
            "parquet, {rows_per_block} rows per block"
        );
    }
}
