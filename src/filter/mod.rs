//! Filtered scans over a [`BlockSource`].
//!
//! Blocks are visited in file order. Each one is first decided from its
//! statistics; survivors are decoded and, unless every record provably
//! matches, filtered record by record. Kept records come out in storage order.

mod options;

use std::{fmt, iter::FusedIterator, vec};

pub use options::FilterOptions;

use colsieve_predicate::{evaluate, Predicate};

use crate::{
    error::FilterError,
    observability::{log_debug, log_info, log_warn},
    pruning::{config::PrunerPolicy, decide, decide_all, BlockDecision, Pruner},
    record::Record,
    storage::{BlockHandle, BlockSource},
};

/// Filter applied to a scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Filter {
    /// Keep every record without consulting statistics.
    #[default]
    Noop,
    /// Keep the records the predicate accepts.
    Predicate(Predicate),
}

impl Filter {
    /// Predicate of the filter, if any.
    #[must_use]
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Filter::Noop => None,
            Filter::Predicate(predicate) => Some(predicate),
        }
    }

    /// True for [`Filter::Noop`].
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Filter::Noop)
    }
}

impl From<Predicate> for Filter {
    fn from(predicate: Predicate) -> Self {
        Filter::Predicate(predicate)
    }
}

impl From<Option<Predicate>> for Filter {
    fn from(predicate: Option<Predicate>) -> Self {
        predicate.map_or(Filter::Noop, Filter::Predicate)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Noop => f.write_str("noop"),
            Filter::Predicate(predicate) => write!(f, "{predicate}"),
        }
    }
}

/// Counters collected while a scan runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanMetrics {
    /// Blocks listed by the source.
    pub blocks_total: usize,
    /// Blocks skipped by the pruner. Empty blocks are passed over without
    /// being counted here or in `blocks_decoded`.
    pub blocks_pruned: usize,
    /// Blocks decoded.
    pub blocks_decoded: usize,
    /// Records materialized by decoding.
    pub records_decoded: u64,
    /// Records returned to the caller.
    pub records_kept: u64,
}

/// Scan `source`, keeping the records `filter` accepts, with default options.
pub fn apply_filter<S>(source: &S, filter: impl Into<Filter>) -> FilteredRecords<'_, S>
where
    S: BlockSource + ?Sized,
{
    apply_filter_with(source, filter, FilterOptions::default())
}

/// Scan `source` with explicit options.
///
/// Predicate columns are checked against the source schema first; a mismatch
/// is yielded as the only item of the scan.
pub fn apply_filter_with<S>(
    source: &S,
    filter: impl Into<Filter>,
    options: FilterOptions,
) -> FilteredRecords<'_, S>
where
    S: BlockSource + ?Sized,
{
    FilteredRecords::new(source, filter.into(), options)
}

/// Lazy iterator over the kept records of a scan.
///
/// A decode failure is yielded once, after which the iterator is exhausted.
pub struct FilteredRecords<'a, S>
where
    S: BlockSource + ?Sized,
{
    source: &'a S,
    filter: Filter,
    options: FilterOptions,
    pruner: &'static dyn Pruner,
    handles: Vec<BlockHandle>,
    decisions: Option<Vec<BlockDecision>>,
    next_block: usize,
    current: vec::IntoIter<Record>,
    evaluate_current: bool,
    pending_error: Option<FilterError>,
    done: bool,
    metrics: ScanMetrics,
}

impl<'a, S> FilteredRecords<'a, S>
where
    S: BlockSource + ?Sized,
{
    fn new(source: &'a S, filter: Filter, options: FilterOptions) -> Self {
        let handles = source.list_blocks();
        let pruner = PrunerPolicy::resolve(&options).pruner();
        let mut scan = FilteredRecords {
            source,
            filter,
            options,
            pruner,
            metrics: ScanMetrics {
                blocks_total: handles.len(),
                ..ScanMetrics::default()
            },
            handles,
            decisions: None,
            next_block: 0,
            current: Vec::new().into_iter(),
            evaluate_current: false,
            pending_error: None,
            done: false,
        };
        if let Err(err) = scan.validate() {
            scan.pending_error = Some(err);
            return scan;
        }
        if let (Some(predicate), true) = (scan.filter.predicate(), options.parallel_pruning) {
            scan.decisions = Some(decide_all(source, &scan.handles, predicate, pruner));
        }
        log_debug!(
            component = "filter",
            event = "scan_started",
            filter = %scan.filter,
            blocks = scan.handles.len(),
            prune_blocks = options.prune_blocks,
            parallel_pruning = options.parallel_pruning,
        );
        scan
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn metrics(&self) -> ScanMetrics {
        self.metrics
    }

    /// Filter driving the scan.
    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    fn validate(&self) -> Result<(), FilterError> {
        let Some(predicate) = self.filter.predicate() else {
            return Ok(());
        };
        let schema = self.source.schema();
        for column in predicate.columns() {
            schema.column(column.name(), column.data_type)?;
        }
        Ok(())
    }

    fn decision(&self, position: usize, handle: &BlockHandle) -> BlockDecision {
        let Some(predicate) = self.filter.predicate() else {
            return BlockDecision::KeepAll;
        };
        match &self.decisions {
            Some(decisions) => decisions[position],
            None => decide(self.source, handle, predicate, self.pruner),
        }
    }

    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        log_info!(
            component = "filter",
            event = "scan_finished",
            blocks_total = self.metrics.blocks_total,
            blocks_pruned = self.metrics.blocks_pruned,
            blocks_decoded = self.metrics.blocks_decoded,
            records_decoded = self.metrics.records_decoded,
            records_kept = self.metrics.records_kept,
        );
    }
}

impl<S> Iterator for FilteredRecords<'_, S>
where
    S: BlockSource + ?Sized,
{
    type Item = Result<Record, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            self.finish();
            return Some(Err(err));
        }
        loop {
            if self.done {
                return None;
            }
            if let Some(record) = self.current.next() {
                if self.evaluate_current {
                    if let Some(predicate) = self.filter.predicate() {
                        if !evaluate(predicate, &record) {
                            continue;
                        }
                    }
                }
                self.metrics.records_kept += 1;
                return Some(Ok(record));
            }

            let position = self.next_block;
            let Some(handle) = self.handles.get(position).copied() else {
                self.finish();
                return None;
            };
            self.next_block += 1;
            if handle.is_empty() {
                continue;
            }

            let decision = self.decision(position, &handle);
            if decision == BlockDecision::Skip {
                self.metrics.blocks_pruned += 1;
                continue;
            }
            match self.source.decode(&handle) {
                Ok(records) => {
                    self.metrics.blocks_decoded += 1;
                    self.metrics.records_decoded += records.len() as u64;
                    self.evaluate_current =
                        decision == BlockDecision::Filter && self.options.record_filtering;
                    self.current = records.into_iter();
                }
                Err(err) => {
                    log_warn!(
                        component = "filter",
                        event = "block_decode_failed",
                        block = handle.index,
                        error = %err,
                    );
                    self.finish();
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

impl<S> FusedIterator for FilteredRecords<'_, S> where S: BlockSource + ?Sized {}

impl<S> fmt::Debug for FilteredRecords<'_, S>
where
    S: BlockSource + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredRecords")
            .field("filter", &self.filter)
            .field("options", &self.options)
            .field("next_block", &self.next_block)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use colsieve_predicate::{
        and, gt, not, not_eq, ColumnRef, DataType, PredicateError, ScalarValue, Statistics,
    };

    use super::*;
    use crate::{
        schema::{Schema, SchemaRef},
        storage::{memory::MemoryTable, DecodeError},
    };

    fn schema() -> SchemaRef {
        Arc::new(
            Schema::builder()
                .required("mapLocation", DataType::Int64)
                .optional("randomKey1", DataType::Int64)
                .build()
                .expect("schema"),
        )
    }

    fn table(schema: &SchemaRef, blocks: &[&[(i64, Option<i64>)]]) -> MemoryTable {
        let blocks = blocks.iter().map(|rows| {
            rows.iter()
                .map(|(location, key)| {
                    let values = vec![(*location).into(), (*key).into()];
                    Record::try_new(Arc::clone(schema), values).expect("record")
                })
                .collect::<Vec<_>>()
        });
        MemoryTable::from_blocks(Arc::clone(schema), blocks).expect("table")
    }

    fn sample(schema: &SchemaRef) -> MemoryTable {
        table(
            schema,
            &[
                &[(10, Some(1)), (25, None), (50, Some(3))],
                &[(60, None), (70, Some(5))],
                &[(1, Some(6)), (2, Some(7))],
            ],
        )
    }

    fn locations<I>(records: I) -> Vec<i64>
    where
        I: IntoIterator<Item = Result<Record, FilterError>>,
    {
        records
            .into_iter()
            .map(|record| {
                record
                    .expect("record")
                    .get_i64("mapLocation")
                    .expect("location")
            })
            .collect()
    }

    #[test]
    fn noop_returns_every_record_in_order() {
        let schema = schema();
        let table = sample(&schema);
        let mut scan = apply_filter(&table, None::<Predicate>);
        let found = locations(scan.by_ref());
        assert_eq!(found, vec![10, 25, 50, 60, 70, 1, 2]);
        assert_eq!(
            scan.metrics(),
            ScanMetrics {
                blocks_total: 3,
                blocks_pruned: 0,
                blocks_decoded: 3,
                records_decoded: 7,
                records_kept: 7,
            }
        );
    }

    #[test]
    fn prunes_and_filters() {
        let schema = schema();
        let table = sample(&schema);
        let location = schema.int64_column("mapLocation").expect("column");
        let predicate = gt(&location, 30_i64).expect("gt");

        let mut scan = apply_filter(&table, predicate.clone());
        assert_eq!(locations(scan.by_ref()), vec![50, 60, 70]);
        assert_eq!(
            scan.metrics(),
            ScanMetrics {
                blocks_total: 3,
                blocks_pruned: 1,
                blocks_decoded: 2,
                records_decoded: 5,
                records_kept: 3,
            }
        );

        let full_scan = FilterOptions::default().prune_blocks(false);
        let mut baseline = apply_filter_with(&table, predicate.clone(), full_scan);
        assert_eq!(locations(baseline.by_ref()), vec![50, 60, 70]);
        assert_eq!(baseline.metrics().blocks_pruned, 0);
        assert_eq!(baseline.metrics().records_decoded, 7);

        let parallel = FilterOptions::default().parallel_pruning(true);
        assert_eq!(
            locations(apply_filter_with(&table, predicate, parallel)),
            vec![50, 60, 70]
        );
    }

    #[test]
    fn empty_blocks_are_not_counted_as_pruned() {
        let schema = schema();
        let table = table(&schema, &[&[(10, Some(1))], &[], &[(60, None)]]);
        let location = schema.int64_column("mapLocation").expect("column");
        let predicate = gt(&location, 30_i64).expect("gt");

        let full_scan = FilterOptions::default().prune_blocks(false);
        let mut baseline = apply_filter_with(&table, predicate.clone(), full_scan);
        assert_eq!(locations(baseline.by_ref()), vec![60]);
        assert_eq!(
            baseline.metrics(),
            ScanMetrics {
                blocks_total: 3,
                blocks_pruned: 0,
                blocks_decoded: 2,
                records_decoded: 2,
                records_kept: 1,
            }
        );

        let mut pruned = apply_filter(&table, predicate);
        assert_eq!(locations(pruned.by_ref()), vec![60]);
        assert_eq!(pruned.metrics().blocks_pruned, 1);
        assert_eq!(pruned.metrics().blocks_decoded, 1);
    }

    #[test]
    fn record_filtering_off_keeps_surviving_blocks_whole() {
        let schema = schema();
        let table = sample(&schema);
        let location = schema.int64_column("mapLocation").expect("column");
        let predicate = gt(&location, 30_i64).expect("gt");
        let options = FilterOptions::default().record_filtering(false);
        assert_eq!(
            locations(apply_filter_with(&table, predicate, options)),
            vec![10, 25, 50, 60, 70]
        );
    }

    #[test]
    fn presence_and_negation() {
        let schema = schema();
        let table = sample(&schema);
        let key = schema.int64_column("randomKey1").expect("column");
        let present = not_eq(&key, ScalarValue::Null).expect("noteq");

        assert_eq!(
            locations(apply_filter(&table, present.clone())),
            vec![10, 50, 70, 1, 2]
        );
        assert_eq!(locations(apply_filter(&table, not(present.clone()))), vec![25, 60]);
        assert_eq!(
            locations(apply_filter(&table, not(not(present)))),
            vec![10, 50, 70, 1, 2]
        );
    }

    #[test]
    fn early_stop_leaves_later_blocks_untouched() {
        let schema = schema();
        let table = sample(&schema);
        let mut scan = apply_filter(&table, Filter::Noop);
        let first: Vec<_> = scan.by_ref().take(2).collect();
        assert_eq!(locations(first), vec![10, 25]);
        assert_eq!(scan.metrics().blocks_decoded, 1);
    }

    #[test]
    fn unknown_column_is_reported_first() {
        let schema = schema();
        let table = sample(&schema);
        let stray = ColumnRef::new("missing", 0, DataType::Int64, true);
        let predicate = gt(&stray, 1_i64).expect("gt");

        let mut scan = apply_filter(&table, predicate);
        match scan.next() {
            Some(Err(FilterError::Predicate(PredicateError::UnknownColumn(name)))) => {
                assert_eq!(name, "missing");
            }
            other => panic!("expected unknown column, got {other:?}"),
        }
        assert!(scan.next().is_none());
        assert_eq!(scan.metrics().blocks_decoded, 0);
    }

    // Decodes the first block and fails on every other one.
    struct FailsAfterFirst(MemoryTable);

    impl BlockSource for FailsAfterFirst {
        fn schema(&self) -> &SchemaRef {
            self.0.schema()
        }

        fn list_blocks(&self) -> Vec<BlockHandle> {
            self.0.list_blocks()
        }

        fn statistics_of(&self, handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics> {
            self.0.statistics_of(handle, column)
        }

        fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError> {
            if handle.index == 0 {
                self.0.decode(handle)
            } else {
                Err(DecodeError::Column {
                    column: "mapLocation".into(),
                    reason: "truncated page".into(),
                })
            }
        }
    }

    #[test]
    fn decode_failure_ends_the_scan() {
        let schema = schema();
        let source = FailsAfterFirst(sample(&schema));
        let location = schema.int64_column("mapLocation").expect("column");
        let key = schema.int64_column("randomKey1").expect("column");
        let predicate = and(
            gt(&location, 0_i64).expect("gt"),
            not_eq(&key, ScalarValue::Null).expect("noteq"),
        );

        let items: Vec<_> = apply_filter(&source, predicate).collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(matches!(
            items[2],
            Err(FilterError::Decode(DecodeError::Column { .. }))
        ));
    }

    #[test]
    fn filter_conversions() {
        let schema = schema();
        let location = schema.int64_column("mapLocation").expect("column");
        let predicate = gt(&location, 30_i64).expect("gt");

        assert!(Filter::from(None::<Predicate>).is_noop());
        assert_eq!(Filter::Noop.to_string(), "noop");
        let filter = Filter::from(Some(predicate.clone()));
        assert_eq!(filter.predicate(), Some(&predicate));
        assert_eq!(filter.to_string(), predicate.to_string());
    }
}
