//! Statistics-driven pruning.

use colsieve_predicate::{can_drop, inverse_can_drop};

use crate::{
    observability::log_debug,
    pruning::{BlockDecision, PruneInput, Pruner},
};

/// Pruner applying the conservative drop rules to footer statistics.
///
/// A block is skipped when no record can match and its records are passed
/// through unevaluated when every record provably matches.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StatisticsPruner;

impl Pruner for StatisticsPruner {
    fn prune(&self, input: PruneInput<'_>) -> BlockDecision {
        let decision = if can_drop(input.predicate, input.statistics) {
            BlockDecision::Skip
        } else if inverse_can_drop(input.predicate, input.statistics) {
            BlockDecision::KeepAll
        } else {
            BlockDecision::Filter
        };
        log_debug!(
            component = "pruning",
            event = "block_decided",
            block = input.handle.index,
            rows = input.handle.row_count,
            columns_with_stats = input.statistics.len(),
            decision = ?decision,
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use colsieve_predicate::{
        gt, lt, not_eq, or, user_defined, ColumnRef, DataType, ExclusiveRange, ScalarValue,
        Statistics,
    };

    use super::*;
    use crate::{
        pruning::BlockStatistics,
        record::Record,
        schema::{Schema, SchemaRef},
        storage::{BlockHandle, BlockSource, DecodeError},
    };

    // Serves fixed statistics and refuses to decode.
    struct StatsOnly {
        schema: SchemaRef,
        statistics: HashMap<Arc<str>, Statistics>,
    }

    impl BlockSource for StatsOnly {
        fn schema(&self) -> &SchemaRef {
            &self.schema
        }

        fn list_blocks(&self) -> Vec<BlockHandle> {
            vec![BlockHandle::new(0, 8)]
        }

        fn statistics_of(&self, _handle: &BlockHandle, column: &ColumnRef) -> Option<Statistics> {
            self.statistics.get(column.name()).cloned()
        }

        fn decode(&self, handle: &BlockHandle) -> Result<Vec<Record>, DecodeError> {
            Err(DecodeError::UnknownBlock(handle.index))
        }
    }

    fn source(min: i64, max: i64, key_nulls: u64) -> StatsOnly {
        let schema = Arc::new(
            Schema::builder()
                .required("mapLocation", DataType::Int64)
                .optional("randomKey1", DataType::Int64)
                .build()
                .expect("schema"),
        );
        let mut statistics = HashMap::new();
        statistics.insert(
            Arc::from("mapLocation"),
            Statistics::new(Some(min.into()), Some(max.into()), 0, 8),
        );
        statistics.insert(
            Arc::from("randomKey1"),
            Statistics::new(Some(1_i64.into()), Some(9_i64.into()), key_nulls, 8),
        );
        StatsOnly { schema, statistics }
    }

    fn decide(source: &StatsOnly, predicate: &colsieve_predicate::Predicate) -> BlockDecision {
        let handle = source.list_blocks()[0];
        let statistics = BlockStatistics::gather(source, &handle, predicate);
        StatisticsPruner.prune(PruneInput {
            handle: &handle,
            statistics: &statistics,
            predicate,
        })
    }

    #[test]
    fn map_location_bounds() {
        let source = source(10, 50, 0);
        let location = source.schema.int64_column("mapLocation").expect("column");
        assert_eq!(
            decide(&source, &gt(&location, 60_i64).expect("gt")),
            BlockDecision::Skip
        );
        assert_eq!(
            decide(&source, &lt(&location, 5_i64).expect("lt")),
            BlockDecision::Skip
        );
        assert_eq!(
            decide(&source, &gt(&location, 30_i64).expect("gt")),
            BlockDecision::Filter
        );
        assert_eq!(
            decide(&source, &gt(&location, 5_i64).expect("gt")),
            BlockDecision::KeepAll
        );
    }

    #[test]
    fn user_defined_range() {
        let location_of = |source: &StatsOnly| {
            source.schema.int64_column("mapLocation").expect("column")
        };
        let range = ExclusiveRange::new(20, 40);

        let high = source(45, 60, 0);
        let predicate = user_defined(&location_of(&high), range).expect("udp");
        assert_eq!(decide(&high, &predicate), BlockDecision::Skip);

        let wide = source(10, 60, 0);
        assert_eq!(decide(&wide, &predicate), BlockDecision::Filter);
    }

    #[test]
    fn presence_and_disjunction() {
        let dense = source(10, 50, 0);
        let key = dense.schema.int64_column("randomKey1").expect("column");
        let present = not_eq(&key, ScalarValue::Null).expect("noteq");
        assert_eq!(decide(&dense, &present), BlockDecision::KeepAll);

        let sparse = source(10, 50, 3);
        assert_eq!(decide(&sparse, &present), BlockDecision::Filter);

        let location = sparse.schema.int64_column("mapLocation").expect("column");
        let either = or(
            gt(&location, 100_i64).expect("gt"),
            lt(&location, 0_i64).expect("lt"),
        );
        assert_eq!(decide(&sparse, &either), BlockDecision::Skip);
    }
}
