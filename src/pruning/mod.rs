//! Block pruning boundary for the filter pipeline.
//!
//! Implementations live behind the [`Pruner`] trait and only ever see block
//! statistics, never decoded records. Decisions for different blocks are
//! independent, so they may be computed in parallel and consumed in order.

pub(crate) mod config;
pub(crate) mod noop;
pub(crate) mod statistics;

use std::{collections::HashMap, sync::Arc};

use colsieve_predicate::{ColumnRef, Predicate, Statistics, StatisticsProvider};
use rayon::prelude::*;

use crate::storage::{BlockHandle, BlockSource};

/// Outcome of pruning one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlockDecision {
    /// No record can be kept; the block is not decoded.
    Skip,
    /// Every record is kept; records are not evaluated.
    KeepAll,
    /// Records must be evaluated one by one.
    Filter,
}

/// Input bundle for pruning decisions.
pub(crate) struct PruneInput<'a> {
    /// Block being decided.
    pub(crate) handle: &'a BlockHandle,
    /// Statistics of the columns the predicate references.
    pub(crate) statistics: &'a BlockStatistics,
    /// Predicate the scan filters by.
    pub(crate) predicate: &'a Predicate,
}

/// Pruning abstraction boundary for the read path.
pub(crate) trait Pruner: Send + Sync {
    /// Decide whether the block must be decoded and filtered.
    fn prune(&self, input: PruneInput<'_>) -> BlockDecision;
}

/// Statistics of one block, restricted to the columns a predicate references.
#[derive(Clone, Debug, Default)]
pub(crate) struct BlockStatistics {
    columns: HashMap<Arc<str>, Statistics>,
}

impl BlockStatistics {
    /// Fetch the statistics `predicate` needs from `source`.
    pub(crate) fn gather<S>(source: &S, handle: &BlockHandle, predicate: &Predicate) -> Self
    where
        S: BlockSource + ?Sized,
    {
        let columns = predicate
            .columns()
            .into_iter()
            .filter_map(|column| {
                let statistics = source.statistics_of(handle, column)?;
                Some((Arc::clone(&column.name), statistics))
            })
            .collect();
        Self { columns }
    }

    /// Number of columns with statistics.
    pub(crate) fn len(&self) -> usize {
        self.columns.len()
    }
}

impl StatisticsProvider for BlockStatistics {
    fn statistics(&self, column: &ColumnRef) -> Option<&Statistics> {
        self.columns.get(column.name())
    }
}

/// Decide a single block. Empty blocks are always skipped.
pub(crate) fn decide<S>(
    source: &S,
    handle: &BlockHandle,
    predicate: &Predicate,
    pruner: &dyn Pruner,
) -> BlockDecision
where
    S: BlockSource + ?Sized,
{
    if handle.is_empty() {
        return BlockDecision::Skip;
    }
    let statistics = BlockStatistics::gather(source, handle, predicate);
    pruner.prune(PruneInput {
        handle,
        statistics: &statistics,
        predicate,
    })
}

/// Decide every block up front, in parallel, preserving block order.
pub(crate) fn decide_all<S>(
    source: &S,
    handles: &[BlockHandle],
    predicate: &Predicate,
    pruner: &dyn Pruner,
) -> Vec<BlockDecision>
where
    S: BlockSource + ?Sized,
{
    handles
        .par_iter()
        .map(|handle| decide(source, handle, predicate, pruner))
        .collect()
}
