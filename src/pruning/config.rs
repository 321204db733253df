//! Pruner selection.

use super::{noop::NoopPruner, statistics::StatisticsPruner, Pruner};
use crate::filter::FilterOptions;

static STATISTICS_PRUNER: StatisticsPruner = StatisticsPruner;
static NOOP_PRUNER: NoopPruner = NoopPruner;

/// Policy for selecting pruning implementations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PrunerPolicy {
    /// Skip blocks using footer statistics.
    Statistics,
    /// Decode every block (baseline).
    Noop,
}

impl PrunerPolicy {
    /// Resolve the policy requested by scan options.
    pub(crate) fn resolve(options: &FilterOptions) -> Self {
        if options.prune_blocks {
            PrunerPolicy::Statistics
        } else {
            PrunerPolicy::Noop
        }
    }

    /// Pruner implementing the policy.
    pub(crate) fn pruner(self) -> &'static dyn Pruner {
        match self {
            PrunerPolicy::Statistics => &STATISTICS_PRUNER,
            PrunerPolicy::Noop => &NOOP_PRUNER,
        }
    }
}
