//! No-op pruning implementation.

use crate::pruning::{BlockDecision, PruneInput, Pruner};

/// Pruner that always decodes and filters every block.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct NoopPruner;

impl Pruner for NoopPruner {
    fn prune(&self, _input: PruneInput<'_>) -> BlockDecision {
        BlockDecision::Filter
    }
}
