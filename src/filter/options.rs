/// Knobs of a filtered scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub(crate) prune_blocks: bool,
    pub(crate) record_filtering: bool,
    pub(crate) parallel_pruning: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            prune_blocks: true,
            record_filtering: true,
            parallel_pruning: false,
        }
    }
}

impl FilterOptions {
    /// Skip blocks whose statistics rule out every record. Turning this off
    /// decodes every non-empty block, which is the baseline pruning is
    /// checked against. Empty blocks are never decoded.
    #[must_use]
    pub fn prune_blocks(self, prune_blocks: bool) -> Self {
        FilterOptions {
            prune_blocks,
            ..self
        }
    }

    /// Evaluate the predicate against each decoded record. When off, every
    /// record of a block that survives pruning is returned.
    #[must_use]
    pub fn record_filtering(self, record_filtering: bool) -> Self {
        FilterOptions {
            record_filtering,
            ..self
        }
    }

    /// Decide every block up front on the rayon pool.
    #[must_use]
    pub fn parallel_pruning(self, parallel_pruning: bool) -> Self {
        FilterOptions {
            parallel_pruning,
            ..self
        }
    }

    /// Whether blocks may be skipped.
    #[must_use]
    pub fn prunes_blocks(&self) -> bool {
        self.prune_blocks
    }

    /// Whether decoded records are evaluated.
    #[must_use]
    pub fn filters_records(&self) -> bool {
        self.record_filtering
    }

    /// Whether pruning runs in parallel ahead of decoding.
    #[must_use]
    pub fn prunes_in_parallel(&self) -> bool {
        self.parallel_pruning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let options = FilterOptions::default();
        assert!(options.prunes_blocks());
        assert!(options.filters_records());
        assert!(!options.prunes_in_parallel());

        let options = options
            .prune_blocks(false)
            .record_filtering(false)
            .parallel_pruning(true);
        assert!(!options.prunes_blocks());
        assert!(!options.filters_records());
        assert!(options.prunes_in_parallel());
    }
}
