//! Statistics-level evaluation.
//!
//! Both rules are conservative: `false` is always a correct answer. A block
//! whose statistics are missing for a referenced column is never dropped.
//!
//! Negation swaps the two rules, so the evaluator walks the tree once with an
//! `inverted` flag instead of rewriting it.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use super::{ColumnRef, ComparisonOp, Predicate, PredicateNode, ScalarValue, Statistics};

/// Per-column statistics of one block.
pub trait StatisticsProvider {
    /// Statistics for `column`, or `None` when the block carries none.
    fn statistics(&self, column: &ColumnRef) -> Option<&Statistics>;
}

impl<S> StatisticsProvider for HashMap<Arc<str>, Statistics, S>
where
    S: std::hash::BuildHasher,
{
    fn statistics(&self, column: &ColumnRef) -> Option<&Statistics> {
        self.get(column.name())
    }
}

/// True when no record of the block can satisfy `predicate`.
pub fn can_drop<P>(predicate: &Predicate, statistics: &P) -> bool
where
    P: StatisticsProvider + ?Sized,
{
    prune(predicate, statistics, false)
}

/// True when every record of the block satisfies `predicate`.
pub fn inverse_can_drop<P>(predicate: &Predicate, statistics: &P) -> bool
where
    P: StatisticsProvider + ?Sized,
{
    prune(predicate, statistics, true)
}

// `inverted == false` answers "all rejected", `true` answers "all kept".
fn prune<P>(predicate: &Predicate, statistics: &P, inverted: bool) -> bool
where
    P: StatisticsProvider + ?Sized,
{
    match predicate.kind() {
        PredicateNode::Compare { column, op, value } => statistics
            .statistics(column)
            .is_some_and(|stats| prune_compare(stats, *op, value, inverted)),
        PredicateNode::UserDefined(leaf) => {
            statistics.statistics(leaf.column()).is_some_and(|stats| {
                if inverted {
                    stats.has_no_nulls() && leaf.inverse_can_drop(stats)
                } else {
                    stats.is_all_null() || leaf.can_drop(stats)
                }
            })
        }
        PredicateNode::Not(child) => prune(child, statistics, !inverted),
        PredicateNode::And(left, right) => {
            if inverted {
                prune(left, statistics, true) && prune(right, statistics, true)
            } else {
                prune(left, statistics, false) || prune(right, statistics, false)
            }
        }
        PredicateNode::Or(left, right) => {
            if inverted {
                prune(left, statistics, true) || prune(right, statistics, true)
            } else {
                prune(left, statistics, false) && prune(right, statistics, false)
            }
        }
    }
}

fn prune_compare(
    stats: &Statistics,
    op: ComparisonOp,
    literal: &ScalarValue,
    inverted: bool,
) -> bool {
    if literal.is_null() {
        // Presence tests depend on the null count alone.
        let tests_absence = match op {
            ComparisonOp::Equal => true,
            ComparisonOp::NotEqual => false,
            _ => return false,
        };
        return if tests_absence != inverted {
            stats.has_no_nulls()
        } else {
            stats.is_all_null()
        };
    }

    // Absent values satisfy `!=` and nothing else.
    let absent_kept = op == ComparisonOp::NotEqual;
    if inverted {
        (stats.is_all_null() || satisfies_all(stats, op, literal))
            && (absent_kept || stats.has_no_nulls())
    } else {
        (stats.is_all_null() || excludes_all(stats, op, literal))
            && (!absent_kept || stats.has_no_nulls())
    }
}

fn bounds(stats: &Statistics, literal: &ScalarValue) -> Option<(Ordering, Ordering)> {
    let min = stats.min()?.compare(literal)?;
    let max = stats.max()?.compare(literal)?;
    Some((min, max))
}

// No non-null value in `[min, max]` satisfies `v op literal`.
fn excludes_all(stats: &Statistics, op: ComparisonOp, literal: &ScalarValue) -> bool {
    use Ordering::*;

    let Some((min, max)) = bounds(stats, literal) else {
        return false;
    };
    match op {
        ComparisonOp::Equal => min == Greater || max == Less,
        ComparisonOp::NotEqual => min == Equal && max == Equal,
        ComparisonOp::GreaterThan => max != Greater,
        ComparisonOp::GreaterThanOrEqual => max == Less,
        ComparisonOp::LessThan => min != Less,
        ComparisonOp::LessThanOrEqual => min == Greater,
    }
}

// Every non-null value in `[min, max]` satisfies `v op literal`.
fn satisfies_all(stats: &Statistics, op: ComparisonOp, literal: &ScalarValue) -> bool {
    use Ordering::*;

    let Some((min, max)) = bounds(stats, literal) else {
        return false;
    };
    match op {
        ComparisonOp::Equal => min == Equal && max == Equal,
        ComparisonOp::NotEqual => min == Greater || max == Less,
        ComparisonOp::GreaterThan => min == Greater,
        ComparisonOp::GreaterThanOrEqual => min != Less,
        ComparisonOp::LessThan => max == Less,
        ComparisonOp::LessThanOrEqual => max != Greater,
    }
}
