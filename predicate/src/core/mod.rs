#![deny(missing_docs)]
//! Core predicate structures shared by the record and pruning evaluators.

mod builder;
mod column;
mod error;
mod eval;
mod prune;
mod stats;
mod udp;
mod value;

use std::{cmp::Ordering, fmt};

pub use builder::{and, eq, gt, gt_eq, lt, lt_eq, not, not_eq, or, user_defined};
pub use column::ColumnRef;
pub use error::PredicateError;
pub use eval::{evaluate, RecordView};
pub use prune::{can_drop, inverse_can_drop, StatisticsProvider};
pub use stats::{Statistics, StatisticsBuilder, ValueStatistics};
pub use udp::{ExclusiveRange, UserDefinedLeaf, UserDefinedPredicate};
pub use value::{ColumnValue, DataType, ScalarValue};

/// Comparison operator used by leaf predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equals (`=`).
    Equal,
    /// Not equals (`!=`).
    NotEqual,
    /// Less than (`<`).
    LessThan,
    /// Less than or equal to (`<=`).
    LessThanOrEqual,
    /// Greater than (`>`).
    GreaterThan,
    /// Greater than or equal to (`>=`).
    GreaterThanOrEqual,
}

impl ComparisonOp {
    /// Returns a textual representation of the operator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
        }
    }

    /// Function-style name used when rendering predicates.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "eq",
            ComparisonOp::NotEqual => "noteq",
            ComparisonOp::LessThan => "lt",
            ComparisonOp::LessThanOrEqual => "lteq",
            ComparisonOp::GreaterThan => "gt",
            ComparisonOp::GreaterThanOrEqual => "gteq",
        }
    }

    /// True for `=` and `!=`, the only operators that accept a null literal.
    #[must_use]
    pub fn accepts_null(self) -> bool {
        matches!(self, ComparisonOp::Equal | ComparisonOp::NotEqual)
    }

    /// Evaluates the operator against a comparison ordering.
    #[must_use]
    pub fn test_ordering(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable predicate tree.
///
/// Predicates are only built through the validated constructors ([`eq`],
/// [`gt`], [`and`], ...). A tree is `Send + Sync` and can be shared across
/// threads and reused for every block of a file.
#[derive(Clone, Debug)]
pub struct Predicate {
    kind: PredicateNode,
}

/// Node of a predicate tree.
#[derive(Clone, Debug)]
pub enum PredicateNode {
    /// Column compared against a literal. The literal is `Null` only for `=` and `!=`.
    Compare {
        /// Column under test.
        column: ColumnRef,
        /// Operator.
        op: ComparisonOp,
        /// Literal operand, of the column's type or `Null`.
        value: ScalarValue,
    },
    /// Caller-supplied predicate bound to a column.
    UserDefined(UserDefinedLeaf),
    /// Conjunction.
    And(Box<Predicate>, Box<Predicate>),
    /// Disjunction.
    Or(Box<Predicate>, Box<Predicate>),
    /// Negation of a single child; never distributed over `And`/`Or`.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Returns a reference to the underlying node.
    #[must_use]
    pub fn kind(&self) -> &PredicateNode {
        &self.kind
    }

    /// Distinct columns referenced by the tree, in order of first appearance.
    #[must_use]
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match &self.kind {
            PredicateNode::Compare { .. } | PredicateNode::UserDefined(_) => 1,
            PredicateNode::Not(child) => 1 + child.node_count(),
            PredicateNode::And(left, right) | PredicateNode::Or(left, right) => {
                1 + left.node_count() + right.node_count()
            }
        }
    }

    pub(crate) fn from_kind(kind: PredicateNode) -> Self {
        Self { kind }
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        let mut push = |column: &'a ColumnRef| {
            if !out.iter().any(|seen| seen.name == column.name) {
                out.push(column);
            }
        };
        match &self.kind {
            PredicateNode::Compare { column, .. } => push(column),
            PredicateNode::UserDefined(leaf) => push(leaf.column()),
            PredicateNode::Not(child) => child.collect_columns(out),
            PredicateNode::And(left, right) | PredicateNode::Or(left, right) => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
        }
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (
                PredicateNode::Compare {
                    column: lc,
                    op: lo,
                    value: lv,
                },
                PredicateNode::Compare {
                    column: rc,
                    op: ro,
                    value: rv,
                },
            ) => lc == rc && lo == ro && lv == rv,
            (PredicateNode::UserDefined(l), PredicateNode::UserDefined(r)) => l.same_as(r),
            (PredicateNode::And(ll, lr), PredicateNode::And(rl, rr))
            | (PredicateNode::Or(ll, lr), PredicateNode::Or(rl, rr)) => ll == rl && lr == rr,
            (PredicateNode::Not(l), PredicateNode::Not(r)) => l == r,
            _ => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PredicateNode::Compare { column, op, value } => {
                write!(f, "{}({}, {})", op.name(), column, value)
            }
            PredicateNode::UserDefined(leaf) => {
                write!(f, "userdefined({}, {})", leaf.column(), leaf.name())
            }
            PredicateNode::And(left, right) => write!(f, "and({left}, {right})"),
            PredicateNode::Or(left, right) => write!(f, "or({left}, {right})"),
            PredicateNode::Not(child) => write!(f, "not({child})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_location() -> ColumnRef {
        ColumnRef::new("mapLocation", 2, DataType::Int64, false)
    }

    fn random_key() -> ColumnRef {
        ColumnRef::new("randomKey1", 3, DataType::Int64, true)
    }

    #[test]
    fn display_renders_prefix_form() {
        let predicate = and(
            gt(&map_location(), 30).expect("gt"),
            not(not_eq(&random_key(), ScalarValue::Null).expect("noteq")),
        );
        assert_eq!(
            predicate.to_string(),
            "and(gt(mapLocation, 30), not(noteq(randomKey1, null)))"
        );

        let udp = user_defined(&map_location(), ExclusiveRange::new(1, 2)).expect("udp");
        assert_eq!(udp.to_string(), "userdefined(mapLocation, ExclusiveRange)");
    }

    #[test]
    fn columns_are_deduplicated_in_order() {
        let predicate = or(
            and(
                lt(&map_location(), 5).expect("lt"),
                eq(&random_key(), ScalarValue::Null).expect("eq"),
            ),
            gt_eq(&map_location(), 100).expect("gteq"),
        );
        let names: Vec<_> = predicate.columns().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["mapLocation", "randomKey1"]);
        assert_eq!(predicate.node_count(), 5);
    }

    #[test]
    fn structural_equality() {
        let a = lt_eq(&map_location(), 7).expect("lteq");
        let b = lt_eq(&map_location(), 7).expect("lteq");
        let c = lt_eq(&map_location(), 8).expect("lteq");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(not(a.clone()), a);

        let udp = user_defined(&map_location(), ExclusiveRange::new(0, 1)).expect("udp");
        assert_eq!(udp, udp.clone());
        let other = user_defined(&map_location(), ExclusiveRange::new(0, 1)).expect("udp");
        assert_ne!(udp, other);
    }

    #[test]
    fn predicates_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Predicate>();
    }

    #[test]
    fn test_ordering_table() {
        use Ordering::*;
        assert!(ComparisonOp::GreaterThan.test_ordering(Greater));
        assert!(!ComparisonOp::GreaterThan.test_ordering(Equal));
        assert!(ComparisonOp::GreaterThanOrEqual.test_ordering(Equal));
        assert!(ComparisonOp::LessThanOrEqual.test_ordering(Less));
        assert!(!ComparisonOp::LessThan.test_ordering(Equal));
        assert!(ComparisonOp::NotEqual.test_ordering(Less));
    }
}
