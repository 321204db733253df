//! Record-level evaluation.

use std::{collections::HashMap, sync::Arc};

use super::{ColumnRef, ComparisonOp, Predicate, PredicateNode, ScalarValue};

/// Read access to the materialized values of one record.
pub trait RecordView {
    /// Value stored for `column`; `None` or `Some(Null)` both mean absent.
    fn value(&self, column: &ColumnRef) -> Option<&ScalarValue>;
}

impl<S> RecordView for HashMap<Arc<str>, ScalarValue, S>
where
    S: std::hash::BuildHasher,
{
    fn value(&self, column: &ColumnRef) -> Option<&ScalarValue> {
        self.get(column.name())
    }
}

/// Decides whether `record` satisfies `predicate`.
///
/// Absent values never satisfy ordering comparisons or user-defined leaves.
/// `eq(c, null)` holds exactly when `c` is absent and `not_eq(c, null)` when
/// it is present. `not_eq(c, v)` holds for an absent `c`.
pub fn evaluate<R>(predicate: &Predicate, record: &R) -> bool
where
    R: RecordView + ?Sized,
{
    match predicate.kind() {
        PredicateNode::Compare { column, op, value } => {
            let current = record.value(column).filter(|value| !value.is_null());
            compare(current, *op, value)
        }
        PredicateNode::UserDefined(leaf) => record
            .value(leaf.column())
            .is_some_and(|value| leaf.keep(value)),
        PredicateNode::And(left, right) => evaluate(left, record) && evaluate(right, record),
        PredicateNode::Or(left, right) => evaluate(left, record) || evaluate(right, record),
        PredicateNode::Not(child) => !evaluate(child, record),
    }
}

fn compare(current: Option<&ScalarValue>, op: ComparisonOp, literal: &ScalarValue) -> bool {
    match (current, literal.is_null()) {
        (None, true) => op == ComparisonOp::Equal,
        (Some(_), true) => op == ComparisonOp::NotEqual,
        (None, false) => op == ComparisonOp::NotEqual,
        (Some(current), false) => current
            .compare(literal)
            .is_some_and(|ordering| op.test_ordering(ordering)),
    }
}
