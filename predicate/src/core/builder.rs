//! Validated constructors for predicate trees.
//!
//! Leaf constructors check the literal against the column's declared type
//! before a tree is ever evaluated, so evaluators never see a mistyped leaf.

use super::{
    ColumnRef, ColumnValue, ComparisonOp, Predicate, PredicateError, PredicateNode, ScalarValue,
    UserDefinedLeaf, UserDefinedPredicate,
};

fn compare<V>(column: &ColumnRef, op: ComparisonOp, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    let value = value.into();
    match value.data_type() {
        None if !op.accepts_null() => {
            return Err(PredicateError::NullLiteral {
                column: column.name().to_owned(),
                op,
            });
        }
        Some(actual) if actual != column.data_type => {
            return Err(PredicateError::TypeMismatch {
                column: column.name().to_owned(),
                expected: column.data_type,
                actual,
            });
        }
        _ => {}
    }
    Ok(Predicate::from_kind(PredicateNode::Compare {
        column: column.clone(),
        op,
        value,
    }))
}

/// `column = value`. A null literal tests for absence.
pub fn eq<V>(column: &ColumnRef, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    compare(column, ComparisonOp::Equal, value)
}

/// `column != value`. A null literal tests for presence.
pub fn not_eq<V>(column: &ColumnRef, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    compare(column, ComparisonOp::NotEqual, value)
}

/// `column < value`.
pub fn lt<V>(column: &ColumnRef, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    compare(column, ComparisonOp::LessThan, value)
}

/// `column <= value`.
pub fn lt_eq<V>(column: &ColumnRef, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    compare(column, ComparisonOp::LessThanOrEqual, value)
}

/// `column > value`.
pub fn gt<V>(column: &ColumnRef, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    compare(column, ComparisonOp::GreaterThan, value)
}

/// `column >= value`.
pub fn gt_eq<V>(column: &ColumnRef, value: V) -> Result<Predicate, PredicateError>
where
    V: Into<ScalarValue>,
{
    compare(column, ComparisonOp::GreaterThanOrEqual, value)
}

/// Binds a user-defined predicate to a column of the matching type.
pub fn user_defined<P>(column: &ColumnRef, predicate: P) -> Result<Predicate, PredicateError>
where
    P: UserDefinedPredicate,
{
    let expected = <P::Value as ColumnValue>::DATA_TYPE;
    if expected != column.data_type {
        return Err(PredicateError::TypeMismatch {
            column: column.name().to_owned(),
            expected: column.data_type,
            actual: expected,
        });
    }
    Ok(Predicate::from_kind(PredicateNode::UserDefined(
        UserDefinedLeaf::new(column.clone(), predicate),
    )))
}

/// Logical conjunction of two predicates.
#[must_use]
pub fn and(left: Predicate, right: Predicate) -> Predicate {
    Predicate::from_kind(PredicateNode::And(Box::new(left), Box::new(right)))
}

/// Logical disjunction of two predicates.
#[must_use]
pub fn or(left: Predicate, right: Predicate) -> Predicate {
    Predicate::from_kind(PredicateNode::Or(Box::new(left), Box::new(right)))
}

/// Logical negation of a predicate.
#[must_use]
pub fn not(child: Predicate) -> Predicate {
    Predicate::from_kind(PredicateNode::Not(Box::new(child)))
}
