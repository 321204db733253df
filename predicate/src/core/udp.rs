//! Extension point for predicates supplied by callers.

use std::{any, fmt, sync::Arc};

use super::{ColumnRef, ColumnValue, DataType, ScalarValue, Statistics, ValueStatistics};

/// Predicate logic supplied by a caller for a single column.
///
/// Implementations must be pure. `keep` is never called with an absent
/// value: the engine treats absence as non-matching for user-defined leaves.
///
/// Both statistics hooks carry a soundness obligation that the engine trusts
/// without checking:
///
/// * `can_drop` may return `true` only if no value `v` with
///   `min <= v <= max` satisfies `keep(v)`;
/// * `inverse_can_drop` may return `true` only if every such `v` satisfies
///   `keep(v)`.
///
/// Returning `false` from either hook is always safe.
pub trait UserDefinedPredicate: fmt::Debug + Send + Sync + 'static {
    /// Value type of the column this predicate applies to.
    type Value: ColumnValue + ?Sized;

    /// Record-level decision for a present value.
    fn keep(&self, value: &Self::Value) -> bool;

    /// True when no value inside the statistics' bounds can be kept.
    fn can_drop(&self, statistics: &ValueStatistics<'_, Self::Value>) -> bool;

    /// True when every value inside the statistics' bounds is kept.
    fn inverse_can_drop(&self, statistics: &ValueStatistics<'_, Self::Value>) -> bool;
}

// Object-safe view of a `UserDefinedPredicate` over untyped scalars.
trait ErasedPredicate: fmt::Debug + Send + Sync {
    fn data_type(&self) -> DataType;

    fn name(&self) -> &'static str;

    fn keep(&self, value: &ScalarValue) -> bool;

    fn can_drop(&self, statistics: &Statistics) -> bool;

    fn inverse_can_drop(&self, statistics: &Statistics) -> bool;
}

impl<P> ErasedPredicate for P
where
    P: UserDefinedPredicate,
{
    fn data_type(&self) -> DataType {
        P::Value::DATA_TYPE
    }

    fn name(&self) -> &'static str {
        let full = any::type_name::<P>();
        full.rsplit("::").next().unwrap_or(full)
    }

    fn keep(&self, value: &ScalarValue) -> bool {
        P::Value::from_scalar(value).is_some_and(|value| UserDefinedPredicate::keep(self, value))
    }

    fn can_drop(&self, statistics: &Statistics) -> bool {
        statistics
            .typed::<P::Value>()
            .is_some_and(|typed| UserDefinedPredicate::can_drop(self, &typed))
    }

    fn inverse_can_drop(&self, statistics: &Statistics) -> bool {
        statistics
            .typed::<P::Value>()
            .is_some_and(|typed| UserDefinedPredicate::inverse_can_drop(self, &typed))
    }
}

/// Leaf binding a user-defined predicate to a column.
#[derive(Clone, Debug)]
pub struct UserDefinedLeaf {
    column: ColumnRef,
    predicate: Arc<dyn ErasedPredicate>,
}

impl UserDefinedLeaf {
    pub(crate) fn new<P>(column: ColumnRef, predicate: P) -> Self
    where
        P: UserDefinedPredicate,
    {
        Self {
            column,
            predicate: Arc::new(predicate),
        }
    }

    /// Column the predicate applies to.
    #[must_use]
    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    /// Type the predicate expects.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.predicate.data_type()
    }

    /// Short type name of the predicate, for display.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.predicate.name()
    }

    /// Record-level decision; `false` for values of another type or `Null`.
    #[must_use]
    pub fn keep(&self, value: &ScalarValue) -> bool {
        self.predicate.keep(value)
    }

    /// Statistics hook; `false` when bounds are missing or of another type.
    #[must_use]
    pub fn can_drop(&self, statistics: &Statistics) -> bool {
        self.predicate.can_drop(statistics)
    }

    /// Inverse statistics hook; `false` when bounds are missing or of another type.
    #[must_use]
    pub fn inverse_can_drop(&self, statistics: &Statistics) -> bool {
        self.predicate.inverse_can_drop(statistics)
    }

    /// True when both leaves share the same column and predicate instance.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.column == other.column && Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

/// Keeps integers strictly between `lower` and `upper`.
///
/// The bounds are captured at construction, so several ranges can be used
/// concurrently in different predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExclusiveRange {
    lower: i64,
    upper: i64,
}

impl ExclusiveRange {
    /// Creates a range keeping `lower < v < upper`.
    #[must_use]
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }

    /// Exclusive lower bound.
    #[must_use]
    pub fn lower(&self) -> i64 {
        self.lower
    }

    /// Exclusive upper bound.
    #[must_use]
    pub fn upper(&self) -> i64 {
        self.upper
    }
}

impl UserDefinedPredicate for ExclusiveRange {
    type Value = i64;

    fn keep(&self, value: &i64) -> bool {
        *value > self.lower && *value < self.upper
    }

    fn can_drop(&self, statistics: &ValueStatistics<'_, i64>) -> bool {
        *statistics.max() <= self.lower || *statistics.min() >= self.upper
    }

    fn inverse_can_drop(&self, statistics: &ValueStatistics<'_, i64>) -> bool {
        *statistics.min() > self.lower && *statistics.max() < self.upper
    }
}
