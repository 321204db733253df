//! Per-block column summaries and the accumulator that produces them.

use std::cmp::Ordering;

use super::{ColumnValue, ScalarValue};

/// Immutable min/max/null summary of one column within one block.
///
/// `min` and `max` range over non-null values only and are absent when the
/// block holds no non-null value for the column. Every non-null value `v` of
/// the block satisfies `min <= v <= max`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statistics {
    min: Option<ScalarValue>,
    max: Option<ScalarValue>,
    null_count: u64,
    row_count: u64,
}

impl Statistics {
    /// Creates statistics from already computed parts.
    ///
    /// `Null` bounds are treated as absent.
    #[must_use]
    pub fn new(
        min: Option<ScalarValue>,
        max: Option<ScalarValue>,
        null_count: u64,
        row_count: u64,
    ) -> Self {
        Self {
            min: min.filter(|value| !value.is_null()),
            max: max.filter(|value| !value.is_null()),
            null_count,
            row_count,
        }
    }

    /// Folds a sequence of values into statistics.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a ScalarValue>,
    {
        let mut builder = StatisticsBuilder::new();
        for value in values {
            builder.update(value);
        }
        builder.build()
    }

    /// Smallest non-null value, if any.
    #[must_use]
    pub fn min(&self) -> Option<&ScalarValue> {
        self.min.as_ref()
    }

    /// Largest non-null value, if any.
    #[must_use]
    pub fn max(&self) -> Option<&ScalarValue> {
        self.max.as_ref()
    }

    /// Number of absent values.
    #[must_use]
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Number of rows summarized.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// True when at least one value is absent.
    #[must_use]
    pub fn has_nulls(&self) -> bool {
        self.null_count > 0
    }

    /// True when no value is absent.
    #[must_use]
    pub fn has_no_nulls(&self) -> bool {
        self.null_count == 0
    }

    /// True when every value is absent (vacuously true for an empty block).
    #[must_use]
    pub fn is_all_null(&self) -> bool {
        self.null_count >= self.row_count
    }

    /// Combines two partial aggregates.
    #[must_use]
    pub fn merge(&self, other: &Statistics) -> Statistics {
        let mut builder = StatisticsBuilder::from(self.clone());
        builder.merge(other);
        builder.build()
    }

    /// Typed view over the bounds, when both are present and hold `T` values.
    #[must_use]
    pub fn typed<T>(&self) -> Option<ValueStatistics<'_, T>>
    where
        T: ColumnValue + ?Sized,
    {
        let min = T::from_scalar(self.min.as_ref()?)?;
        let max = T::from_scalar(self.max.as_ref()?)?;
        Some(ValueStatistics {
            min,
            max,
            null_count: self.null_count,
            row_count: self.row_count,
        })
    }
}

/// Typed, borrowed view of [`Statistics`] handed to user-defined predicates.
#[derive(Debug)]
pub struct ValueStatistics<'a, T: ?Sized> {
    min: &'a T,
    max: &'a T,
    null_count: u64,
    row_count: u64,
}

impl<'a, T: ?Sized> ValueStatistics<'a, T> {
    /// Smallest non-null value.
    #[must_use]
    pub fn min(&self) -> &'a T {
        self.min
    }

    /// Largest non-null value.
    #[must_use]
    pub fn max(&self) -> &'a T {
        self.max
    }

    /// Number of absent values.
    #[must_use]
    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    /// Number of rows summarized.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        self.row_count
    }
}

/// Min/max/null accumulator used while a block is being written.
///
/// Updates and merges are associative and commutative, so partial builders
/// from parallel writers can be combined in any order.
#[derive(Clone, Debug, Default)]
pub struct StatisticsBuilder {
    min: Option<ScalarValue>,
    max: Option<ScalarValue>,
    null_count: u64,
    row_count: u64,
}

impl StatisticsBuilder {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one value into the accumulator.
    pub fn update(&mut self, value: &ScalarValue) {
        self.row_count += 1;
        if value.is_null() {
            self.null_count += 1;
            return;
        }
        Self::widen(&mut self.min, value, Ordering::Less);
        Self::widen(&mut self.max, value, Ordering::Greater);
    }

    /// Folds already aggregated statistics into the accumulator.
    pub fn merge(&mut self, other: &Statistics) {
        self.row_count += other.row_count;
        self.null_count += other.null_count;
        if let Some(min) = &other.min {
            Self::widen(&mut self.min, min, Ordering::Less);
        }
        if let Some(max) = &other.max {
            Self::widen(&mut self.max, max, Ordering::Greater);
        }
    }

    /// Seals the accumulator.
    #[must_use]
    pub fn build(self) -> Statistics {
        Statistics {
            min: self.min,
            max: self.max,
            null_count: self.null_count,
            row_count: self.row_count,
        }
    }

    // Replaces `slot` when `candidate` compares as `wanted` against it.
    fn widen(slot: &mut Option<ScalarValue>, candidate: &ScalarValue, wanted: Ordering) {
        match slot {
            Some(current) => {
                if candidate.compare(current) == Some(wanted) {
                    *current = candidate.clone();
                }
            }
            None => *slot = Some(candidate.clone()),
        }
    }
}

impl From<Statistics> for StatisticsBuilder {
    fn from(value: Statistics) -> Self {
        Self {
            min: value.min,
            max: value.max,
            null_count: value.null_count,
            row_count: value.row_count,
        }
    }
}
