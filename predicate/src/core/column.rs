use std::{fmt, sync::Arc};

use super::DataType;

/// Reference identifying a typed column used inside predicates.
///
/// Column references are resolved against a schema before a predicate is
/// built, so they carry the column's ordinal, declared type and nullability.
/// Evaluators use the ordinal as a lookup hint and fall back to the name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Canonical column name.
    pub name: Arc<str>,
    /// Ordinal of the column within its schema.
    pub index: usize,
    /// Declared column type.
    pub data_type: DataType,
    /// True when the column is optional and may be absent in a record.
    pub nullable: bool,
}

impl ColumnRef {
    /// Creates a new column reference.
    #[must_use]
    pub fn new<N>(name: N, index: usize, data_type: DataType, nullable: bool) -> Self
    where
        N: Into<Arc<str>>,
    {
        Self {
            name: name.into(),
            index,
            data_type,
            nullable,
        }
    }

    /// Column name as a string slice.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
