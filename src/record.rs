//! Materialized rows.

use std::{fmt, sync::Arc};

use colsieve_predicate::{ColumnRef, RecordView, ScalarValue};

use crate::{
    error::RecordError,
    schema::{Schema, SchemaRef},
};

/// One row: a value per schema column, in schema order.
///
/// Absent values of optional columns are stored as [`ScalarValue::Null`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    schema: SchemaRef,
    values: Vec<ScalarValue>,
}

impl Record {
    /// Validates `values` against `schema`.
    pub fn try_new(schema: SchemaRef, values: Vec<ScalarValue>) -> Result<Self, RecordError> {
        if values.len() != schema.len() {
            return Err(RecordError::Arity {
                expected: schema.len(),
                actual: values.len(),
            });
        }
        for (column, value) in schema.columns().iter().zip(&values) {
            match value.data_type() {
                None if !column.is_nullable() => {
                    return Err(RecordError::MissingRequired(column.name().to_owned()));
                }
                Some(actual) if actual != column.data_type() => {
                    return Err(RecordError::TypeMismatch {
                        column: column.name().to_owned(),
                        expected: column.data_type(),
                        actual,
                    });
                }
                _ => {}
            }
        }
        Ok(Self { schema, values })
    }

    /// Schema the record was validated against.
    #[must_use]
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Values in schema order.
    #[must_use]
    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    /// Present value of the column called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        let index = self.schema.index_of(name)?;
        self.present(index)
    }

    /// Integer value of the column called `name`, if present.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ScalarValue::as_i64)
    }

    /// String value of the column called `name`, if present.
    #[must_use]
    pub fn get_utf8(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ScalarValue::as_utf8)
    }

    pub(crate) fn shares_schema(&self, schema: &SchemaRef) -> bool {
        Arc::ptr_eq(&self.schema, schema) || *self.schema == **schema
    }

    fn present(&self, index: usize) -> Option<&ScalarValue> {
        self.values.get(index).filter(|value| !value.is_null())
    }
}

impl RecordView for Record {
    fn value(&self, column: &ColumnRef) -> Option<&ScalarValue> {
        // The ordinal is a hint; records from another layout fall back to the name.
        let hinted = self
            .schema
            .column_at(column.index)
            .is_some_and(|candidate| candidate.name() == column.name());
        if hinted {
            self.present(column.index)
        } else {
            self.get(column.name())
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema: &Schema = &self.schema;
        f.write_str("{")?;
        for (position, (column, value)) in schema.columns().iter().zip(&self.values).enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", column.name(), value)?;
        }
        f.write_str("}")
    }
}
