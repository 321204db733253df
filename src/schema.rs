//! Table schemas and column resolution.

use std::{collections::HashMap, fmt, sync::Arc};

use arrow::datatypes::{
    DataType as ArrowDataType, Field, Schema as ArrowSchema, SchemaRef as ArrowSchemaRef,
};
use colsieve_predicate::{ColumnRef, DataType, PredicateError};

use crate::error::SchemaError;

/// Whether a column must hold a value in every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// Every record holds a value.
    Required,
    /// Records may omit the value.
    Optional,
}

/// Declared column of a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    name: Arc<str>,
    data_type: DataType,
    repetition: Repetition,
}

impl Column {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Declared repetition.
    #[must_use]
    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    /// True for optional columns.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.repetition == Repetition::Optional
    }
}

/// Shared schema handle.
pub type SchemaRef = Arc<Schema>;

/// Ordered, immutable set of columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    by_name: HashMap<Arc<str>, usize>,
}

impl Schema {
    /// Start declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a built schema; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Ordinal of the column called `name`.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Column at `index`.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Resolve `name` into a reference usable by predicates.
    ///
    /// Fails with `UnknownColumn` when no such column exists and with
    /// `TypeMismatch` when `declared` differs from the column's type.
    pub fn column(&self, name: &str, declared: DataType) -> Result<ColumnRef, PredicateError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| PredicateError::UnknownColumn(name.to_owned()))?;
        let column = &self.columns[index];
        if column.data_type != declared {
            return Err(PredicateError::TypeMismatch {
                column: name.to_owned(),
                expected: column.data_type,
                actual: declared,
            });
        }
        Ok(ColumnRef::new(
            Arc::clone(&column.name),
            index,
            column.data_type,
            column.is_nullable(),
        ))
    }

    /// Resolve an `Int64` column.
    pub fn int64_column(&self, name: &str) -> Result<ColumnRef, PredicateError> {
        self.column(name, DataType::Int64)
    }

    /// Resolve a `Utf8` column.
    pub fn utf8_column(&self, name: &str) -> Result<ColumnRef, PredicateError> {
        self.column(name, DataType::Utf8)
    }

    /// Arrow schema with one field per column, nullable iff optional.
    #[must_use]
    pub fn to_arrow(&self) -> ArrowSchemaRef {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|column| {
                let data_type = match column.data_type {
                    DataType::Int64 => ArrowDataType::Int64,
                    DataType::Utf8 => ArrowDataType::Utf8,
                };
                Field::new(column.name(), data_type, column.is_nullable())
            })
            .collect();
        Arc::new(ArrowSchema::new(fields))
    }

    /// Schema matching an Arrow schema read back from a file.
    pub fn try_from_arrow(schema: &ArrowSchema) -> Result<Schema, SchemaError> {
        let mut builder = Schema::builder();
        for field in schema.fields() {
            let data_type = match field.data_type() {
                ArrowDataType::Int64 => DataType::Int64,
                ArrowDataType::Utf8 => DataType::Utf8,
                other => {
                    return Err(SchemaError::UnsupportedType {
                        column: field.name().clone(),
                        data_type: other.to_string(),
                    })
                }
            };
            builder = if field.is_nullable() {
                builder.optional(field.name().as_str(), data_type)
            } else {
                builder.required(field.name().as_str(), data_type)
            };
        }
        builder.build()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("message {")?;
        for column in &self.columns {
            let repetition = match column.repetition {
                Repetition::Required => "required",
                Repetition::Optional => "optional",
            };
            write!(f, " {} {} {};", repetition, column.data_type, column.name)?;
        }
        f.write_str(" }")
    }
}

/// Builder declaring columns in order.
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<Column>,
}

impl SchemaBuilder {
    /// Append a required column.
    #[must_use]
    pub fn required(self, name: impl Into<Arc<str>>, data_type: DataType) -> Self {
        self.column(name, data_type, Repetition::Required)
    }

    /// Append an optional column.
    #[must_use]
    pub fn optional(self, name: impl Into<Arc<str>>, data_type: DataType) -> Self {
        self.column(name, data_type, Repetition::Optional)
    }

    /// Append a column with an explicit repetition.
    #[must_use]
    pub fn column(
        mut self,
        name: impl Into<Arc<str>>,
        data_type: DataType,
        repetition: Repetition,
    ) -> Self {
        self.columns.push(Column {
            name: name.into(),
            data_type,
            repetition,
        });
        self
    }

    /// Finalise the declaration.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut by_name = HashMap::with_capacity(self.columns.len());
        for (index, column) in self.columns.iter().enumerate() {
            if by_name.insert(Arc::clone(&column.name), index).is_some() {
                return Err(SchemaError::DuplicateColumn(column.name().to_owned()));
            }
        }
        Ok(Schema {
            columns: self.columns,
            by_name,
        })
    }
}
