use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::DataValue;

use super::boolean_column::BooleanColumn;
use super::float64_column::Float64Column;
use super::int64_column::Int64Column;
use super::string_column::StringColumn;

/// Identifies the storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Int64,
    Float64,
    String,
    Boolean,
}

impl ColumnType {
    /// True for the numeric storage types.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::String => write!(f, "string"),
            ColumnType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Operations shared by every typed column.
pub trait ColumnTrait {
    /// Number of cells (including nulls).
    fn len(&self) -> usize;

    /// True when the column has no cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type of the column.
    fn column_type(&self) -> ColumnType;

    /// Number of null cells.
    fn null_count(&self) -> usize;

    /// True when the cell at `index` is null. Out-of-range indexes are not null.
    fn is_null(&self, index: usize) -> bool;
}

/// A typed column, the unit of storage inside a `Frame`.
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Int64Column),
    Float64(Float64Column),
    String(StringColumn),
    Boolean(BooleanColumn),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(c) => c.len(),
            Column::Float64(c) => c.len(),
            Column::String(c) => c.len(),
            Column::Boolean(c) => c.len(),
        }
    }

    /// True when the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Storage type.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::String(_) => ColumnType::String,
            Column::Boolean(_) => ColumnType::Boolean,
        }
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        match self {
            Column::Int64(c) => c.null_count(),
            Column::Float64(c) => c.null_count(),
            Column::String(c) => c.null_count(),
            Column::Boolean(c) => c.null_count(),
        }
    }

    /// True when the cell at `index` is null.
    pub fn is_null(&self, index: usize) -> bool {
        match self {
            Column::Int64(c) => c.is_null(index),
            Column::Float64(c) => c.is_null(index),
            Column::String(c) => c.is_null(index),
            Column::Boolean(c) => c.is_null(index),
        }
    }

    /// Cell at `index` as a dynamically typed value.
    pub fn value(&self, index: usize) -> Result<DataValue> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok(match self {
            Column::Int64(c) => c.get(index)?.map(DataValue::Int64).unwrap_or(DataValue::Null),
            Column::Float64(c) => c
                .get(index)?
                .map(DataValue::Float64)
                .unwrap_or(DataValue::Null),
            Column::String(c) => c
                .get(index)?
                .map(|s| DataValue::String(s.to_string()))
                .unwrap_or(DataValue::Null),
            Column::Boolean(c) => c
                .get(index)?
                .map(DataValue::Boolean)
                .unwrap_or(DataValue::Null),
        })
    }

    /// New column holding the cells at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Result<Column> {
        Ok(match self {
            Column::Int64(c) => Column::Int64(c.take(indices)?),
            Column::Float64(c) => Column::Float64(c.take(indices)?),
            Column::String(c) => Column::String(c.take(indices)?),
            Column::Boolean(c) => Column::Boolean(c.take(indices)?),
        })
    }

    /// Approximate heap footprint in bytes, mask included.
    pub fn memory_bytes(&self) -> usize {
        match self {
            Column::Int64(c) => c.memory_bytes(),
            Column::Float64(c) => c.memory_bytes(),
            Column::String(c) => c.memory_bytes(),
            Column::Boolean(c) => c.memory_bytes(),
        }
    }

    /// Typed view, if this is an Int64 column.
    pub fn as_int64(&self) -> Option<&Int64Column> {
        match self {
            Column::Int64(c) => Some(c),
            _ => None,
        }
    }

    /// Typed view, if this is a Float64 column.
    pub fn as_float64(&self) -> Option<&Float64Column> {
        match self {
            Column::Float64(c) => Some(c),
            _ => None,
        }
    }

    /// Typed view, if this is a String column.
    pub fn as_string(&self) -> Option<&StringColumn> {
        match self {
            Column::String(c) => Some(c),
            _ => None,
        }
    }

    /// Typed view, if this is a Boolean column.
    pub fn as_boolean(&self) -> Option<&BooleanColumn> {
        match self {
            Column::Boolean(c) => Some(c),
            _ => None,
        }
    }
}

/// Builds the optional validity mask shared by the column constructors.
///
/// Returns None when no cell is null, so fully valid columns carry no mask.
pub(crate) fn build_null_mask(nulls: &[bool]) -> Option<Vec<bool>> {
    if nulls.iter().any(|&n| n) {
        Some(nulls.to_vec())
    } else {
        None
    }
}
