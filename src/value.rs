//! Scalar cell values.
//!
//! `DataValue` is the dynamically typed scalar used at the edges of the
//! pipeline: constant fill values in decisions, audit examples, record
//! fields at serving time. Column storage itself stays statically typed
//! (see `crate::column`); `DataValue` only crosses API boundaries.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::column::ColumnType;

/// A single dynamically typed cell value, including the null case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Missing value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit integer value
    Int64(i64),
    /// 64-bit float value
    Float64(f64),
    /// String value
    String(String),
}

impl DataValue {
    /// Returns true for the null case.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Column type this value would live in, if not null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            DataValue::Null => None,
            DataValue::Boolean(_) => Some(ColumnType::Boolean),
            DataValue::Int64(_) => Some(ColumnType::Int64),
            DataValue::Float64(_) => Some(ColumnType::Float64),
            DataValue::String(_) => Some(ColumnType::String),
        }
    }

    /// Numeric view of the value, when one exists.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int64(v) => Some(*v as f64),
            DataValue::Float64(v) => Some(*v),
            DataValue::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// String view of the value, when it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "<null>"),
            DataValue::Boolean(v) => write!(f, "{}", v),
            DataValue::Int64(v) => write!(f, "{}", v),
            DataValue::Float64(v) => write!(f, "{}", v),
            DataValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int64(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float64(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}
