//! Typed, null-aware column storage.
//!
//! Each column keeps a dense `Vec` of values plus an optional validity
//! mask; fully valid columns carry no mask at all. The `Column` enum is
//! the unit a `Frame` stores and what the pipeline stages dispatch on.

mod boolean_column;
mod common;
mod float64_column;
mod int64_column;
mod string_column;

pub use boolean_column::BooleanColumn;
pub use common::{Column, ColumnTrait, ColumnType};
pub use float64_column::Float64Column;
pub use int64_column::Int64Column;
pub use string_column::StringColumn;
