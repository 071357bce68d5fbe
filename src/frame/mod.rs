//! Column-oriented table threaded through the pipeline.
//!
//! A `Frame` owns named typed columns with a uniform row count. Pipeline
//! stages never mutate their input: each stage clones the frame it
//! receives, transforms the clone, and returns it alongside its audit
//! artifacts.

use std::collections::HashMap;
use std::fmt::{self, Debug};

use crate::column::{Column, ColumnType};
use crate::error::{Error, Result};

/// In-memory table: ordered named columns, uniform row count.
#[derive(Clone)]
pub struct Frame {
    // Column storage, parallel to column_names
    columns: Vec<Column>,
    // Column name -> position
    column_indices: HashMap<String, usize>,
    // Declared column order
    column_names: Vec<String>,
    // Shared row count
    row_count: usize,
}

impl Frame {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            column_indices: HashMap::new(),
            column_names: Vec::new(),
            row_count: 0,
        }
    }

    /// Builds a frame from `(name, column)` pairs in the given order.
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Column)>,
    {
        let mut frame = Frame::new();
        for (name, column) in columns {
            frame.add_column(name, column)?;
        }
        Ok(frame)
    }

    /// Appends a column. The first column fixes the row count; later
    /// columns must match it, and names must be unique.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column.len(),
            });
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        }
        self.column_indices.insert(name.clone(), self.columns.len());
        self.column_names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replaces an existing column, keeping its position.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = *self
            .column_indices
            .get(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        if column.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column.len(),
            });
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_indices
            .get(name)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// True when a column with `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Storage type of a column.
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.column(name)?.column_type())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the frame holds no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// New frame holding only `names`, in that order. Fails on unknown
    /// names.
    pub fn select(&self, names: &[String]) -> Result<Frame> {
        let mut out = Frame::new();
        for name in names {
            let column = self.column(name)?;
            out.add_column(name.clone(), column.clone())?;
        }
        // An empty selection still describes a frame with the input's rows
        if names.is_empty() {
            out.row_count = self.row_count;
        }
        Ok(out)
    }

    /// New frame holding the rows at `indices`, in that order, across all
    /// columns.
    pub fn take(&self, indices: &[usize]) -> Result<Frame> {
        let mut out = Frame::new();
        for (name, column) in self.column_names.iter().zip(self.columns.iter()) {
            out.add_column(name.clone(), column.take(indices)?)?;
        }
        if self.columns.is_empty() {
            out.row_count = indices.len();
        }
        Ok(out)
    }

    /// Approximate heap footprint of all columns, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.columns.iter().map(|c| c.memory_bytes()).sum()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_ROWS: usize = 10;

        if self.columns.is_empty() {
            return write!(f, "Frame (0 rows x 0 columns)");
        }

        writeln!(
            f,
            "Frame ({} rows x {} columns):",
            self.row_count,
            self.columns.len()
        )?;

        write!(f, "{:<5} |", "idx")?;
        for name in &self.column_names {
            write!(f, " {:<15} |", name)?;
        }
        writeln!(f)?;

        write!(f, "{:-<5}-+", "")?;
        for _ in &self.column_names {
            write!(f, "-{:-<15}-+", "")?;
        }
        writeln!(f)?;

        let display_rows = std::cmp::min(self.row_count, MAX_ROWS);
        for i in 0..display_rows {
            write!(f, "{:<5} |", i)?;
            for column in &self.columns {
                let cell = column
                    .value(i)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| "?".to_string());
                write!(f, " {:<15} |", cell)?;
            }
            writeln!(f)?;
        }
        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Int64Column, StringColumn};

    fn sample_frame() -> Frame {
        Frame::from_columns(vec![
            (
                "tenure".to_string(),
                Column::Int64(Int64Column::new(vec![1, 24, 3])),
            ),
            (
                "contract".to_string(),
                Column::String(StringColumn::new(vec![
                    "monthly".to_string(),
                    "yearly".to_string(),
                    "monthly".to_string(),
                ])),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn add_column_enforces_row_count() {
        let mut frame = sample_frame();
        let err = frame.add_column(
            "bad",
            Column::Int64(Int64Column::new(vec![1, 2])),
        );
        assert!(matches!(
            err,
            Err(Error::InconsistentRowCount {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn add_column_rejects_duplicates() {
        let mut frame = sample_frame();
        let err = frame.add_column("tenure", Column::Int64(Int64Column::new(vec![0, 0, 0])));
        assert!(matches!(err, Err(Error::DuplicateColumnName(_))));
    }

    #[test]
    fn select_preserves_requested_order() {
        let frame = sample_frame();
        let out = frame
            .select(&["contract".to_string(), "tenure".to_string()])
            .unwrap();
        assert_eq!(out.column_names(), &["contract", "tenure"]);
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn take_reorders_rows() {
        let frame = sample_frame();
        let out = frame.take(&[2, 0]).unwrap();
        assert_eq!(out.row_count(), 2);
        let tenure = out.column("tenure").unwrap().as_int64().unwrap();
        assert_eq!(tenure.get(0).unwrap(), Some(3));
        assert_eq!(tenure.get(1).unwrap(), Some(1));
    }
}
