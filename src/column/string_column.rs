use crate::column::common::{build_null_mask, ColumnTrait, ColumnType};
use crate::error::{Error, Result};

/// String column with an optional validity mask.
///
/// Masked slots keep an empty placeholder string; consumers only see them
/// through `get`, which reports None.
#[derive(Debug, Clone)]
pub struct StringColumn {
    pub(crate) data: Vec<String>,
    pub(crate) nulls: Option<Vec<bool>>,
}

impl StringColumn {
    /// Creates a column with no nulls.
    pub fn new(data: Vec<String>) -> Self {
        Self { data, nulls: None }
    }

    /// Creates a column directly from optional values.
    pub fn from_options(values: Vec<Option<String>>) -> Self {
        let nulls: Vec<bool> = values.iter().map(|v| v.is_none()).collect();
        let data = values.into_iter().map(|v| v.unwrap_or_default()).collect();
        Self {
            data,
            nulls: build_null_mask(&nulls),
        }
    }

    /// Creates a column with an explicit validity mask (`true` = null).
    pub fn with_nulls(data: Vec<String>, nulls: Vec<bool>) -> Result<Self> {
        if data.len() != nulls.len() {
            return Err(Error::InconsistentRowCount {
                expected: data.len(),
                found: nulls.len(),
            });
        }
        let nulls = build_null_mask(&nulls);
        Ok(Self { data, nulls })
    }

    /// Cell at `index`, None when null.
    pub fn get(&self, index: usize) -> Result<Option<&str>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }
        if self.is_null(index) {
            return Ok(None);
        }
        Ok(Some(self.data[index].as_str()))
    }

    /// Non-null values in row order.
    pub fn non_null_values(&self) -> Vec<&str> {
        match &self.nulls {
            None => self.data.iter().map(|s| s.as_str()).collect(),
            Some(mask) => self
                .data
                .iter()
                .zip(mask.iter())
                .filter(|(_, &is_null)| !is_null)
                .map(|(s, _)| s.as_str())
                .collect(),
        }
    }

    /// Distinct non-null values in first-appearance order.
    pub fn distinct_non_null(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for v in self.non_null_values() {
            if seen.insert(v.to_string()) {
                out.push(v.to_string());
            }
        }
        out
    }

    /// Most frequent non-null value; ties break lexicographically.
    pub fn mode(&self) -> Option<String> {
        let mut values: Vec<&str> = self.non_null_values();
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        let mut best = values[0];
        let mut best_count = 0usize;
        let mut i = 0;
        while i < values.len() {
            let mut j = i;
            while j < values.len() && values[j] == values[i] {
                j += 1;
            }
            if j - i > best_count {
                best_count = j - i;
                best = values[i];
            }
            i = j;
        }
        Some(best.to_string())
    }

    /// New column with every null replaced by `value`.
    pub fn fill_nulls(&self, value: &str) -> Self {
        match &self.nulls {
            None => self.clone(),
            Some(mask) => {
                let data = self
                    .data
                    .iter()
                    .zip(mask.iter())
                    .map(|(v, &is_null)| {
                        if is_null {
                            value.to_string()
                        } else {
                            v.clone()
                        }
                    })
                    .collect();
                Self { data, nulls: None }
            }
        }
    }

    /// New column holding the cells at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(indices.len());
        let mut nulls = Vec::with_capacity(indices.len());
        for &i in indices {
            if i >= self.data.len() {
                return Err(Error::IndexOutOfBounds {
                    index: i,
                    size: self.data.len(),
                });
            }
            data.push(self.data[i].clone());
            nulls.push(self.is_null(i));
        }
        Self::with_nulls(data, nulls)
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data
            .iter()
            .map(|s| s.len() + std::mem::size_of::<String>())
            .sum::<usize>()
            + self.nulls.as_ref().map_or(0, |m| m.len())
    }
}

impl ColumnTrait for StringColumn {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::String
    }

    fn null_count(&self) -> usize {
        self.nulls
            .as_ref()
            .map_or(0, |m| m.iter().filter(|&&n| n).count())
    }

    fn is_null(&self, index: usize) -> bool {
        self.nulls
            .as_ref()
            .map_or(false, |m| m.get(index).copied().unwrap_or(false))
    }
}
