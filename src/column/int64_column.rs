use crate::column::common::{build_null_mask, ColumnTrait, ColumnType};
use crate::error::{Error, Result};

/// Int64 column with an optional validity mask.
#[derive(Debug, Clone)]
pub struct Int64Column {
    pub(crate) data: Vec<i64>,
    pub(crate) nulls: Option<Vec<bool>>,
}

impl Int64Column {
    /// Creates a column with no nulls.
    pub fn new(data: Vec<i64>) -> Self {
        Self { data, nulls: None }
    }

    /// Creates a column with an explicit validity mask (`true` = null).
    ///
    /// Masked slots keep a placeholder in `data`; `nulls` must match the
    /// data length.
    pub fn with_nulls(data: Vec<i64>, nulls: Vec<bool>) -> Result<Self> {
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
    pub fn get(&self, index: usize) -> Result<Option<i64>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }
        if self.is_null(index) {
            return Ok(None);
        }
        Ok(Some(self.data[index]))
    }

    /// Non-null values in row order.
    pub fn non_null_values(&self) -> Vec<i64> {
        match &self.nulls {
            None => self.data.clone(),
            Some(mask) => self
                .data
                .iter()
                .zip(mask.iter())
                .filter(|(_, &is_null)| !is_null)
                .map(|(&v, _)| v)
                .collect(),
        }
    }

    /// Mean of the non-null values.
    pub fn mean(&self) -> Option<f64> {
        let values = self.non_null_values();
        if values.is_empty() {
            return None;
        }
        let sum: i64 = values.iter().sum();
        Some(sum as f64 / values.len() as f64)
    }

    /// Median of the non-null values (midpoint average on even counts).
    pub fn median(&self) -> Option<f64> {
        let mut values = self.non_null_values();
        if values.is_empty() {
            return None;
        }
        values.sort_unstable();
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Some(values[mid] as f64)
        } else {
            Some((values[mid - 1] as f64 + values[mid] as f64) / 2.0)
        }
    }

    /// Most frequent non-null value; ties break toward the smallest value.
    pub fn mode(&self) -> Option<i64> {
        let mut values = self.non_null_values();
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
        Some(best)
    }

    /// New column with every null replaced by `value`.
    pub fn fill_nulls(&self, value: i64) -> Self {
        match &self.nulls {
            None => self.clone(),
            Some(mask) => {
                let data = self
                    .data
                    .iter()
                    .zip(mask.iter())
                    .map(|(&v, &is_null)| if is_null { value } else { v })
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
            data.push(self.data[i]);
            nulls.push(self.is_null(i));
        }
        Self::with_nulls(data, nulls)
    }

    /// Approximate heap footprint in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<i64>()
            + self.nulls.as_ref().map_or(0, |m| m.len())
    }
}

impl ColumnTrait for Int64Column {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Int64
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
