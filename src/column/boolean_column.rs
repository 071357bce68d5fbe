use crate::column::common::{build_null_mask, ColumnTrait, ColumnType};
use crate::error::{Error, Result};

/// Boolean column with an optional validity mask.
#[derive(Debug, Clone)]
pub struct BooleanColumn {
    pub(crate) data: Vec<bool>,
    pub(crate) nulls: Option<Vec<bool>>,
}

impl BooleanColumn {
    /// Creates a column with no nulls.
    pub fn new(data: Vec<bool>) -> Self {
        Self { data, nulls: None }
    }

    /// Creates a column with an explicit validity mask (`true` = null).
    pub fn with_nulls(data: Vec<bool>, nulls: Vec<bool>) -> Result<Self> {
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
    pub fn get(&self, index: usize) -> Result<Option<bool>> {
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
    pub fn non_null_values(&self) -> Vec<bool> {
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

    /// Most frequent non-null value; a tie reports `false`.
    pub fn mode(&self) -> Option<bool> {
        let values = self.non_null_values();
        if values.is_empty() {
            return None;
        }
        let trues = values.iter().filter(|&&v| v).count();
        Some(trues * 2 > values.len())
    }

    /// New column with every null replaced by `value`.
    pub fn fill_nulls(&self, value: bool) -> Self {
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
        self.data.len() + self.nulls.as_ref().map_or(0, |m| m.len())
    }
}

impl ColumnTrait for BooleanColumn {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Boolean
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
