//! Inference-time record bridge.
//!
//! The serving layer receives one record at a time and must produce the
//! exact feature vector the model was trained on. The bridge therefore
//! reuses the persisted [`FittedTransformer`] from the representation
//! stage — never a freshly fitted one — and takes an explicit policy for
//! record fields that are absent, instead of silently defaulting them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::column::{Column, Float64Column, StringColumn};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::prep::FittedTransformer;
use crate::value::DataValue;

/// What to do when an input record lacks a feature the transformer
/// expects. There is deliberately no default: the caller must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Reject the record
    Fail,
    /// Encode the field as missing (all-zero one-hot / 0.0 numeric) and
    /// log a warning per filled field
    ZeroFill,
}

/// Bridge from a single external record to a model-ready feature vector.
#[derive(Debug, Clone)]
pub struct InferenceBridge {
    transformer: FittedTransformer,
    policy: MissingFieldPolicy,
}

impl InferenceBridge {
    /// Builds a bridge around a persisted transformer.
    pub fn new(transformer: FittedTransformer, policy: MissingFieldPolicy) -> Self {
        Self {
            transformer,
            policy,
        }
    }

    /// The transformer this bridge serves with.
    pub fn transformer(&self) -> &FittedTransformer {
        &self.transformer
    }

    /// Output feature names, in order.
    pub fn feature_names(&self) -> &[String] {
        self.transformer.feature_names()
    }

    /// Transforms one record into the model feature vector.
    ///
    /// The record maps input column names to values. Unknown extra keys
    /// are rejected; missing expected keys follow the configured policy.
    pub fn transform_record(&self, record: &BTreeMap<String, DataValue>) -> Result<Vec<f64>> {
        let expected = self.transformer.input_columns();

        for key in record.keys() {
            if !expected.iter().any(|c| *c == key.as_str()) {
                return Err(Error::InvalidValue(format!(
                    "record field '{}' is not a model input column",
                    key
                )));
            }
        }

        let mut frame = Frame::new();
        for name in &expected {
            let value = match record.get(*name) {
                Some(value) => value.clone(),
                None => match self.policy {
                    MissingFieldPolicy::Fail => {
                        return Err(Error::Coverage(format!(
                            "record is missing the input column '{}'",
                            name
                        )));
                    }
                    MissingFieldPolicy::ZeroFill => {
                        log::warn!(
                            "record missing input column '{}'; zero-filling by policy",
                            name
                        );
                        DataValue::Null
                    }
                },
            };
            frame.add_column((*name).to_string(), single_cell_column(&value))?;
        }

        let encoded = self.transformer.transform(&frame)?;
        let mut out = Vec::with_capacity(encoded.column_count());
        for name in encoded.column_names() {
            let value = encoded.column(name)?.value(0)?;
            out.push(value.as_f64().unwrap_or(0.0));
        }
        Ok(out)
    }
}

/// Wraps one value into a single-row column of the matching type.
fn single_cell_column(value: &DataValue) -> Column {
    match value {
        DataValue::Null => {
            Column::String(StringColumn::from_options(vec![None]))
        }
        DataValue::String(s) => Column::String(StringColumn::new(vec![s.clone()])),
        DataValue::Int64(v) => Column::Float64(Float64Column::new(vec![*v as f64])),
        DataValue::Float64(v) => Column::Float64(Float64Column::new(vec![*v])),
        DataValue::Boolean(b) => {
            Column::Float64(Float64Column::new(vec![if *b { 1.0 } else { 0.0 }]))
        }
    }
}
