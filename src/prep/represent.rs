//! Supervised representation (execution).
//!
//! Turns the split partitions into a model-ready numeric representation:
//! one-hot encoding for categorical features, passthrough or standard
//! scaling for numeric ones, and an explicit mapping for the target. The
//! transformer is fitted exclusively on the training partition and then
//! applied, unchanged, to both partitions — fitting anything on test data
//! is the leakage this stage exists to prevent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnType, Float64Column, Int64Column};
use crate::contract::Scope;
use crate::error::{Error, Result};
use crate::frame::Frame;

use super::split::{PartitionShape, TrainTestSplit};

/// Categorical feature encoding. Only one-hot is supported; the variant
/// exists so the decision stays explicit and extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalEncoding {
    Onehot,
}

/// Policy for categories unseen during fitting. `Ignore` encodes them as
/// an all-zero row instead of failing at inference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    Ignore,
}

/// Numeric feature representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericEncoding {
    Passthrough,
    StandardScaler,
}

/// Target representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetEncoding {
    MapBinary,
    Passthrough,
}

/// Categorical half of the X decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoricalDecision {
    pub strategy: CategoricalEncoding,
    pub handle_unknown: UnknownCategoryPolicy,
}

/// Numeric half of the X decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericDecision {
    pub strategy: NumericEncoding,
}

/// Feature (X) representation decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureDecision {
    pub categorical: CategoricalDecision,
    pub numeric: NumericDecision,
}

/// Target (y) representation decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDecision {
    pub strategy: TargetEncoding,
    /// Required (non-empty) for `map_binary`; must be absent otherwise
    #[serde(default)]
    pub mapping: Option<BTreeMap<String, i64>>,
}

/// Full explicit representation decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepresentationDecision {
    pub x: FeatureDecision,
    pub y: TargetDecision,
}

impl RepresentationDecision {
    /// Checks the internal consistency of the decision.
    pub fn validate(&self) -> Result<()> {
        match self.y.strategy {
            TargetEncoding::MapBinary => match &self.y.mapping {
                None => Err(Error::DecisionValidation(
                    "y strategy 'map_binary' requires a mapping".to_string(),
                )),
                Some(mapping) if mapping.is_empty() => Err(Error::DecisionValidation(
                    "y mapping must not be empty".to_string(),
                )),
                Some(_) => Ok(()),
            },
            TargetEncoding::Passthrough => {
                if self.y.mapping.is_some() {
                    Err(Error::DecisionValidation(
                        "y mapping must be absent when the strategy is 'passthrough'".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Column roles inferred from dtypes (diagnostic, not a decision):
/// boolean and numeric columns are numeric, everything else categorical.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRoles {
    pub categorical: Vec<String>,
    pub numeric: Vec<String>,
}

/// Fitted per-column encoding state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum FittedColumn {
    /// One-hot over the categories observed in training, sorted
    Categorical {
        column: String,
        categories: Vec<String>,
    },
    /// Numeric passthrough, or standard scaling with train statistics
    Numeric {
        column: String,
        scaler: Option<ScalerParams>,
    },
}

/// Train-fitted scaling statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Encoder fitted on the training partition only.
///
/// The fitted state is a function of `X_train` alone. Callers persist this
/// exact object for inference-time use; refitting it on new data is a
/// correctness bug, not a style choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformer {
    columns: Vec<FittedColumn>,
    feature_names: Vec<String>,
}

impl FittedTransformer {
    /// Fits the transformer on the training partition.
    fn fit(x_train: &Frame, scope: &Scope, decision: &RepresentationDecision) -> Result<Self> {
        let mut columns = Vec::with_capacity(scope.features().len());
        let mut feature_names = Vec::new();

        for name in scope.features() {
            let column = x_train.column(name)?;
            if is_numeric_role(column.column_type()) {
                let scaler = match decision.x.numeric.strategy {
                    NumericEncoding::Passthrough => None,
                    NumericEncoding::StandardScaler => {
                        Some(fit_scaler(column, name)?)
                    }
                };
                feature_names.push(name.clone());
                columns.push(FittedColumn::Numeric {
                    column: name.clone(),
                    scaler,
                });
            } else {
                let mut categories: BTreeSet<String> = BTreeSet::new();
                for i in 0..column.len() {
                    let value = column.value(i)?;
                    if !value.is_null() {
                        categories.insert(value.to_string());
                    }
                }
                if categories.is_empty() {
                    return Err(Error::InvalidValue(format!(
                        "categorical column '{}' has no non-null training values to encode",
                        name
                    )));
                }
                let categories: Vec<String> = categories.into_iter().collect();
                for category in &categories {
                    feature_names.push(format!("{}_{}", name, category));
                }
                columns.push(FittedColumn::Categorical {
                    column: name.clone(),
                    categories,
                });
            }
        }

        Ok(Self {
            columns,
            feature_names,
        })
    }

    /// Output feature names, in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Input columns the transformer expects, in order.
    pub fn input_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| match c {
                FittedColumn::Categorical { column, .. } => column.as_str(),
                FittedColumn::Numeric { column, .. } => column.as_str(),
            })
            .collect()
    }

    /// Applies the fitted encoding to `x`, producing an all-Float64 frame
    /// with one column per output feature name. The transformer itself is
    /// never modified.
    pub fn transform(&self, x: &Frame) -> Result<Frame> {
        let n_rows = x.row_count();
        let mut out = Frame::new();

        for fitted in &self.columns {
            match fitted {
                FittedColumn::Categorical { column, categories } => {
                    let input = x.column(column)?;
                    let mut encoded: Vec<Vec<f64>> =
                        vec![vec![0.0; n_rows]; categories.len()];
                    for row in 0..n_rows {
                        let value = input.value(row)?;
                        if value.is_null() {
                            continue;
                        }
                        let token = value.to_string();
                        // Unknown categories keep the all-zero row
                        if let Ok(pos) = categories.binary_search(&token) {
                            encoded[pos][row] = 1.0;
                        }
                    }
                    for (category, data) in categories.iter().zip(encoded) {
                        out.add_column(
                            format!("{}_{}", column, category),
                            Column::Float64(Float64Column::new(data)),
                        )?;
                    }
                }
                FittedColumn::Numeric { column, scaler } => {
                    let input = x.column(column)?;
                    let mut data = Vec::with_capacity(n_rows);
                    let mut nulls = Vec::with_capacity(n_rows);
                    for row in 0..n_rows {
                        match input.value(row)?.as_f64() {
                            Some(v) => {
                                let v = match scaler {
                                    Some(params) if params.std > 0.0 => {
                                        (v - params.mean) / params.std
                                    }
                                    Some(_) => 0.0,
                                    None => v,
                                };
                                data.push(v);
                                nulls.push(false);
                            }
                            None => {
                                data.push(0.0);
                                nulls.push(true);
                            }
                        }
                    }
                    out.add_column(
                        column.clone(),
                        Column::Float64(Float64Column::with_nulls(data, nulls)?),
                    )?;
                }
            }
        }

        Ok(out)
    }
}

/// Model-ready dataset plus the objects inference needs.
#[derive(Debug)]
pub struct Representation {
    pub x_train: Frame,
    pub x_test: Frame,
    pub y_train: Column,
    pub y_test: Column,
    pub feature_names: Vec<String>,
    pub transformer: FittedTransformer,
    pub target_mapping: Option<BTreeMap<String, i64>>,
}

/// Shapes of all four partitions.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeSet {
    pub x_train: PartitionShape,
    pub x_test: PartitionShape,
    pub y_train_rows: usize,
    pub y_test_rows: usize,
}

/// Train/test structural equality after transformation. Both booleans
/// must be true; a mismatch is a transformer bug.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrainTestConsistency {
    pub same_feature_count: bool,
    pub feature_names_match: bool,
}

/// Post-transform null totals; non-zero numbers point at unimputed input.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MissingAfter {
    pub train_total_nulls: usize,
    pub test_total_nulls: usize,
}

/// Stage diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct RepresentationDiagnostics {
    pub column_roles: ColumnRoles,
    pub shapes_before: ShapeSet,
    pub shapes_after: ShapeSet,
    pub n_features_before: usize,
    pub n_features_after: usize,
    /// Always "train_only"; recorded so the audit trail states it
    pub fit_on: String,
    pub train_test_consistency: TrainTestConsistency,
    pub x_missing_after: MissingAfter,
}

/// Stage output.
#[derive(Debug)]
pub struct RepresentationOutcome {
    pub representation: Representation,
    pub diagnostics: RepresentationDiagnostics,
}

/// Executes the representation decision over a split.
pub fn run_supervised_representation(
    split: &TrainTestSplit,
    scope: &Scope,
    decision: &RepresentationDecision,
) -> Result<RepresentationOutcome> {
    validate_split_against_scope(split, scope)?;
    decision.validate()?;

    let roles = infer_column_roles(&split.x_train, scope)?;

    // Fit only on train (anti-leakage), transform both with the result
    let transformer = FittedTransformer::fit(&split.x_train, scope, decision)?;
    let x_train_repr = transformer.transform(&split.x_train)?;
    let x_test_repr = transformer.transform(&split.x_test)?;

    let (y_train_repr, y_test_repr, target_mapping) =
        represent_target(&split.y_train, &split.y_test, decision)?;

    let shapes_before = ShapeSet {
        x_train: shape_of(&split.x_train),
        x_test: shape_of(&split.x_test),
        y_train_rows: split.y_train.len(),
        y_test_rows: split.y_test.len(),
    };
    let shapes_after = ShapeSet {
        x_train: shape_of(&x_train_repr),
        x_test: shape_of(&x_test_repr),
        y_train_rows: y_train_repr.len(),
        y_test_rows: y_test_repr.len(),
    };

    let consistency = TrainTestConsistency {
        same_feature_count: x_train_repr.column_count() == x_test_repr.column_count(),
        feature_names_match: x_train_repr.column_names() == x_test_repr.column_names(),
    };
    let missing_after = MissingAfter {
        train_total_nulls: total_nulls(&x_train_repr),
        test_total_nulls: total_nulls(&x_test_repr),
    };

    log::info!(
        "representation: {} input features -> {} encoded features (fit on train only)",
        scope.features().len(),
        transformer.feature_names().len()
    );

    let diagnostics = RepresentationDiagnostics {
        column_roles: roles,
        n_features_before: shapes_before.x_train.cols,
        n_features_after: shapes_after.x_train.cols,
        shapes_before,
        shapes_after,
        fit_on: "train_only".to_string(),
        train_test_consistency: consistency,
        x_missing_after: missing_after,
    };

    let feature_names = transformer.feature_names().to_vec();
    Ok(RepresentationOutcome {
        representation: Representation {
            x_train: x_train_repr,
            x_test: x_test_repr,
            y_train: y_train_repr,
            y_test: y_test_repr,
            feature_names,
            transformer,
            target_mapping,
        },
        diagnostics,
    })
}

/// Fails early when the split no longer matches the scope contract.
fn validate_split_against_scope(split: &TrainTestSplit, scope: &Scope) -> Result<()> {
    let expected: &[String] = scope.features();
    if split.x_train.column_names() != expected {
        return Err(Error::ScopeViolation(format!(
            "X_train columns are not aligned with the scope features: expected {:?}, got {:?}",
            expected,
            split.x_train.column_names()
        )));
    }
    if split.x_test.column_names() != expected {
        return Err(Error::ScopeViolation(format!(
            "X_test columns are not aligned with the scope features: expected {:?}, got {:?}",
            expected,
            split.x_test.column_names()
        )));
    }
    if split.x_train.row_count() != split.y_train.len() {
        return Err(Error::InconsistentRowCount {
            expected: split.x_train.row_count(),
            found: split.y_train.len(),
        });
    }
    if split.x_test.row_count() != split.y_test.len() {
        return Err(Error::InconsistentRowCount {
            expected: split.x_test.row_count(),
            found: split.y_test.len(),
        });
    }
    Ok(())
}

/// Boolean and numeric dtypes play the numeric role; the rest are
/// categorical.
fn infer_column_roles(x_train: &Frame, scope: &Scope) -> Result<ColumnRoles> {
    let mut categorical = Vec::new();
    let mut numeric = Vec::new();
    for name in scope.features() {
        if is_numeric_role(x_train.column_type(name)?) {
            numeric.push(name.clone());
        } else {
            categorical.push(name.clone());
        }
    }
    Ok(ColumnRoles {
        categorical,
        numeric,
    })
}

fn is_numeric_role(dtype: ColumnType) -> bool {
    matches!(
        dtype,
        ColumnType::Int64 | ColumnType::Float64 | ColumnType::Boolean
    )
}

/// Train-only mean/std for the standard scaler.
fn fit_scaler(column: &Column, name: &str) -> Result<ScalerParams> {
    let mut values = Vec::with_capacity(column.len());
    for i in 0..column.len() {
        if let Some(v) = column.value(i)?.as_f64() {
            values.push(v);
        }
    }
    if values.is_empty() {
        return Err(Error::StatisticUndefined {
            column: name.to_string(),
        });
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(ScalerParams {
        mean,
        std: var.sqrt(),
    })
}

/// Applies the target decision to both y partitions.
///
/// Coverage is checked over train and test combined before anything is
/// mapped: an unmapped value would otherwise silently become null.
fn represent_target(
    y_train: &Column,
    y_test: &Column,
    decision: &RepresentationDecision,
) -> Result<(Column, Column, Option<BTreeMap<String, i64>>)> {
    match decision.y.strategy {
        TargetEncoding::Passthrough => Ok((y_train.clone(), y_test.clone(), None)),
        TargetEncoding::MapBinary => {
            let mapping = decision.y.mapping.as_ref().ok_or_else(|| {
                Error::DecisionValidation(
                    "y strategy 'map_binary' requires a mapping".to_string(),
                )
            })?;

            let mut observed: BTreeSet<String> = BTreeSet::new();
            let mut null_rows = 0usize;
            for column in [y_train, y_test] {
                for i in 0..column.len() {
                    let value = column.value(i)?;
                    if value.is_null() {
                        null_rows += 1;
                    } else {
                        observed.insert(value.to_string());
                    }
                }
            }
            if null_rows > 0 {
                return Err(Error::Coverage(format!(
                    "target has {} missing value(s); map_binary cannot encode nulls",
                    null_rows
                )));
            }
            let unmapped: Vec<&String> =
                observed.iter().filter(|v| !mapping.contains_key(*v)).collect();
            if !unmapped.is_empty() {
                return Err(Error::Coverage(format!(
                    "y mapping does not cover observed target values: {:?}",
                    unmapped
                )));
            }

            let map_column = |column: &Column| -> Result<Column> {
                let mut data = Vec::with_capacity(column.len());
                for i in 0..column.len() {
                    let token = column.value(i)?.to_string();
                    // Coverage was verified above
                    let encoded = mapping.get(&token).copied().ok_or_else(|| {
                        Error::Coverage(format!("unmapped target value '{}'", token))
                    })?;
                    data.push(encoded);
                }
                Ok(Column::Int64(Int64Column::new(data)))
            };

            Ok((
                map_column(y_train)?,
                map_column(y_test)?,
                Some(mapping.clone()),
            ))
        }
    }
}

fn shape_of(frame: &Frame) -> PartitionShape {
    PartitionShape {
        rows: frame.row_count(),
        cols: frame.column_count(),
    }
}

fn total_nulls(frame: &Frame) -> usize {
    frame
        .column_names()
        .iter()
        .filter_map(|name| frame.column(name).ok())
        .map(|c| c.null_count())
        .sum()
}
