//! Missing-value imputation (execution).
//!
//! Executes an explicit, validated imputation plan over the feature
//! columns of a frame. Nothing is inferred: the caller declares one
//! strategy per column kind, optional include/exclude filters and
//! per-column overrides, and the stage either executes exactly that or
//! fails before touching any data. The target column is never imputed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audit::{capture_snapshot, BeforeAfter};
use crate::column::{Column, ColumnTrait, ColumnType, Float64Column};
use crate::contract::Scope;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::value::DataValue;

/// Global strategy for numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericStrategy {
    Median,
    Mean,
    Constant,
}

/// Global strategy for categorical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalStrategy {
    MostFrequent,
    Constant,
}

/// Per-column override: a strict variant, so a constant override cannot
/// exist without its fill value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case", deny_unknown_fields)]
pub enum ColumnOverride {
    Median,
    Mean,
    MostFrequent,
    Constant { fill_value: DataValue },
}

/// Explicit imputation decision. No field is ever defaulted by the stage;
/// `constant` strategies must carry their fill value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImputationDecision {
    pub numeric_strategy: NumericStrategy,
    pub categorical_strategy: CategoricalStrategy,
    #[serde(default)]
    pub numeric_fill_value: Option<DataValue>,
    #[serde(default)]
    pub categorical_fill_value: Option<DataValue>,
    /// Restricts the column universe to these features, when present
    #[serde(default)]
    pub include_cols: Option<Vec<String>>,
    /// Features removed from the column universe
    #[serde(default)]
    pub exclude_cols: Vec<String>,
    /// Column-specific overrides of the global strategies
    #[serde(default)]
    pub per_column: BTreeMap<String, ColumnOverride>,
}

impl ImputationDecision {
    /// Builds a decision with only the two required global strategies.
    pub fn new(numeric: NumericStrategy, categorical: CategoricalStrategy) -> Self {
        Self {
            numeric_strategy: numeric,
            categorical_strategy: categorical,
            numeric_fill_value: None,
            categorical_fill_value: None,
            include_cols: None,
            exclude_cols: Vec::new(),
            per_column: BTreeMap::new(),
        }
    }

    /// Checks the internal consistency of the decision.
    pub fn validate(&self) -> Result<()> {
        if self.numeric_strategy == NumericStrategy::Constant && self.numeric_fill_value.is_none()
        {
            return Err(Error::DecisionValidation(
                "numeric_strategy 'constant' requires numeric_fill_value".to_string(),
            ));
        }
        if self.categorical_strategy == CategoricalStrategy::Constant
            && self.categorical_fill_value.is_none()
        {
            return Err(Error::DecisionValidation(
                "categorical_strategy 'constant' requires categorical_fill_value".to_string(),
            ));
        }
        if let Some(fill) = &self.numeric_fill_value {
            if fill.is_null() {
                return Err(Error::DecisionValidation(
                    "numeric_fill_value must not be null".to_string(),
                ));
            }
        }
        if let Some(fill) = &self.categorical_fill_value {
            if fill.is_null() {
                return Err(Error::DecisionValidation(
                    "categorical_fill_value must not be null".to_string(),
                ));
            }
        }
        if let Some(include) = &self.include_cols {
            if include.is_empty() {
                return Err(Error::DecisionValidation(
                    "include_cols must not be an empty list".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Column kind the imputer dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeKind {
    Numeric,
    Categorical,
}

/// Strategy resolved for one column, after overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedStrategy {
    Median,
    Mean,
    MostFrequent,
    Constant,
}

/// One resolved, immutable imputation decision for a single column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnImputationPlan {
    pub column: String,
    pub dtype: ColumnType,
    pub kind: ImputeKind,
    pub strategy: ResolvedStrategy,
    /// Declared constant, present only for `constant`
    pub fill_value: Option<DataValue>,
}

/// Audit row for one considered column (zero-impact columns included).
#[derive(Debug, Clone, Serialize)]
pub struct ImputationChange {
    pub column: String,
    pub dtype_before: ColumnType,
    /// Differs from `dtype_before` when an integer column was promoted to
    /// hold a fractional statistic
    pub dtype_after: ColumnType,
    pub kind: ImputeKind,
    pub strategy: ResolvedStrategy,
    pub fill_value_used: DataValue,
    pub missing_before: usize,
    pub missing_after: usize,
    pub imputed: usize,
    pub pct_imputed: f64,
}

/// Execution summary.
#[derive(Debug, Clone, Serialize)]
pub struct ImputationMeta {
    pub executed: bool,
    /// Why the stage did not execute, when it did not
    pub reason: Option<String>,
    pub total_imputed_cells: usize,
    pub affected_columns: usize,
    pub scoped_cols_considered: Vec<String>,
    pub excluded_cols_effective: Vec<String>,
    pub target_preserved: bool,
}

/// Stage output.
#[derive(Debug)]
pub struct ImputationOutcome {
    pub frame: Frame,
    /// Absent when the stage explicitly did not execute
    pub impact: Option<BeforeAfter>,
    pub changes: Vec<ImputationChange>,
    pub meta: ImputationMeta,
}

/// Executes the imputation decision over `frame`.
///
/// Without a scope the stage performs nothing and says why — silently
/// guessing which columns are features would defeat the audit trail. With
/// a scope, the column universe is `features ∩ (include_cols or features)
/// − exclude_cols`, restricted to columns present in the frame; the
/// target landing in that universe is a hard failure.
pub fn run_missing_imputation(
    frame: &Frame,
    scope: Option<&Scope>,
    decision: &ImputationDecision,
) -> Result<ImputationOutcome> {
    let scope = match scope {
        Some(scope) => scope,
        None => {
            log::warn!("imputation skipped: no scope supplied");
            return Ok(ImputationOutcome {
                frame: frame.clone(),
                impact: None,
                changes: Vec::new(),
                meta: ImputationMeta {
                    executed: false,
                    reason: Some(
                        "scope absent; imputation not executed to avoid silent inference"
                            .to_string(),
                    ),
                    total_imputed_cells: 0,
                    affected_columns: 0,
                    scoped_cols_considered: Vec::new(),
                    excluded_cols_effective: Vec::new(),
                    target_preserved: true,
                },
            });
        }
    };

    decision.validate()?;

    let scoped = resolve_universe(frame, scope, decision)?;
    let plans = build_plans(frame, &scoped, decision)?;

    let before = capture_snapshot(frame);
    let mut out = frame.clone();

    let mut changes: Vec<ImputationChange> = Vec::with_capacity(plans.len());
    let mut total_imputed = 0usize;
    let mut affected_columns = 0usize;

    for plan in &plans {
        let change = execute_plan(&mut out, plan)?;
        total_imputed += change.imputed;
        if change.imputed > 0 {
            affected_columns += 1;
        }
        changes.push(change);
    }

    let after = capture_snapshot(&out);

    log::info!(
        "imputation: {} columns considered, {} cells imputed across {} columns",
        scoped.len(),
        total_imputed,
        affected_columns
    );

    let excluded_effective: Vec<String> = {
        let mut cols: Vec<String> = decision
            .exclude_cols
            .iter()
            .filter(|c| frame.has_column(c))
            .cloned()
            .collect();
        cols.sort();
        cols
    };

    Ok(ImputationOutcome {
        frame: out,
        impact: Some(BeforeAfter::new(before, after)),
        changes,
        meta: ImputationMeta {
            executed: true,
            reason: None,
            total_imputed_cells: total_imputed,
            affected_columns,
            scoped_cols_considered: scoped,
            excluded_cols_effective: excluded_effective,
            target_preserved: true,
        },
    })
}

/// Resolves the column universe and rejects a target intrusion.
fn resolve_universe(
    frame: &Frame,
    scope: &Scope,
    decision: &ImputationDecision,
) -> Result<Vec<String>> {
    let intended: Vec<&String> = match &decision.include_cols {
        Some(include) => scope.features().iter().filter(|f| include.contains(f)).collect(),
        None => scope.features().iter().collect(),
    };
    let scoped: Vec<String> = intended
        .into_iter()
        .filter(|c| !decision.exclude_cols.contains(c) && frame.has_column(c))
        .cloned()
        .collect();

    if scoped.iter().any(|c| c == scope.target()) {
        return Err(Error::ScopeViolation(format!(
            "target '{}' must never be imputed",
            scope.target()
        )));
    }

    // Overrides for columns outside the resolved universe would silently
    // do nothing; reject them instead.
    for name in decision.per_column.keys() {
        if !scoped.contains(name) {
            return Err(Error::DecisionValidation(format!(
                "per_column override for '{}' does not match any column in the resolved universe",
                name
            )));
        }
    }

    Ok(scoped)
}

/// Builds one immutable plan per column in the universe.
fn build_plans(
    frame: &Frame,
    scoped: &[String],
    decision: &ImputationDecision,
) -> Result<Vec<ColumnImputationPlan>> {
    let mut plans = Vec::with_capacity(scoped.len());
    for name in scoped {
        let dtype = frame.column_type(name)?;
        let kind = if dtype.is_numeric() {
            ImputeKind::Numeric
        } else {
            ImputeKind::Categorical
        };

        let (strategy, fill_value) = match decision.per_column.get(name) {
            Some(ColumnOverride::Median) => (ResolvedStrategy::Median, None),
            Some(ColumnOverride::Mean) => (ResolvedStrategy::Mean, None),
            Some(ColumnOverride::MostFrequent) => (ResolvedStrategy::MostFrequent, None),
            Some(ColumnOverride::Constant { fill_value }) => {
                (ResolvedStrategy::Constant, Some(fill_value.clone()))
            }
            None => match kind {
                ImputeKind::Numeric => match decision.numeric_strategy {
                    NumericStrategy::Median => (ResolvedStrategy::Median, None),
                    NumericStrategy::Mean => (ResolvedStrategy::Mean, None),
                    NumericStrategy::Constant => (
                        ResolvedStrategy::Constant,
                        decision.numeric_fill_value.clone(),
                    ),
                },
                ImputeKind::Categorical => match decision.categorical_strategy {
                    CategoricalStrategy::MostFrequent => (ResolvedStrategy::MostFrequent, None),
                    CategoricalStrategy::Constant => (
                        ResolvedStrategy::Constant,
                        decision.categorical_fill_value.clone(),
                    ),
                },
            },
        };

        if matches!(
            strategy,
            ResolvedStrategy::Median | ResolvedStrategy::Mean
        ) && kind == ImputeKind::Categorical
        {
            return Err(Error::DecisionValidation(format!(
                "column '{}' is categorical; median/mean are not defined for it",
                name
            )));
        }

        plans.push(ColumnImputationPlan {
            column: name.clone(),
            dtype,
            kind,
            strategy,
            fill_value,
        });
    }
    Ok(plans)
}

/// Resolves the fill value and applies it where nulls existed.
fn execute_plan(frame: &mut Frame, plan: &ColumnImputationPlan) -> Result<ImputationChange> {
    let column = frame.column(&plan.column)?.clone();
    let missing_before = column.null_count();
    let row_count = column.len();

    let used_value = resolve_fill_value(&column, plan)?;

    let (filled, dtype_after) = if missing_before > 0 {
        fill_column(&column, &used_value, &plan.column)?
    } else {
        (column.clone(), column.column_type())
    };

    let missing_after = filled.null_count();
    let imputed = missing_before.saturating_sub(missing_after);
    let pct = if row_count == 0 {
        0.0
    } else {
        (imputed as f64 / row_count as f64) * 100.0
    };

    frame.replace_column(&plan.column, filled)?;

    Ok(ImputationChange {
        column: plan.column.clone(),
        dtype_before: plan.dtype,
        dtype_after,
        kind: plan.kind,
        strategy: plan.strategy,
        fill_value_used: used_value,
        missing_before,
        missing_after,
        imputed,
        pct_imputed: (pct * 100.0).round() / 100.0,
    })
}

/// Resolves what value the plan fills with.
///
/// A statistic-based strategy on a fully null column fails on purpose:
/// there is nothing to compute a statistic from, and inventing one would
/// be silent inference. The caller must declare an explicit constant.
fn resolve_fill_value(column: &Column, plan: &ColumnImputationPlan) -> Result<DataValue> {
    if plan.strategy == ResolvedStrategy::Constant {
        return plan.fill_value.clone().ok_or_else(|| {
            Error::DecisionValidation(format!(
                "constant strategy for column '{}' is missing its fill value",
                plan.column
            ))
        });
    }

    if column.null_count() == column.len() {
        return Err(Error::StatisticUndefined {
            column: plan.column.clone(),
        });
    }

    let value = match (plan.strategy, column) {
        (ResolvedStrategy::Median, Column::Int64(c)) => c.median().map(DataValue::Float64),
        (ResolvedStrategy::Median, Column::Float64(c)) => c.median().map(DataValue::Float64),
        (ResolvedStrategy::Mean, Column::Int64(c)) => c.mean().map(DataValue::Float64),
        (ResolvedStrategy::Mean, Column::Float64(c)) => c.mean().map(DataValue::Float64),
        (ResolvedStrategy::MostFrequent, Column::Int64(c)) => c.mode().map(DataValue::Int64),
        (ResolvedStrategy::MostFrequent, Column::Float64(c)) => c.mode().map(DataValue::Float64),
        (ResolvedStrategy::MostFrequent, Column::String(c)) => c.mode().map(DataValue::String),
        (ResolvedStrategy::MostFrequent, Column::Boolean(c)) => c.mode().map(DataValue::Boolean),
        (ResolvedStrategy::Median | ResolvedStrategy::Mean, _) => {
            return Err(Error::DecisionValidation(format!(
                "median/mean are not defined for column '{}'",
                plan.column
            )));
        }
        (ResolvedStrategy::Constant, _) => unreachable!("constant handled above"),
    };

    value.ok_or_else(|| Error::StatisticUndefined {
        column: plan.column.clone(),
    })
}

/// Fills the nulls of `column` with `value`, promoting an integer column
/// to Float64 when the value is fractional.
fn fill_column(column: &Column, value: &DataValue, name: &str) -> Result<(Column, ColumnType)> {
    match column {
        Column::Int64(c) => {
            let numeric = value.as_f64().ok_or_else(|| Error::InvalidValue(format!(
                "fill value {} is not numeric (column '{}')",
                value, name
            )))?;
            if numeric.fract() == 0.0 {
                let filled = c.fill_nulls(numeric as i64);
                Ok((Column::Int64(filled), ColumnType::Int64))
            } else {
                // Promote: an i64 column cannot hold 12.5
                let mut data = Vec::with_capacity(c.len());
                let mut nulls = Vec::with_capacity(c.len());
                for i in 0..c.len() {
                    match c.get(i)? {
                        Some(v) => {
                            data.push(v as f64);
                            nulls.push(false);
                        }
                        None => {
                            data.push(numeric);
                            nulls.push(false);
                        }
                    }
                }
                let promoted = Float64Column::with_nulls(data, nulls)?;
                Ok((Column::Float64(promoted), ColumnType::Float64))
            }
        }
        Column::Float64(c) => {
            let numeric = value.as_f64().ok_or_else(|| Error::InvalidValue(format!(
                "fill value {} is not numeric (column '{}')",
                value, name
            )))?;
            Ok((Column::Float64(c.fill_nulls(numeric)), ColumnType::Float64))
        }
        Column::String(c) => match value {
            DataValue::String(s) => Ok((Column::String(c.fill_nulls(s)), ColumnType::String)),
            other => Err(Error::InvalidValue(format!(
                "fill value {} is not a string (column '{}')",
                other, name
            ))),
        },
        Column::Boolean(c) => match value {
            DataValue::Boolean(b) => {
                Ok((Column::Boolean(c.fill_nulls(*b)), ColumnType::Boolean))
            }
            other => Err(Error::InvalidValue(format!(
                "fill value {} is not a boolean (column '{}')",
                other, name
            ))),
        },
    }
}
