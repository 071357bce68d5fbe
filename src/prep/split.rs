//! Train/test split preparation (execution).
//!
//! Materializes a fully explicit split decision: X/y separation per the
//! declared scope, a deterministic seeded partition, and post-split
//! diagnostics that measure — never interpret — what the split did.
//! Every parameter comes from the decision; nothing is defaulted.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnType};
use crate::contract::Scope;
use crate::error::{Error, Result};
use crate::frame::Frame;

/// Requested test partition size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestSize {
    /// Absolute number of test rows (>= 1)
    Count(usize),
    /// Fraction of rows in (0, 1), rounded up
    Fraction(f64),
}

/// Explicit split decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitDecision {
    pub test_size: TestSize,
    pub random_state: u64,
    pub shuffle: bool,
    pub stratify: bool,
    /// Required when `stratify`, and must name the scope target; must be
    /// absent otherwise
    #[serde(default)]
    pub stratify_col: Option<String>,
    /// Enables the optional categorical-cardinality audit
    #[serde(default)]
    pub audit_categorical_cardinality: bool,
}

/// The four partitions, with X columns in declared feature order.
#[derive(Debug)]
pub struct TrainTestSplit {
    pub x_train: Frame,
    pub x_test: Frame,
    pub y_train: Column,
    pub y_test: Column,
}

/// Row/column shape of one X partition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PartitionShape {
    pub rows: usize,
    pub cols: usize,
}

/// Structural shapes of all four partitions.
#[derive(Debug, Clone, Serialize)]
pub struct SplitShapes {
    pub x_train: PartitionShape,
    pub x_test: PartitionShape,
    pub y_train_rows: usize,
    pub y_test_rows: usize,
    pub n_features: usize,
}

/// Target distribution comparison, one row per class (nulls included).
#[derive(Debug, Clone, Serialize)]
pub struct ClassDistributionRow {
    pub class: String,
    pub count_all: usize,
    pub rate_all: f64,
    pub count_train: usize,
    pub rate_train: f64,
    pub count_test: usize,
    pub rate_test: f64,
    pub delta_rate_train_vs_all: f64,
    pub delta_rate_test_vs_all: f64,
}

/// Scope integrity booleans; the target booleans must be false and the
/// column-match booleans true in any healthy split.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScopeIntegrity {
    pub target_in_x_train: bool,
    pub target_in_x_test: bool,
    pub columns_match_scope_train: bool,
    pub columns_match_scope_test: bool,
}

/// Minimum class rates; low values flag imbalance without correcting it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TargetBalance {
    pub min_class_rate_all: f64,
    pub min_class_rate_train: f64,
    pub min_class_rate_test: f64,
}

/// Objective post-split risk measurements.
#[derive(Debug, Clone, Serialize)]
pub struct RiskChecks {
    pub scope_integrity: ScopeIntegrity,
    pub target_balance: TargetBalance,
}

/// Train/test category comparison for one string feature.
#[derive(Debug, Clone, Serialize)]
pub struct CardinalityRow {
    pub feature: String,
    pub n_unique_train: usize,
    pub n_unique_test: usize,
    /// Categories seen only in the test partition (future encoding risk)
    pub n_only_in_test: usize,
    pub n_only_in_train: usize,
}

/// All post-split diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SplitDiagnostics {
    pub shapes: SplitShapes,
    pub target_distribution: Vec<ClassDistributionRow>,
    pub risk_checks: RiskChecks,
    /// Present only when the decision asked for it
    pub categorical_cardinality: Option<Vec<CardinalityRow>>,
}

/// Stage output.
#[derive(Debug)]
pub struct SplitOutcome {
    pub split: TrainTestSplit,
    pub diagnostics: SplitDiagnostics,
}

/// Executes the split decision over `frame`.
///
/// All validation happens before any partitioning work. Repeated calls
/// with the same frame and decision produce identical row partitions.
pub fn run_train_test_split(
    frame: &Frame,
    scope: &Scope,
    decision: &SplitDecision,
) -> Result<SplitOutcome> {
    validate_scope_against_frame(frame, scope)?;
    validate_decision(decision, scope)?;

    let n_rows = frame.row_count();
    let n_test = resolve_test_rows(decision.test_size, n_rows)?;

    let y_all = frame.column(scope.target())?.clone();
    let (train_indices, test_indices) = if decision.stratify {
        stratified_partition(&y_all, n_test, decision.random_state)?
    } else {
        plain_partition(n_rows, n_test, decision.shuffle, decision.random_state)
    };

    let x = frame.select(scope.features())?;
    let x_train = x.take(&train_indices)?;
    let x_test = x.take(&test_indices)?;
    let y_train = y_all.take(&train_indices)?;
    let y_test = y_all.take(&test_indices)?;

    log::info!(
        "train/test split: {} train rows, {} test rows (seed {}, shuffle {}, stratify {})",
        train_indices.len(),
        test_indices.len(),
        decision.random_state,
        decision.shuffle,
        decision.stratify
    );

    let shapes = SplitShapes {
        x_train: PartitionShape {
            rows: x_train.row_count(),
            cols: x_train.column_count(),
        },
        x_test: PartitionShape {
            rows: x_test.row_count(),
            cols: x_test.column_count(),
        },
        y_train_rows: y_train.len(),
        y_test_rows: y_test.len(),
        n_features: scope.features().len(),
    };

    let target_distribution = build_target_distribution(&y_all, &y_train, &y_test)?;
    let risk_checks = build_risk_checks(&x_train, &x_test, &y_train, &y_test, scope)?;
    let categorical_cardinality = if decision.audit_categorical_cardinality {
        Some(build_categorical_cardinality(&x_train, &x_test)?)
    } else {
        None
    };

    Ok(SplitOutcome {
        split: TrainTestSplit {
            x_train,
            x_test,
            y_train,
            y_test,
        },
        diagnostics: SplitDiagnostics {
            shapes,
            target_distribution,
            risk_checks,
            categorical_cardinality,
        },
    })
}

/// Checks that the scope matches the frame before any work happens.
fn validate_scope_against_frame(frame: &Frame, scope: &Scope) -> Result<()> {
    let missing: Vec<&String> = scope
        .features()
        .iter()
        .filter(|f| !frame.has_column(f))
        .collect();
    if !missing.is_empty() {
        return Err(Error::ScopeViolation(format!(
            "scope features absent from the frame: {:?}",
            missing
        )));
    }
    if !frame.has_column(scope.target()) {
        return Err(Error::ScopeViolation(format!(
            "target '{}' absent from the frame",
            scope.target()
        )));
    }
    Ok(())
}

/// Validates the decision against the scope (fail fast, no defaults).
fn validate_decision(decision: &SplitDecision, scope: &Scope) -> Result<()> {
    match decision.test_size {
        TestSize::Fraction(f) => {
            if !(f > 0.0 && f < 1.0) {
                return Err(Error::DecisionValidation(format!(
                    "test_size fraction must be in (0, 1) exclusive, got {}",
                    f
                )));
            }
        }
        TestSize::Count(c) => {
            if c < 1 {
                return Err(Error::DecisionValidation(
                    "test_size count must be >= 1".to_string(),
                ));
            }
        }
    }

    if decision.stratify {
        let col = decision.stratify_col.as_deref().ok_or_else(|| {
            Error::DecisionValidation(
                "stratify_col is required when stratify is true".to_string(),
            )
        })?;
        if col != scope.target() {
            // Stratification is permitted only on the target
            return Err(Error::DecisionValidation(format!(
                "stratify_col must equal the scope target '{}', got '{}'",
                scope.target(),
                col
            )));
        }
        if !decision.shuffle {
            return Err(Error::DecisionValidation(
                "stratified splitting requires shuffle = true".to_string(),
            ));
        }
    } else if decision.stratify_col.is_some() {
        return Err(Error::DecisionValidation(
            "stratify_col must be absent when stratify is false".to_string(),
        ));
    }

    Ok(())
}

/// Resolves the number of test rows and bounds-checks it.
fn resolve_test_rows(test_size: TestSize, n_rows: usize) -> Result<usize> {
    let n_test = match test_size {
        TestSize::Fraction(f) => (f * n_rows as f64).ceil() as usize,
        TestSize::Count(c) => c,
    };
    if n_test < 1 || n_test >= n_rows {
        return Err(Error::DecisionValidation(format!(
            "test partition of {} rows is not valid for a table of {} rows",
            n_test, n_rows
        )));
    }
    Ok(n_test)
}

/// Unstratified partition. Without shuffling the leading rows train and
/// the trailing rows test; with shuffling a seeded permutation is drawn
/// and the test partition takes its head.
fn plain_partition(
    n_rows: usize,
    n_test: usize,
    shuffle: bool,
    random_state: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    if shuffle {
        let mut rng = StdRng::seed_from_u64(random_state);
        indices.shuffle(&mut rng);
        let test = indices[..n_test].to_vec();
        let train = indices[n_test..].to_vec();
        (train, test)
    } else {
        let train = indices[..n_rows - n_test].to_vec();
        let test = indices.split_off(n_rows - n_test);
        (train, test)
    }
}

/// Stratified partition: per-class test allocation by largest remainder,
/// seeded shuffling inside each class and across the final partitions.
fn stratified_partition(
    y: &Column,
    n_test: usize,
    random_state: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_rows = y.len();
    let mut rng = StdRng::seed_from_u64(random_state);

    // Classes in first-appearance order, so iteration order never depends
    // on hashing
    let mut class_order: Vec<String> = Vec::new();
    let mut class_indices: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for i in 0..n_rows {
        let key = y.value(i)?.to_string();
        if !class_indices.contains_key(&key) {
            class_order.push(key.clone());
        }
        class_indices.entry(key).or_default().push(i);
    }

    for class in &class_order {
        let count = class_indices[class].len();
        if count < 2 {
            return Err(Error::DecisionValidation(format!(
                "stratified splitting needs at least 2 rows per class; class '{}' has {}",
                class, count
            )));
        }
    }

    // Largest-remainder allocation of the test rows across classes
    let mut allocations: Vec<(String, usize, f64)> = Vec::with_capacity(class_order.len());
    let mut allocated = 0usize;
    for class in &class_order {
        let count = class_indices[class].len();
        let ideal = n_test as f64 * count as f64 / n_rows as f64;
        let base = (ideal.floor() as usize).min(count);
        allocated += base;
        allocations.push((class.clone(), base, ideal - ideal.floor()));
    }
    let mut leftover = n_test.saturating_sub(allocated);
    allocations.sort_by(|a, b| b.2.total_cmp(&a.2));
    for entry in allocations.iter_mut() {
        if leftover == 0 {
            break;
        }
        let count = class_indices[&entry.0].len();
        if entry.1 < count {
            entry.1 += 1;
            leftover -= 1;
        }
    }
    let per_class: BTreeMap<String, usize> = allocations
        .into_iter()
        .map(|(class, take, _)| (class, take))
        .collect();

    let mut train: Vec<usize> = Vec::with_capacity(n_rows - n_test);
    let mut test: Vec<usize> = Vec::with_capacity(n_test);
    for class in &class_order {
        let mut members = class_indices[class].clone();
        members.shuffle(&mut rng);
        let take = per_class[class];
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }

    // Mix the per-class blocks so partition order carries no class signal
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    Ok((train, test))
}

/// Class counts and rates overall vs per partition, with rate deltas.
fn build_target_distribution(
    y_all: &Column,
    y_train: &Column,
    y_test: &Column,
) -> Result<Vec<ClassDistributionRow>> {
    let count = |column: &Column| -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for i in 0..column.len() {
            *counts.entry(column.value(i)?.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    };
    let all = count(y_all)?;
    let train = count(y_train)?;
    let test = count(y_test)?;

    let rate = |count: usize, total: usize| -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };

    let mut rows: Vec<ClassDistributionRow> = Vec::with_capacity(all.len());
    for (class, &count_all) in &all {
        let count_train = train.get(class).copied().unwrap_or(0);
        let count_test = test.get(class).copied().unwrap_or(0);
        let rate_all = rate(count_all, y_all.len());
        let rate_train = rate(count_train, y_train.len());
        let rate_test = rate(count_test, y_test.len());
        rows.push(ClassDistributionRow {
            class: class.clone(),
            count_all,
            rate_all,
            count_train,
            rate_train,
            count_test,
            rate_test,
            delta_rate_train_vs_all: rate_train - rate_all,
            delta_rate_test_vs_all: rate_test - rate_all,
        });
    }
    rows.sort_by(|a, b| b.count_all.cmp(&a.count_all).then(a.class.cmp(&b.class)));
    Ok(rows)
}

fn build_risk_checks(
    x_train: &Frame,
    x_test: &Frame,
    y_train: &Column,
    y_test: &Column,
    scope: &Scope,
) -> Result<RiskChecks> {
    let expected: &[String] = scope.features();

    let min_class_rate = |columns: &[&Column]| -> Result<f64> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut total = 0usize;
        for column in columns {
            for i in 0..column.len() {
                *counts.entry(column.value(i)?.to_string()).or_insert(0) += 1;
                total += 1;
            }
        }
        if total == 0 || counts.is_empty() {
            return Ok(0.0);
        }
        let min = counts.values().copied().min().unwrap_or(0);
        Ok(min as f64 / total as f64)
    };

    Ok(RiskChecks {
        scope_integrity: ScopeIntegrity {
            target_in_x_train: x_train.has_column(scope.target()),
            target_in_x_test: x_test.has_column(scope.target()),
            columns_match_scope_train: x_train.column_names() == expected,
            columns_match_scope_test: x_test.column_names() == expected,
        },
        target_balance: TargetBalance {
            min_class_rate_all: min_class_rate(&[y_train, y_test])?,
            min_class_rate_train: min_class_rate(&[y_train])?,
            min_class_rate_test: min_class_rate(&[y_test])?,
        },
    })
}

/// Distinct-category comparison between partitions for string features.
fn build_categorical_cardinality(
    x_train: &Frame,
    x_test: &Frame,
) -> Result<Vec<CardinalityRow>> {
    let distinct = |frame: &Frame, name: &str| -> Result<HashSet<String>> {
        let column = frame.column(name)?;
        let mut out = HashSet::new();
        for i in 0..column.len() {
            let value = column.value(i)?;
            if !value.is_null() {
                out.insert(value.to_string());
            }
        }
        Ok(out)
    };

    let mut rows: Vec<CardinalityRow> = Vec::new();
    for name in x_train.column_names() {
        if x_train.column_type(name)? != ColumnType::String {
            continue;
        }
        let train_vals = distinct(x_train, name)?;
        let test_vals = distinct(x_test, name)?;
        rows.push(CardinalityRow {
            feature: name.clone(),
            n_unique_train: train_vals.len(),
            n_unique_test: test_vals.len(),
            n_only_in_test: test_vals.difference(&train_vals).count(),
            n_only_in_train: train_vals.difference(&test_vals).count(),
        });
    }
    rows.sort_by(|a, b| {
        b.n_only_in_test
            .cmp(&a.n_only_in_test)
            .then(a.n_unique_train.cmp(&b.n_unique_train))
            .then(a.feature.cmp(&b.feature))
    });
    Ok(rows)
}
