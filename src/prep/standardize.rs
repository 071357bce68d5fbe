//! Categorical standardization (execution).
//!
//! Applies explicitly declared phrase substitutions over a restricted
//! column scope. Values are first normalized (trim, lowercase, collapse
//! internal whitespace; nulls pass through untouched), then rewritten by
//! exact match against the pre-normalized phrase map. No encoding, no type
//! coercion, no target access; columns outside the scope stay
//! byte-identical.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audit::{capture_snapshot, BeforeAfter};
use crate::column::{Column, ColumnTrait, StringColumn};
use crate::contract::Scope;
use crate::error::{Error, Result};
use crate::frame::Frame;

/// Cap on recorded before/after example pairs per column.
const MAX_EXAMPLES: usize = 8;

/// Explicit standardization decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardizeDecision {
    /// Exact-match substitutions over normalized values
    pub phrase_map: BTreeMap<String, String>,
    /// Columns the substitutions may touch
    pub column_scope: Vec<String>,
}

/// One substitution rule, stored already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardizationRule {
    pub from_value: String,
    pub to_value: String,
}

/// Distinct before → after pair observed in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeExample {
    pub before: String,
    pub after: String,
}

/// Per-column substitution audit.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnChange {
    pub column: String,
    /// Cells rewritten by a phrase rule (normalization alone not counted)
    pub cells_changed: usize,
    /// Up to eight distinct example pairs
    pub examples: Vec<ChangeExample>,
}

/// Execution summary.
#[derive(Debug, Clone, Serialize)]
pub struct StandardizationMeta {
    /// Columns the stage actually operated on
    pub scoped_columns: Vec<String>,
    /// In-scope columns skipped for not being text (explicit non-action)
    pub skipped_non_text: Vec<String>,
    pub total_cells_changed: usize,
    pub rules_count: usize,
}

/// Stage output: new frame plus the audit trail.
#[derive(Debug)]
pub struct StandardizationOutcome {
    pub frame: Frame,
    pub impact: BeforeAfter,
    pub changes: Vec<ColumnChange>,
    pub rules: Vec<StandardizationRule>,
    pub meta: StandardizationMeta,
}

/// Executes phrase standardization over `column_scope ∩ scope.features`.
///
/// A `column_scope` that names the target is rejected outright; the
/// feature intersection keeps every other stray name out. The input frame
/// is never mutated.
pub fn run_categorical_standardization(
    frame: &Frame,
    scope: &Scope,
    decision: &StandardizeDecision,
) -> Result<StandardizationOutcome> {
    if decision.column_scope.iter().any(|c| c == scope.target()) {
        return Err(Error::ScopeViolation(format!(
            "target '{}' must not appear in the standardization column scope",
            scope.target()
        )));
    }

    let scoped: Vec<String> = decision
        .column_scope
        .iter()
        .filter(|c| scope.is_feature(c) && frame.has_column(c))
        .cloned()
        .collect();

    let rules: Vec<StandardizationRule> = decision
        .phrase_map
        .iter()
        .map(|(from, to)| StandardizationRule {
            from_value: normalize_text(from),
            to_value: normalize_text(to),
        })
        .collect();

    let before = capture_snapshot(frame);
    let mut out = frame.clone();

    let mut changes: Vec<ColumnChange> = Vec::new();
    let mut skipped_non_text: Vec<String> = Vec::new();
    let mut total_cells_changed = 0usize;

    for name in &scoped {
        let column = out.column(name)?;
        let strings = match column.as_string() {
            Some(c) => c,
            None => {
                skipped_non_text.push(name.clone());
                continue;
            }
        };

        let (rewritten, change) = standardize_column(name, strings, &rules)?;
        total_cells_changed += change.cells_changed;
        changes.push(change);
        out.replace_column(name, Column::String(rewritten))?;
    }

    changes.sort_by(|a, b| {
        b.cells_changed
            .cmp(&a.cells_changed)
            .then(a.column.cmp(&b.column))
    });

    let after = capture_snapshot(&out);

    log::info!(
        "categorical standardization: {} columns in scope, {} cells changed, {} rules",
        scoped.len(),
        total_cells_changed,
        rules.len()
    );

    let meta = StandardizationMeta {
        scoped_columns: scoped,
        skipped_non_text,
        total_cells_changed,
        rules_count: rules.len(),
    };

    Ok(StandardizationOutcome {
        frame: out,
        impact: BeforeAfter::new(before, after),
        changes,
        rules,
        meta,
    })
}

fn standardize_column(
    name: &str,
    column: &StringColumn,
    rules: &[StandardizationRule],
) -> Result<(StringColumn, ColumnChange)> {
    let mut values: Vec<String> = Vec::with_capacity(column.len());
    let mut nulls: Vec<bool> = Vec::with_capacity(column.len());
    let mut cells_changed = 0usize;
    let mut examples: Vec<ChangeExample> = Vec::new();

    for i in 0..column.len() {
        match column.get(i)? {
            None => {
                values.push(String::new());
                nulls.push(true);
            }
            Some(raw) => {
                let normalized = normalize_text(raw);
                let replaced = rules
                    .iter()
                    .find(|r| r.from_value == normalized)
                    .map(|r| r.to_value.clone())
                    .unwrap_or_else(|| normalized.clone());
                if replaced != normalized {
                    cells_changed += 1;
                    let example = ChangeExample {
                        before: normalized,
                        after: replaced.clone(),
                    };
                    if examples.len() < MAX_EXAMPLES && !examples.contains(&example) {
                        examples.push(example);
                    }
                }
                values.push(replaced);
                nulls.push(false);
            }
        }
    }

    let rewritten = StringColumn::with_nulls(values, nulls)?;
    Ok((
        rewritten,
        ColumnChange {
            column: name.to_string(),
            cells_changed,
            examples,
        },
    ))
}

/// Minimal textual normalization: trim, lowercase, collapse internal
/// whitespace. Purely structural; no semantic inference.
pub(crate) fn normalize_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
