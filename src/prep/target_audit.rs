//! Target audit (read-only diagnostic).
//!
//! Inspects the supervised target column for completeness, cardinality and
//! domain conformance. Everything here is observation: anomalies are
//! reported as free-text findings, a canonical form is never inferred, and
//! the frame is never touched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::column::ColumnType;
use crate::error::Result;
use crate::frame::Frame;
use crate::value::DataValue;

/// Audit knobs (diagnostic caps only, not a decision).
#[derive(Debug, Clone, Serialize)]
pub struct TargetAuditParams {
    /// Expected target domain; observed values outside it are flagged
    pub expected_values: Option<Vec<String>>,
    /// Cap on distribution rows
    pub top_k: usize,
    /// Cap on the distinct-value preview
    pub preview_unique: usize,
}

impl Default for TargetAuditParams {
    fn default() -> Self {
        Self {
            expected_values: None,
            top_k: 10,
            preview_unique: 12,
        }
    }
}

/// Consolidated audit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Ok,
    Warning,
    Error,
}

/// One row of the target value distribution (nulls included).
#[derive(Debug, Clone, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Full audit record for the target column.
#[derive(Debug, Clone, Serialize)]
pub struct TargetAuditReport {
    pub target: String,
    pub exists: bool,
    pub row_count: usize,
    pub missing_count: usize,
    pub missing_pct: f64,
    /// Distinct logical values: for string targets, counted after trim +
    /// lowercase so that casing variants of one value count once (the raw
    /// variants still show up in the distribution and the casing anomaly)
    pub nunique: usize,
    /// Raw value distribution, most frequent first, capped at `top_k`
    pub value_distribution: Vec<ValueCount>,
    /// Raw distinct values, first-appearance order, capped
    pub unique_values_preview: Vec<String>,
    pub anomalies: Vec<String>,
    pub status: AuditStatus,
    pub notes: String,
    pub audited_at: DateTime<Utc>,
}

/// Audits the target column of `frame`.
///
/// A missing or unnamed target is reported through `status == Error`, not
/// through a Rust error; the stage itself only fails on internal frame
/// inconsistencies.
pub fn audit_target(
    frame: &Frame,
    target: &str,
    params: &TargetAuditParams,
) -> Result<TargetAuditReport> {
    if target.trim().is_empty() {
        return Ok(error_report(
            target,
            frame.row_count(),
            "target not named (empty string)".to_string(),
        ));
    }
    if !frame.has_column(target) {
        return Ok(error_report(
            target,
            frame.row_count(),
            format!("target column '{}' does not exist in the frame", target),
        ));
    }

    let column = frame.column(target)?;
    let row_count = column.len();
    let is_string = column.column_type() == ColumnType::String;

    let mut values: Vec<DataValue> = Vec::with_capacity(row_count);
    for i in 0..row_count {
        values.push(column.value(i)?);
    }

    let missing_count = values.iter().filter(|v| v.is_null()).count();
    let missing_pct = if row_count == 0 {
        0.0
    } else {
        (missing_count as f64 / row_count as f64) * 100.0
    };
    let missing_pct = (missing_pct * 100.0).round() / 100.0;

    // Raw distribution, nulls included
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for v in &values {
        *counts.entry(v.to_string()).or_insert(0) += 1;
    }
    let mut value_distribution: Vec<ValueCount> = counts
        .iter()
        .map(|(value, &count)| ValueCount {
            value: value.clone(),
            count,
        })
        .collect();
    value_distribution.sort_by(|a, b| b.count.cmp(&a.count).then(a.value.cmp(&b.value)));
    value_distribution.truncate(params.top_k);

    // Raw distinct non-null values, first appearance
    let mut raw_distinct: Vec<String> = Vec::new();
    for v in &values {
        if v.is_null() {
            continue;
        }
        let s = v.to_string();
        if !raw_distinct.contains(&s) {
            raw_distinct.push(s);
        }
    }

    // Normalized distinct values; for strings this groups casing and
    // whitespace variants of the same logical value
    let mut variants: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for raw in &raw_distinct {
        let norm = if is_string {
            raw.trim().to_lowercase()
        } else {
            raw.clone()
        };
        let entry = variants.entry(norm).or_default();
        if !entry.contains(raw) {
            entry.push(raw.clone());
        }
    }
    let nunique = variants.len();

    let unique_values_preview: Vec<String> = raw_distinct
        .iter()
        .take(params.preview_unique)
        .cloned()
        .collect();

    let mut anomalies: Vec<String> = Vec::new();

    if missing_count > 0 {
        anomalies.push(format!(
            "target has {} missing value(s) ({:.2}%)",
            missing_count, missing_pct
        ));
    }
    if nunique == 0 {
        anomalies.push("target has no non-null values".to_string());
    } else if nunique == 1 {
        anomalies.push("target has a single distinct value (degenerate target)".to_string());
    } else if nunique > 2 {
        anomalies.push(format!(
            "target has {} distinct values (binary expected?)",
            nunique
        ));
    }

    if is_string {
        let empty_like = values
            .iter()
            .filter(|v| matches!(v, DataValue::String(s) if s.trim().is_empty()))
            .count();
        if empty_like > 0 {
            anomalies.push(format!(
                "target has {} empty/whitespace-only string value(s)",
                empty_like
            ));
        }

        let casing: Vec<(&String, &Vec<String>)> = variants
            .iter()
            .filter(|(_, originals)| originals.len() > 1)
            .collect();
        if !casing.is_empty() {
            let mut examples: Vec<String> = Vec::new();
            for (norm, originals) in casing.iter().take(3) {
                let mut sorted = (*originals).clone();
                sorted.sort();
                sorted.truncate(4);
                examples.push(format!("{}: {:?}", norm, sorted));
            }
            anomalies.push(format!(
                "target has casing/whitespace variants of the same value: {}",
                examples.join(" | ")
            ));
        }
    }

    if let Some(expected) = &params.expected_values {
        let unexpected: Vec<&String> = raw_distinct
            .iter()
            .filter(|v| !expected.contains(v))
            .collect();
        if !unexpected.is_empty() {
            let shown: Vec<String> = unexpected.iter().take(10).map(|s| s.to_string()).collect();
            anomalies.push(format!(
                "target has values outside the expected domain: {}",
                shown.join(", ")
            ));
        }
    }

    let status = if anomalies.is_empty() {
        AuditStatus::Ok
    } else {
        AuditStatus::Warning
    };
    let notes = match status {
        AuditStatus::Ok => "target consistent for modeling (basic signals ok)".to_string(),
        _ => "review the audit findings before modeling".to_string(),
    };

    if status != AuditStatus::Ok {
        log::warn!(
            "target audit for '{}': {} finding(s)",
            target,
            anomalies.len()
        );
    }

    Ok(TargetAuditReport {
        target: target.to_string(),
        exists: true,
        row_count,
        missing_count,
        missing_pct,
        nunique,
        value_distribution,
        unique_values_preview,
        anomalies,
        status,
        notes,
        audited_at: Utc::now(),
    })
}

fn error_report(target: &str, row_count: usize, anomaly: String) -> TargetAuditReport {
    TargetAuditReport {
        target: target.to_string(),
        exists: false,
        row_count,
        missing_count: 0,
        missing_pct: 0.0,
        nunique: 0,
        value_distribution: Vec::new(),
        unique_values_preview: Vec::new(),
        anomalies: vec![anomaly],
        status: AuditStatus::Error,
        notes: "review the audit findings before modeling".to_string(),
        audited_at: Utc::now(),
    }
}
