//! Categorical standardization candidates (diagnostic only).
//!
//! Scans a frame and ranks columns that likely need categorical
//! standardization: textual columns, low-cardinality numerics, binary-like
//! domains, and columns carrying compound "service phrases" such as
//! "no internet service". The scan never mutates anything; it only
//! prepares the evidence for an explicit standardization decision.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::column::{Column, ColumnType};
use crate::contract::Scope;
use crate::error::Result;
use crate::frame::Frame;
use crate::value::DataValue;

/// Compound values that represent a derived/conditional "no".
const SERVICE_PHRASES: [&str; 2] = ["no internet service", "no phone service"];

/// Heuristic thresholds for the candidate scan.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateParams {
    /// Maximum distinct/row ratio for a numeric column to stay suspected
    pub max_unique_ratio: f64,
    /// Maximum absolute distinct count for a numeric column to stay suspected
    pub max_unique_count: usize,
    /// Whether low-cardinality numeric columns are candidates at all
    pub include_numeric_small: bool,
    /// Rows kept in the ranked candidate table
    pub top_n: usize,
    /// Rows kept in the binary-like table
    pub head_bin: usize,
    /// Rows kept in the service-phrase table
    pub head_service: usize,
}

impl Default for CandidateParams {
    fn default() -> Self {
        Self {
            max_unique_ratio: 0.5,
            max_unique_count: 50,
            include_numeric_small: true,
            top_n: 30,
            head_bin: 20,
            head_service: 20,
        }
    }
}

/// Diagnostic record for one scanned column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnCandidate {
    pub column: String,
    pub dtype: ColumnType,
    pub n_unique: usize,
    pub unique_ratio: f64,
    /// Up to six distinct values for visual inspection
    pub sample_values: Vec<String>,
    pub suspected: bool,
    pub binary_like: bool,
    pub service_phrase: bool,
    pub reasons: Vec<String>,
}

/// High-level counters for the scan.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateOverview {
    pub total_columns: usize,
    pub suspected_columns: usize,
    pub binary_candidates: usize,
    pub service_phrase_columns: usize,
    pub excluded_columns: Vec<String>,
    /// Echo of the thresholds the scan ran with
    pub heuristics: CandidateParams,
}

/// Full candidate report: overview plus three ranked tables.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub overview: CandidateOverview,
    /// Suspected columns, most standardization-worthy first
    pub top_candidates: Vec<ColumnCandidate>,
    /// Columns whose non-null domain looks binary
    pub binary_candidates: Vec<ColumnCandidate>,
    /// Columns where a service phrase was observed
    pub service_phrase_candidates: Vec<ColumnCandidate>,
}

/// Scans every column not excluded and ranks standardization candidates.
///
/// Ranking: service-phrase columns first, then binary-like, then ascending
/// cardinality. Purely advisory.
pub fn find_categorical_candidates(
    frame: &Frame,
    params: &CandidateParams,
    exclude_columns: &[String],
) -> Result<CandidateReport> {
    let n_rows = frame.row_count();
    let mut records: Vec<ColumnCandidate> = Vec::new();

    for name in frame.column_names() {
        if exclude_columns.contains(name) {
            continue;
        }
        let column = frame.column(name)?;
        records.push(scan_column(name, column, n_rows, params)?);
    }

    let suspected: Vec<ColumnCandidate> =
        records.iter().filter(|r| r.suspected).cloned().collect();
    let binary: Vec<ColumnCandidate> =
        records.iter().filter(|r| r.binary_like).cloned().collect();
    let service: Vec<ColumnCandidate> = records
        .iter()
        .filter(|r| r.service_phrase)
        .cloned()
        .collect();

    let mut excluded: Vec<String> = exclude_columns.to_vec();
    excluded.sort();

    let overview = CandidateOverview {
        total_columns: records.len(),
        suspected_columns: suspected.len(),
        binary_candidates: binary.len(),
        service_phrase_columns: service.len(),
        excluded_columns: excluded,
        heuristics: params.clone(),
    };

    let mut top = suspected;
    top.sort_by(|a, b| {
        b.service_phrase
            .cmp(&a.service_phrase)
            .then(b.binary_like.cmp(&a.binary_like))
            .then(a.n_unique.cmp(&b.n_unique))
            .then(a.unique_ratio.total_cmp(&b.unique_ratio))
            .then(a.column.cmp(&b.column))
    });
    top.truncate(params.top_n);

    let mut binary_sorted = binary;
    binary_sorted.sort_by(|a, b| {
        a.n_unique
            .cmp(&b.n_unique)
            .then(a.unique_ratio.total_cmp(&b.unique_ratio))
            .then(a.column.cmp(&b.column))
    });
    binary_sorted.truncate(params.head_bin);

    let mut service_sorted = service;
    service_sorted.sort_by(|a, b| {
        a.n_unique
            .cmp(&b.n_unique)
            .then(a.unique_ratio.total_cmp(&b.unique_ratio))
            .then(a.column.cmp(&b.column))
    });
    service_sorted.truncate(params.head_service);

    Ok(CandidateReport {
        overview,
        top_candidates: top,
        binary_candidates: binary_sorted,
        service_phrase_candidates: service_sorted,
    })
}

/// Scope-aware entry point: the target is always excluded from the scan.
pub fn run_candidate_diagnosis(
    frame: &Frame,
    scope: &Scope,
    params: &CandidateParams,
) -> Result<CandidateReport> {
    let exclude = vec![scope.target().to_string()];
    find_categorical_candidates(frame, params, &exclude)
}

fn scan_column(
    name: &str,
    column: &Column,
    n_rows: usize,
    params: &CandidateParams,
) -> Result<ColumnCandidate> {
    let distinct = distinct_non_null(column)?;
    let n_unique = distinct.len();
    let unique_ratio = if n_rows == 0 {
        0.0
    } else {
        n_unique as f64 / n_rows as f64
    };
    let sample_values: Vec<String> = distinct.iter().take(6).map(|v| v.to_string()).collect();

    let dtype = column.column_type();
    let mut reasons = Vec::new();
    let mut suspected = false;

    match dtype {
        ColumnType::String => {
            suspected = true;
            reasons.push("text/categorical".to_string());
        }
        ColumnType::Boolean => {
            suspected = true;
            reasons.push("boolean".to_string());
        }
        ColumnType::Int64 | ColumnType::Float64 => {
            if params.include_numeric_small
                && n_unique <= params.max_unique_count
                && unique_ratio <= params.max_unique_ratio
            {
                suspected = true;
                reasons.push("low-cardinality numeric".to_string());
            }
        }
    }

    let binary_like = is_binary_like(&distinct);
    if binary_like {
        reasons.push("binary (yes/no)".to_string());
    }

    let service_phrase = has_service_phrase(distinct.iter().take(12));
    if service_phrase {
        reasons.push("service phrase".to_string());
    }

    Ok(ColumnCandidate {
        column: name.to_string(),
        dtype,
        n_unique,
        unique_ratio,
        sample_values,
        suspected,
        binary_like,
        service_phrase,
        reasons,
    })
}

/// Distinct non-null values in first-appearance order.
fn distinct_non_null(column: &Column) -> Result<Vec<DataValue>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for i in 0..column.len() {
        let value = column.value(i)?;
        if value.is_null() {
            continue;
        }
        if seen.insert(value.to_string()) {
            out.push(value);
        }
    }
    Ok(out)
}

/// True when the normalized non-null domain is exactly {yes,no}, {y,n} or
/// {0,1}.
fn is_binary_like(distinct: &[DataValue]) -> bool {
    if distinct.is_empty() {
        return false;
    }
    let mut normalized = BTreeSet::new();
    for value in distinct {
        let token = match value {
            DataValue::String(s) => s.trim().to_lowercase(),
            DataValue::Boolean(b) => (if *b { "1" } else { "0" }).to_string(),
            DataValue::Int64(v) => v.to_string(),
            DataValue::Float64(v) if v.fract() == 0.0 => (*v as i64).to_string(),
            DataValue::Float64(v) => v.to_string(),
            DataValue::Null => continue,
        };
        normalized.insert(token);
    }
    let set: Vec<&str> = normalized.iter().map(|s| s.as_str()).collect();
    set == ["no", "yes"] || set == ["0", "1"] || set == ["n", "y"]
}

/// True when any sampled value contains a known service phrase.
fn has_service_phrase<'a>(values: impl Iterator<Item = &'a DataValue>) -> bool {
    for value in values {
        if let DataValue::String(s) = value {
            let low = s.trim().to_lowercase();
            if SERVICE_PHRASES.iter().any(|p| low.contains(p)) {
                return true;
            }
        }
    }
    false
}
