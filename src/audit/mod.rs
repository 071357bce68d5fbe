//! Structural audit artifacts.
//!
//! Every pipeline stage captures a structural snapshot of its input and
//! output so that the shape impact of a transformation is explicit and
//! serializable. Nothing here mutates data or blocks execution; findings
//! are reported, never resolved.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::frame::Frame;

/// Minimal structural description of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StructuralSnapshot {
    /// Number of rows
    pub row_count: usize,
    /// Number of columns
    pub col_count: usize,
    /// Approximate heap footprint in bytes
    pub memory_bytes: usize,
}

impl StructuralSnapshot {
    /// Memory footprint in megabytes, for display layers.
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Captures a structural snapshot of `frame`.
pub fn capture_snapshot(frame: &Frame) -> StructuralSnapshot {
    StructuralSnapshot {
        row_count: frame.row_count(),
        col_count: frame.column_count(),
        memory_bytes: frame.memory_bytes(),
    }
}

/// Before/after structural comparison emitted by every executing stage.
#[derive(Debug, Clone, Serialize)]
pub struct BeforeAfter {
    pub before: StructuralSnapshot,
    pub after: StructuralSnapshot,
    /// When the comparison was captured
    pub captured_at: DateTime<Utc>,
}

impl BeforeAfter {
    /// Builds the comparison, stamped with the current time.
    pub fn new(before: StructuralSnapshot, after: StructuralSnapshot) -> Self {
        Self {
            before,
            after,
            captured_at: Utc::now(),
        }
    }

    /// Row count delta (after - before).
    pub fn row_delta(&self) -> i64 {
        self.after.row_count as i64 - self.before.row_count as i64
    }

    /// Column count delta (after - before).
    pub fn col_delta(&self) -> i64 {
        self.after.col_count as i64 - self.before.col_count as i64
    }

    /// Memory delta in bytes (after - before).
    pub fn memory_delta(&self) -> i64 {
        self.after.memory_bytes as i64 - self.before.memory_bytes as i64
    }
}

/// Non-fatal duplicate-row diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    /// Rows beyond the first occurrence of their pattern
    pub duplicate_rows: usize,
    /// Distinct row patterns that occur more than once
    pub duplicate_patterns: usize,
    /// Total rows inspected
    pub row_count: usize,
}

/// Counts fully duplicated rows across all columns.
///
/// Purely diagnostic; callers decide whether duplication matters for
/// their dataset.
pub fn check_duplicate_rows(frame: &Frame) -> Result<DuplicateReport> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in 0..frame.row_count() {
        let mut key = String::new();
        for name in frame.column_names() {
            let value = frame.column(name)?.value(row)?;
            key.push_str(&value.to_string());
            key.push('\u{1f}');
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let duplicate_rows = counts.values().filter(|&&c| c > 1).map(|&c| c - 1).sum();
    let duplicate_patterns = counts.values().filter(|&&c| c > 1).count();

    Ok(DuplicateReport {
        duplicate_rows,
        duplicate_patterns,
        row_count: frame.row_count(),
    })
}
