use crate::audit::{capture_snapshot, BeforeAfter, StructuralSnapshot};
use crate::contract::Scope;
use crate::error::{Error, Result};
use crate::frame::Frame;

/// Outcome of reducing a frame to its contract columns.
#[derive(Debug)]
pub struct ContractConformance {
    /// Reduced frame, holding only the kept columns in contract order
    pub frame: Frame,
    /// Columns the contract expected, in declared order
    pub expected_columns: Vec<String>,
    /// Expected columns that were present and kept (contract order)
    pub kept: Vec<String>,
    /// Expected columns absent from the input
    pub missing: Vec<String>,
    /// Present columns discarded for not being expected (sorted)
    pub dropped: Vec<String>,
    /// Structure before the reduction
    pub snapshot_before: StructuralSnapshot,
    /// Structure after the reduction
    pub snapshot_after: StructuralSnapshot,
}

impl ContractConformance {
    /// Before/after impact view of the reduction.
    pub fn impact(&self) -> BeforeAfter {
        BeforeAfter::new(self.snapshot_before, self.snapshot_after)
    }
}

/// Reduces `frame` to exactly the expected columns.
///
/// Missing expected columns are reported, not fabricated; they only fail
/// the call under `strict`. Extra columns are dropped and listed. The
/// input frame is left untouched.
pub fn enforce_contract(
    frame: &Frame,
    expected_columns: &[String],
    strict: bool,
) -> Result<ContractConformance> {
    let snapshot_before = capture_snapshot(frame);

    let missing: Vec<String> = expected_columns
        .iter()
        .filter(|c| !frame.has_column(c))
        .cloned()
        .collect();
    if strict && !missing.is_empty() {
        return Err(Error::Schema(format!(
            "strict contract enforcement failed; missing columns: {:?}",
            missing
        )));
    }

    let kept: Vec<String> = expected_columns
        .iter()
        .filter(|c| frame.has_column(c))
        .cloned()
        .collect();
    let mut dropped: Vec<String> = frame
        .column_names()
        .iter()
        .filter(|c| !kept.contains(c))
        .cloned()
        .collect();
    dropped.sort();

    let reduced = frame.select(&kept)?;
    let snapshot_after = capture_snapshot(&reduced);

    log::info!(
        "contract enforcement: kept {} of {} expected columns, dropped {}, missing {}",
        kept.len(),
        expected_columns.len(),
        dropped.len(),
        missing.len()
    );

    Ok(ContractConformance {
        frame: reduced,
        expected_columns: expected_columns.to_vec(),
        kept,
        missing,
        dropped,
        snapshot_before,
        snapshot_after,
    })
}

/// Reduces `frame` to a scope's columns (features in order, then target).
pub fn enforce_scope(frame: &Frame, scope: &Scope, strict: bool) -> Result<ContractConformance> {
    enforce_contract(frame, &scope.keep_columns(), strict)
}
