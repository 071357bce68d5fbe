//! Staged data-preparation pipeline.
//!
//! Every stage follows the same discipline: diagnose, take an explicit
//! caller-supplied decision, validate it strictly before touching data,
//! execute within the declared column scope, and return a new frame plus
//! audit artifacts. No stage defaults a decision, mutates its input, or
//! touches the target outside its contract.

pub mod candidates;
pub mod impute;
pub mod represent;
pub mod split;
pub mod standardize;
pub mod target_audit;

pub use candidates::{
    find_categorical_candidates, run_candidate_diagnosis, CandidateParams, CandidateReport,
    ColumnCandidate,
};
pub use impute::{
    run_missing_imputation, CategoricalStrategy, ColumnImputationPlan, ColumnOverride,
    ImputationChange, ImputationDecision, ImputationOutcome, NumericStrategy,
};
pub use represent::{
    run_supervised_representation, CategoricalEncoding, FittedTransformer, NumericEncoding,
    Representation, RepresentationDecision, RepresentationOutcome, TargetEncoding,
    UnknownCategoryPolicy,
};
pub use split::{
    run_train_test_split, SplitDecision, SplitDiagnostics, SplitOutcome, TestSize,
    TrainTestSplit,
};
pub use standardize::{
    run_categorical_standardization, StandardizationOutcome, StandardizeDecision,
};
pub use target_audit::{audit_target, AuditStatus, TargetAuditParams, TargetAuditReport};
