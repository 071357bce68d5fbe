use std::collections::BTreeMap;

use churnprep::column::{Column, ColumnTrait, Int64Column, StringColumn};
use churnprep::contract::Scope;
use churnprep::error::Error;
use churnprep::frame::Frame;
use churnprep::prep::{run_categorical_standardization, StandardizeDecision};

fn telco_frame() -> Frame {
    Frame::from_columns(vec![
        (
            "OnlineSecurity".to_string(),
            Column::String(StringColumn::from_options(vec![
                Some("No internet service".to_string()),
                Some("Yes".to_string()),
                Some("  No  Internet   Service ".to_string()),
                None,
            ])),
        ),
        (
            "PaymentMethod".to_string(),
            Column::String(StringColumn::new(vec![
                "Electronic check".to_string(),
                "Mailed check".to_string(),
                "Electronic check".to_string(),
                "Mailed check".to_string(),
            ])),
        ),
        (
            "tenure".to_string(),
            Column::Int64(Int64Column::new(vec![1, 2, 3, 4])),
        ),
        (
            "Churn".to_string(),
            Column::String(StringColumn::new(vec![
                "Yes".to_string(),
                "No".to_string(),
                "Yes".to_string(),
                "No".to_string(),
            ])),
        ),
    ])
    .unwrap()
}

fn scope() -> Scope {
    Scope::new(
        vec![
            "OnlineSecurity".to_string(),
            "PaymentMethod".to_string(),
            "tenure".to_string(),
        ],
        "Churn",
    )
    .unwrap()
}

fn phrase_decision(cols: Vec<String>) -> StandardizeDecision {
    let mut phrase_map = BTreeMap::new();
    phrase_map.insert("no internet service".to_string(), "no".to_string());
    StandardizeDecision {
        phrase_map,
        column_scope: cols,
    }
}

#[test]
fn substitutes_service_phrases_and_audits() {
    let frame = telco_frame();
    let decision = phrase_decision(vec!["OnlineSecurity".to_string()]);
    let outcome = run_categorical_standardization(&frame, &scope(), &decision).unwrap();

    let col = outcome
        .frame
        .column("OnlineSecurity")
        .unwrap()
        .as_string()
        .unwrap();
    // both raw variants collapse to the canonical phrase, then the rule maps it
    assert_eq!(col.get(0).unwrap(), Some("no"));
    assert_eq!(col.get(1).unwrap(), Some("yes"));
    assert_eq!(col.get(2).unwrap(), Some("no"));
    assert_eq!(col.get(3).unwrap(), None);

    assert_eq!(outcome.meta.total_cells_changed, 2);
    let change = &outcome.changes[0];
    assert_eq!(change.column, "OnlineSecurity");
    assert_eq!(change.cells_changed, 2);
    assert_eq!(change.examples.len(), 1);
    assert_eq!(change.examples[0].before, "no internet service");
    assert_eq!(change.examples[0].after, "no");

    // row count is preserved
    assert_eq!(outcome.impact.row_delta(), 0);
    assert_eq!(outcome.impact.col_delta(), 0);
}

#[test]
fn columns_outside_scope_stay_untouched() {
    let frame = telco_frame();
    let decision = phrase_decision(vec!["OnlineSecurity".to_string()]);
    let outcome = run_categorical_standardization(&frame, &scope(), &decision).unwrap();

    // PaymentMethod was not in the column scope: byte-identical
    let before = frame.column("PaymentMethod").unwrap().as_string().unwrap();
    let after = outcome
        .frame
        .column("PaymentMethod")
        .unwrap()
        .as_string()
        .unwrap();
    for i in 0..before.len() {
        assert_eq!(before.get(i).unwrap(), after.get(i).unwrap());
    }

    // target untouched as well
    let churn = outcome.frame.column("Churn").unwrap().as_string().unwrap();
    assert_eq!(churn.get(0).unwrap(), Some("Yes"));
}

#[test]
fn input_frame_is_never_mutated() {
    let frame = telco_frame();
    let decision = phrase_decision(vec!["OnlineSecurity".to_string()]);
    run_categorical_standardization(&frame, &scope(), &decision).unwrap();

    let col = frame.column("OnlineSecurity").unwrap().as_string().unwrap();
    assert_eq!(col.get(0).unwrap(), Some("No internet service"));
}

#[test]
fn target_in_column_scope_is_rejected() {
    let frame = telco_frame();
    let decision = phrase_decision(vec!["Churn".to_string()]);
    let err = run_categorical_standardization(&frame, &scope(), &decision).unwrap_err();
    assert!(matches!(err, Error::ScopeViolation(_)));
}

#[test]
fn non_text_scope_columns_are_skipped_explicitly() {
    let frame = telco_frame();
    let decision = phrase_decision(vec!["tenure".to_string()]);
    let outcome = run_categorical_standardization(&frame, &scope(), &decision).unwrap();

    assert_eq!(outcome.meta.skipped_non_text, vec!["tenure"]);
    assert_eq!(outcome.meta.total_cells_changed, 0);
    // no type coercion happened
    let tenure = outcome.frame.column("tenure").unwrap().as_int64().unwrap();
    assert_eq!(tenure.get(0).unwrap(), Some(1));
}

#[test]
fn unknown_scope_names_are_filtered_by_feature_intersection() {
    let frame = telco_frame();
    let decision = phrase_decision(vec![
        "OnlineSecurity".to_string(),
        "NotAColumn".to_string(),
    ]);
    let outcome = run_categorical_standardization(&frame, &scope(), &decision).unwrap();
    assert_eq!(outcome.meta.scoped_columns, vec!["OnlineSecurity"]);
}
