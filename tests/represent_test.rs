use std::collections::BTreeMap;

use churnprep::column::{Column, Float64Column, Int64Column, StringColumn};
use churnprep::contract::Scope;
use churnprep::error::Error;
use churnprep::frame::Frame;
use churnprep::prep::represent::{
    run_supervised_representation, CategoricalDecision, CategoricalEncoding, FeatureDecision,
    NumericDecision, NumericEncoding, RepresentationDecision, TargetDecision, TargetEncoding,
    UnknownCategoryPolicy,
};
use churnprep::prep::split::TrainTestSplit;

fn scope() -> Scope {
    Scope::new(
        vec!["tenure".to_string(), "contract".to_string()],
        "Churn",
    )
    .unwrap()
}

fn x_frame(tenure: Vec<f64>, contract: Vec<&str>) -> Frame {
    Frame::from_columns(vec![
        (
            "tenure".to_string(),
            Column::Float64(Float64Column::new(tenure)),
        ),
        (
            "contract".to_string(),
            Column::String(StringColumn::new(
                contract.into_iter().map(|s| s.to_string()).collect(),
            )),
        ),
    ])
    .unwrap()
}

fn y_column(values: Vec<&str>) -> Column {
    Column::String(StringColumn::new(
        values.into_iter().map(|s| s.to_string()).collect(),
    ))
}

fn sample_split() -> TrainTestSplit {
    TrainTestSplit {
        x_train: x_frame(
            vec![1.0, 24.0, 6.0],
            vec!["Month-to-month", "One year", "Month-to-month"],
        ),
        x_test: x_frame(vec![12.0], vec!["Month-to-month"]),
        y_train: y_column(vec!["Yes", "No", "Yes"]),
        y_test: y_column(vec!["No"]),
    }
}

fn binary_mapping() -> BTreeMap<String, i64> {
    let mut mapping = BTreeMap::new();
    mapping.insert("Yes".to_string(), 1);
    mapping.insert("No".to_string(), 0);
    mapping
}

fn onehot_decision(numeric: NumericEncoding, y: TargetDecision) -> RepresentationDecision {
    RepresentationDecision {
        x: FeatureDecision {
            categorical: CategoricalDecision {
                strategy: CategoricalEncoding::Onehot,
                handle_unknown: UnknownCategoryPolicy::Ignore,
            },
            numeric: NumericDecision { strategy: numeric },
        },
        y,
    }
}

fn map_binary() -> TargetDecision {
    TargetDecision {
        strategy: TargetEncoding::MapBinary,
        mapping: Some(binary_mapping()),
    }
}

fn column_values(frame: &Frame, name: &str) -> Vec<f64> {
    let col = frame.column(name).unwrap().as_float64().unwrap();
    (0..frame.row_count())
        .map(|i| col.get(i).unwrap().unwrap())
        .collect()
}

#[test]
fn onehot_encodes_in_declared_feature_order() {
    let split = sample_split();
    let decision = onehot_decision(NumericEncoding::Passthrough, map_binary());
    let outcome = run_supervised_representation(&split, &scope(), &decision).unwrap();

    let repr = &outcome.representation;
    assert_eq!(
        repr.feature_names,
        vec!["tenure", "contract_Month-to-month", "contract_One year"]
    );
    assert_eq!(repr.x_train.column_names(), repr.feature_names.as_slice());
    assert_eq!(repr.x_test.column_names(), repr.feature_names.as_slice());

    assert_eq!(column_values(&repr.x_train, "tenure"), vec![1.0, 24.0, 6.0]);
    assert_eq!(
        column_values(&repr.x_train, "contract_Month-to-month"),
        vec![1.0, 0.0, 1.0]
    );
    assert_eq!(
        column_values(&repr.x_train, "contract_One year"),
        vec![0.0, 1.0, 0.0]
    );
    assert_eq!(
        column_values(&repr.x_test, "contract_Month-to-month"),
        vec![1.0]
    );

    // y mapped to integers, no nulls
    let y_train = repr.y_train.as_int64().unwrap();
    assert_eq!(y_train.get(0).unwrap(), Some(1));
    assert_eq!(y_train.get(1).unwrap(), Some(0));
    assert_eq!(y_train.get(2).unwrap(), Some(1));
    let y_test = repr.y_test.as_int64().unwrap();
    assert_eq!(y_test.get(0).unwrap(), Some(0));

    let diag = &outcome.diagnostics;
    assert!(diag.train_test_consistency.same_feature_count);
    assert!(diag.train_test_consistency.feature_names_match);
    assert_eq!(diag.x_missing_after.train_total_nulls, 0);
    assert_eq!(diag.x_missing_after.test_total_nulls, 0);
    assert_eq!(diag.n_features_before, 2);
    assert_eq!(diag.n_features_after, 3);
    assert_eq!(diag.fit_on, "train_only");
    assert_eq!(diag.column_roles.categorical, vec!["contract"]);
    assert_eq!(diag.column_roles.numeric, vec!["tenure"]);
}

#[test]
fn unknown_test_categories_encode_as_all_zero() {
    let mut split = sample_split();
    split.x_test = x_frame(vec![3.0], vec!["Two year"]);

    let decision = onehot_decision(NumericEncoding::Passthrough, map_binary());
    let outcome = run_supervised_representation(&split, &scope(), &decision).unwrap();

    let repr = &outcome.representation;
    // the unseen category produced no new column and an all-zero row
    assert_eq!(
        repr.x_test.column_names(),
        &["tenure", "contract_Month-to-month", "contract_One year"]
    );
    assert_eq!(
        column_values(&repr.x_test, "contract_Month-to-month"),
        vec![0.0]
    );
    assert_eq!(column_values(&repr.x_test, "contract_One year"), vec![0.0]);
}

#[test]
fn transformer_is_a_function_of_train_only() {
    let split = sample_split();
    let decision = onehot_decision(NumericEncoding::StandardScaler, map_binary());
    let outcome = run_supervised_representation(&split, &scope(), &decision).unwrap();
    let fitted = outcome.representation.transformer.clone();

    // same train, different test: the fitted state must be identical
    let mut other = sample_split();
    other.x_test = x_frame(vec![1000.0], vec!["Two year"]);
    other.y_test = y_column(vec!["Yes"]);
    let outcome2 = run_supervised_representation(&other, &scope(), &decision).unwrap();

    assert_eq!(fitted, outcome2.representation.transformer);
    assert_eq!(
        outcome.representation.feature_names,
        outcome2.representation.feature_names
    );

    // and transforming with it twice gives identical output
    let a = fitted.transform(&split.x_train).unwrap();
    let b = fitted.transform(&split.x_train).unwrap();
    assert_eq!(column_values(&a, "tenure"), column_values(&b, "tenure"));
}

#[test]
fn standard_scaler_uses_train_statistics_for_test() {
    let split = sample_split();
    let decision = onehot_decision(NumericEncoding::StandardScaler, map_binary());
    let outcome = run_supervised_representation(&split, &scope(), &decision).unwrap();

    // train mean/std of [1, 24, 6]
    let mean = 31.0 / 3.0;
    let var = ((1.0 - mean) as f64).powi(2) + ((24.0 - mean) as f64).powi(2)
        + ((6.0 - mean) as f64).powi(2);
    let std = (var / 3.0).sqrt();

    let train = column_values(&outcome.representation.x_train, "tenure");
    assert!((train[0] - (1.0 - mean) / std).abs() < 1e-12);

    // the test row is scaled with the train statistics, not its own
    let test = column_values(&outcome.representation.x_test, "tenure");
    assert!((test[0] - (12.0 - mean) / std).abs() < 1e-12);
}

#[test]
fn mapping_must_cover_every_observed_value() {
    let mut split = sample_split();
    split.y_test = y_column(vec!["Maybe"]);

    let decision = onehot_decision(NumericEncoding::Passthrough, map_binary());
    let err = run_supervised_representation(&split, &scope(), &decision).unwrap_err();
    assert!(matches!(err, Error::Coverage(_)));
    assert!(err.to_string().contains("Maybe"));
}

#[test]
fn nulls_in_target_fail_map_binary() {
    let mut split = sample_split();
    split.y_test = Column::String(StringColumn::from_options(vec![None]));

    let decision = onehot_decision(NumericEncoding::Passthrough, map_binary());
    let err = run_supervised_representation(&split, &scope(), &decision).unwrap_err();
    assert!(matches!(err, Error::Coverage(_)));
}

#[test]
fn passthrough_target_keeps_values_and_forbids_mapping() {
    let split = sample_split();
    let decision = onehot_decision(
        NumericEncoding::Passthrough,
        TargetDecision {
            strategy: TargetEncoding::Passthrough,
            mapping: None,
        },
    );
    let outcome = run_supervised_representation(&split, &scope(), &decision).unwrap();
    let y = outcome.representation.y_train.as_string().unwrap();
    assert_eq!(y.get(0).unwrap(), Some("Yes"));
    assert!(outcome.representation.target_mapping.is_none());

    // a mapping alongside passthrough is ambiguous
    let bad = onehot_decision(
        NumericEncoding::Passthrough,
        TargetDecision {
            strategy: TargetEncoding::Passthrough,
            mapping: Some(binary_mapping()),
        },
    );
    let err = run_supervised_representation(&split, &scope(), &bad).unwrap_err();
    assert!(matches!(err, Error::DecisionValidation(_)));
}

#[test]
fn misaligned_split_columns_fail_fast() {
    let mut split = sample_split();
    split.x_test = Frame::from_columns(vec![
        (
            "contract".to_string(),
            Column::String(StringColumn::new(vec!["One year".to_string()])),
        ),
        (
            "tenure".to_string(),
            Column::Float64(Float64Column::new(vec![3.0])),
        ),
    ])
    .unwrap();

    let decision = onehot_decision(NumericEncoding::Passthrough, map_binary());
    let err = run_supervised_representation(&split, &scope(), &decision).unwrap_err();
    assert!(matches!(err, Error::ScopeViolation(_)));
}

#[test]
fn row_parity_is_checked() {
    let mut split = sample_split();
    split.y_train = y_column(vec!["Yes", "No"]);
    let decision = onehot_decision(NumericEncoding::Passthrough, map_binary());
    let err = run_supervised_representation(&split, &scope(), &decision).unwrap_err();
    assert!(matches!(err, Error::InconsistentRowCount { .. }));
}

#[test]
fn boolean_features_play_the_numeric_role() {
    let x_train = Frame::from_columns(vec![
        (
            "senior".to_string(),
            Column::Boolean(churnprep::column::BooleanColumn::new(vec![true, false, true])),
        ),
        (
            "contract".to_string(),
            Column::String(StringColumn::new(vec![
                "a".to_string(),
                "b".to_string(),
                "a".to_string(),
            ])),
        ),
    ])
    .unwrap();
    let x_test = Frame::from_columns(vec![
        (
            "senior".to_string(),
            Column::Boolean(churnprep::column::BooleanColumn::new(vec![false])),
        ),
        (
            "contract".to_string(),
            Column::String(StringColumn::new(vec!["b".to_string()])),
        ),
    ])
    .unwrap();
    let split = TrainTestSplit {
        x_train,
        x_test,
        y_train: Column::Int64(Int64Column::new(vec![1, 0, 1])),
        y_test: Column::Int64(Int64Column::new(vec![0])),
    };
    let scope = Scope::new(
        vec!["senior".to_string(), "contract".to_string()],
        "Churn",
    )
    .unwrap();

    let decision = onehot_decision(
        NumericEncoding::Passthrough,
        TargetDecision {
            strategy: TargetEncoding::Passthrough,
            mapping: None,
        },
    );
    let outcome = run_supervised_representation(&split, &scope, &decision).unwrap();
    assert_eq!(
        outcome.diagnostics.column_roles.numeric,
        vec!["senior"]
    );
    assert_eq!(
        column_values(&outcome.representation.x_train, "senior"),
        vec![1.0, 0.0, 1.0]
    );
}

#[test]
fn decision_deserializes_with_strict_keys() {
    let json = r#"{
        "x": {
            "categorical": {"strategy": "onehot", "handle_unknown": "ignore"},
            "numeric": {"strategy": "passthrough"}
        },
        "y": {"strategy": "map_binary", "mapping": {"Yes": 1, "No": 0}}
    }"#;
    let decision: RepresentationDecision = serde_json::from_str(json).unwrap();
    assert!(decision.validate().is_ok());

    // anything but onehot/ignore cannot even be parsed
    let bad = json.replace("onehot", "target_encoding");
    assert!(serde_json::from_str::<RepresentationDecision>(&bad).is_err());
    let bad = json.replace("ignore", "error");
    assert!(serde_json::from_str::<RepresentationDecision>(&bad).is_err());

    // map_binary without a mapping fails validation
    let missing = r#"{
        "x": {
            "categorical": {"strategy": "onehot", "handle_unknown": "ignore"},
            "numeric": {"strategy": "passthrough"}
        },
        "y": {"strategy": "map_binary"}
    }"#;
    let decision: RepresentationDecision = serde_json::from_str(missing).unwrap();
    assert!(decision.validate().is_err());
}
