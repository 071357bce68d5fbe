use churnprep::column::{Column, Int64Column, StringColumn};
use churnprep::contract::Scope;
use churnprep::error::Error;
use churnprep::frame::Frame;
use churnprep::prep::{run_train_test_split, SplitDecision, TestSize};

fn churn_frame(n: usize) -> Frame {
    // deterministic fixture: every third row churns
    let tenure: Vec<i64> = (0..n as i64).collect();
    let contract: Vec<String> = (0..n)
        .map(|i| {
            if i % 2 == 0 {
                "Month-to-month".to_string()
            } else {
                "One year".to_string()
            }
        })
        .collect();
    let churn: Vec<String> = (0..n)
        .map(|i| if i % 3 == 0 { "Yes".to_string() } else { "No".to_string() })
        .collect();

    Frame::from_columns(vec![
        ("tenure".to_string(), Column::Int64(Int64Column::new(tenure))),
        (
            "contract".to_string(),
            Column::String(StringColumn::new(contract)),
        ),
        ("Churn".to_string(), Column::String(StringColumn::new(churn))),
    ])
    .unwrap()
}

fn scope() -> Scope {
    Scope::new(
        vec!["tenure".to_string(), "contract".to_string()],
        "Churn",
    )
    .unwrap()
}

fn decision(test_size: TestSize, shuffle: bool, stratify: bool) -> SplitDecision {
    SplitDecision {
        test_size,
        random_state: 42,
        shuffle,
        stratify,
        stratify_col: if stratify { Some("Churn".to_string()) } else { None },
        audit_categorical_cardinality: false,
    }
}

fn tenure_values(frame: &Frame) -> Vec<i64> {
    let col = frame.column("tenure").unwrap().as_int64().unwrap();
    (0..frame.row_count())
        .map(|i| col.get(i).unwrap().unwrap())
        .collect()
}

#[test]
fn rows_are_conserved_and_aligned() {
    let frame = churn_frame(30);
    let outcome =
        run_train_test_split(&frame, &scope(), &decision(TestSize::Fraction(0.2), true, false))
            .unwrap();

    let split = &outcome.split;
    assert_eq!(split.x_train.row_count() + split.x_test.row_count(), 30);
    assert_eq!(split.x_train.row_count(), split.y_train.len());
    assert_eq!(split.x_test.row_count(), split.y_test.len());
    assert_eq!(outcome.diagnostics.shapes.x_test.rows, 6);
    assert_eq!(outcome.diagnostics.shapes.n_features, 2);
}

#[test]
fn repeated_calls_are_byte_identical() {
    let frame = churn_frame(50);
    let d = decision(TestSize::Fraction(0.3), true, false);
    let a = run_train_test_split(&frame, &scope(), &d).unwrap();
    let b = run_train_test_split(&frame, &scope(), &d).unwrap();

    assert_eq!(tenure_values(&a.split.x_train), tenure_values(&b.split.x_train));
    assert_eq!(tenure_values(&a.split.x_test), tenure_values(&b.split.x_test));

    // a different seed moves rows around
    let mut other = decision(TestSize::Fraction(0.3), true, false);
    other.random_state = 43;
    let c = run_train_test_split(&frame, &scope(), &other).unwrap();
    assert_ne!(tenure_values(&a.split.x_test), tenure_values(&c.split.x_test));
}

#[test]
fn unshuffled_split_takes_trailing_rows_as_test() {
    let frame = churn_frame(10);
    let outcome =
        run_train_test_split(&frame, &scope(), &decision(TestSize::Fraction(0.3), false, false))
            .unwrap();
    assert_eq!(tenure_values(&outcome.split.x_train), vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(tenure_values(&outcome.split.x_test), vec![7, 8, 9]);
}

#[test]
fn count_test_size_is_honored() {
    let frame = churn_frame(10);
    let outcome =
        run_train_test_split(&frame, &scope(), &decision(TestSize::Count(4), false, false))
            .unwrap();
    assert_eq!(outcome.split.x_test.row_count(), 4);
}

#[test]
fn risk_checks_confirm_scope_integrity() {
    let frame = churn_frame(30);
    let outcome =
        run_train_test_split(&frame, &scope(), &decision(TestSize::Fraction(0.2), true, false))
            .unwrap();

    let integrity = &outcome.diagnostics.risk_checks.scope_integrity;
    assert!(!integrity.target_in_x_train);
    assert!(!integrity.target_in_x_test);
    assert!(integrity.columns_match_scope_train);
    assert!(integrity.columns_match_scope_test);

    let balance = &outcome.diagnostics.risk_checks.target_balance;
    assert!(balance.min_class_rate_all > 0.0);
    assert!(balance.min_class_rate_all <= 0.5);
}

#[test]
fn target_distribution_compares_partitions() {
    let frame = churn_frame(30);
    let outcome =
        run_train_test_split(&frame, &scope(), &decision(TestSize::Fraction(0.2), true, true))
            .unwrap();

    let rows = &outcome.diagnostics.target_distribution;
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.count_all, row.count_train + row.count_test);
        assert!((row.rate_all - 1.0).abs() <= 1.0);
    }
    let total_all: usize = rows.iter().map(|r| r.count_all).sum();
    assert_eq!(total_all, 30);
}

#[test]
fn stratified_split_preserves_class_rates() {
    // 40 No / 20 Yes, test fraction 0.25 -> 15 rows: 10 No, 5 Yes
    let churn: Vec<String> = (0..60)
        .map(|i| if i < 20 { "Yes".to_string() } else { "No".to_string() })
        .collect();
    let frame = Frame::from_columns(vec![
        (
            "tenure".to_string(),
            Column::Int64(Int64Column::new((0..60).collect())),
        ),
        (
            "contract".to_string(),
            Column::String(StringColumn::new(vec!["m".to_string(); 60])),
        ),
        ("Churn".to_string(), Column::String(StringColumn::new(churn))),
    ])
    .unwrap();

    let outcome =
        run_train_test_split(&frame, &scope(), &decision(TestSize::Fraction(0.25), true, true))
            .unwrap();

    let yes_test = (0..outcome.split.y_test.len())
        .filter(|&i| outcome.split.y_test.value(i).unwrap().to_string() == "Yes")
        .count();
    assert_eq!(outcome.split.y_test.len(), 15);
    assert_eq!(yes_test, 5);
}

#[test]
fn decision_validation_is_exhaustive() {
    let frame = churn_frame(10);
    let scope = scope();

    // fraction bounds
    let mut d = decision(TestSize::Fraction(1.0), true, false);
    assert!(matches!(
        run_train_test_split(&frame, &scope, &d),
        Err(Error::DecisionValidation(_))
    ));
    d.test_size = TestSize::Fraction(0.0);
    assert!(run_train_test_split(&frame, &scope, &d).is_err());

    // count bounds: the whole table cannot be the test partition
    let d = decision(TestSize::Count(10), false, false);
    assert!(run_train_test_split(&frame, &scope, &d).is_err());

    // stratify without stratify_col
    let mut d = decision(TestSize::Fraction(0.3), true, true);
    d.stratify_col = None;
    assert!(matches!(
        run_train_test_split(&frame, &scope, &d),
        Err(Error::DecisionValidation(_))
    ));

    // stratify_col must equal the target
    let mut d = decision(TestSize::Fraction(0.3), true, true);
    d.stratify_col = Some("contract".to_string());
    assert!(matches!(
        run_train_test_split(&frame, &scope, &d),
        Err(Error::DecisionValidation(_))
    ));

    // stratify_col forbidden when stratify is off
    let mut d = decision(TestSize::Fraction(0.3), true, false);
    d.stratify_col = Some("Churn".to_string());
    assert!(matches!(
        run_train_test_split(&frame, &scope, &d),
        Err(Error::DecisionValidation(_))
    ));

    // stratification without shuffling is ambiguous; rejected
    let d = decision(TestSize::Fraction(0.3), false, true);
    assert!(matches!(
        run_train_test_split(&frame, &scope, &d),
        Err(Error::DecisionValidation(_))
    ));
}

#[test]
fn scope_mismatches_fail_before_any_work() {
    let frame = churn_frame(10);
    let bad_scope = Scope::new(vec!["tenure".to_string(), "ghost".to_string()], "Churn").unwrap();
    let err = run_train_test_split(
        &frame,
        &bad_scope,
        &decision(TestSize::Fraction(0.3), true, false),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ScopeViolation(_)));

    let no_target_scope = Scope::new(vec!["tenure".to_string()], "Missing").unwrap();
    let err = run_train_test_split(
        &frame,
        &no_target_scope,
        &decision(TestSize::Fraction(0.3), true, false),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ScopeViolation(_)));
}

#[test]
fn cardinality_audit_reports_partition_only_categories() {
    // contract has a category that only appears in the trailing rows,
    // which an unshuffled split sends entirely to test
    let contract: Vec<String> = (0..10)
        .map(|i| if i >= 7 { "rare".to_string() } else { "common".to_string() })
        .collect();
    let churn: Vec<String> = (0..10)
        .map(|i| if i % 2 == 0 { "Yes".to_string() } else { "No".to_string() })
        .collect();
    let frame = Frame::from_columns(vec![
        (
            "tenure".to_string(),
            Column::Int64(Int64Column::new((0..10).collect())),
        ),
        (
            "contract".to_string(),
            Column::String(StringColumn::new(contract)),
        ),
        ("Churn".to_string(), Column::String(StringColumn::new(churn))),
    ])
    .unwrap();

    let mut d = decision(TestSize::Fraction(0.3), false, false);
    d.audit_categorical_cardinality = true;
    let outcome = run_train_test_split(&frame, &scope(), &d).unwrap();

    let cardinality = outcome.diagnostics.categorical_cardinality.unwrap();
    let contract_row = cardinality.iter().find(|r| r.feature == "contract").unwrap();
    assert_eq!(contract_row.n_unique_train, 1);
    assert_eq!(contract_row.n_unique_test, 1);
    assert_eq!(contract_row.n_only_in_test, 1);
    assert_eq!(contract_row.n_only_in_train, 1);

    // only string features are audited
    assert!(cardinality.iter().all(|r| r.feature != "tenure"));
}

#[test]
fn input_frame_is_never_mutated() {
    let frame = churn_frame(10);
    run_train_test_split(&frame, &scope(), &decision(TestSize::Fraction(0.3), true, false))
        .unwrap();
    assert_eq!(frame.row_count(), 10);
    assert_eq!(tenure_values(&frame), (0..10).collect::<Vec<i64>>());
}
