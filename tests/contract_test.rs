use std::io::Write;

use churnprep::column::{Column, Int64Column, StringColumn};
use churnprep::contract::{enforce_contract, load_contract_yaml, parse_contract_yaml, Scope};
use churnprep::error::Error;
use churnprep::frame::Frame;

const CONTRACT_YAML: &str = r#"
name: telco-churn
version: 2
schema:
  target: Churn
  features:
    - tenure
    - Contract
    - tenure
  id_columns:
    - customerID
  drop_columns: []
"#;

#[test]
fn parse_contract_validates_and_dedupes() {
    let contract = parse_contract_yaml(CONTRACT_YAML, "fallback").unwrap();
    assert_eq!(contract.name, "telco-churn");
    assert_eq!(contract.version, 2);
    assert_eq!(contract.target, "Churn");
    // duplicate "tenure" removed, first occurrence order preserved
    assert_eq!(contract.features, vec!["tenure", "Contract"]);
    assert_eq!(contract.id_columns, vec!["customerID"]);
    assert!(contract.drop_columns.is_empty());

    let scope = contract.to_scope().unwrap();
    assert_eq!(scope.features(), &["tenure", "Contract"]);
    assert_eq!(scope.target(), "Churn");
}

#[test]
fn parse_contract_defaults_name_and_version() {
    let yaml = "schema:\n  target: Churn\n  features: [tenure]\n";
    let contract = parse_contract_yaml(yaml, "my-contract").unwrap();
    assert_eq!(contract.name, "my-contract");
    assert_eq!(contract.version, 1);
}

#[test]
fn parse_contract_rejects_missing_required_fields() {
    let no_target = "schema:\n  features: [tenure]\n";
    let err = parse_contract_yaml(no_target, "c").unwrap_err();
    assert!(matches!(err, Error::Schema(_)), "got {:?}", err);
    assert!(err.to_string().contains("schema.target"));

    let no_features = "schema:\n  target: Churn\n";
    let err = parse_contract_yaml(no_features, "c").unwrap_err();
    assert!(err.to_string().contains("schema.features"));

    let empty_features = "schema:\n  target: Churn\n  features: []\n";
    assert!(parse_contract_yaml(empty_features, "c").is_err());
}

#[test]
fn parse_contract_rejects_target_inside_features() {
    let yaml = "schema:\n  target: Churn\n  features: [tenure, Churn]\n";
    let err = parse_contract_yaml(yaml, "c").unwrap_err();
    assert!(err.to_string().contains("Churn"));
}

#[test]
fn parse_contract_rejects_malformed_fields() {
    assert!(parse_contract_yaml("- just\n- a list\n", "c").is_err());
    assert!(parse_contract_yaml("", "c").is_err());

    let bad_item = "schema:\n  target: Churn\n  features: [tenure, 42]\n";
    assert!(parse_contract_yaml(bad_item, "c").is_err());

    let bad_version = "version: nope\nschema:\n  target: Churn\n  features: [tenure]\n";
    assert!(parse_contract_yaml(bad_version, "c").is_err());
}

#[test]
fn load_contract_reads_file_and_uses_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bank_churn.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "schema:\n  target: Exited\n  features: [Age, Balance]\n").unwrap();

    let contract = load_contract_yaml(&path).unwrap();
    assert_eq!(contract.name, "bank_churn");
    assert_eq!(contract.target, "Exited");
    assert_eq!(contract.features, vec!["Age", "Balance"]);
}

fn sample_frame() -> Frame {
    Frame::from_columns(vec![
        (
            "b".to_string(),
            Column::Int64(Int64Column::new(vec![1, 2])),
        ),
        (
            "a".to_string(),
            Column::String(StringColumn::new(vec!["x".to_string(), "y".to_string()])),
        ),
        (
            "c".to_string(),
            Column::Int64(Int64Column::new(vec![3, 4])),
        ),
    ])
    .unwrap()
}

#[test]
fn enforce_contract_partitions_columns() {
    let frame = sample_frame();
    let expected = vec!["a".to_string(), "b".to_string(), "z".to_string()];

    let result = enforce_contract(&frame, &expected, false).unwrap();
    assert_eq!(result.kept, vec!["a", "b"]);
    assert_eq!(result.missing, vec!["z"]);
    assert_eq!(result.dropped, vec!["c"]);
    // kept order follows the contract, not the table
    assert_eq!(result.frame.column_names(), &["a", "b"]);
    assert_eq!(result.snapshot_before.col_count, 3);
    assert_eq!(result.snapshot_after.col_count, 2);
    assert_eq!(result.snapshot_after.row_count, 2);

    // the input frame is untouched
    assert_eq!(frame.column_names(), &["b", "a", "c"]);
}

#[test]
fn enforce_contract_strict_fails_on_missing() {
    let frame = sample_frame();
    let expected = vec!["a".to_string(), "z".to_string()];
    let err = enforce_contract(&frame, &expected, true).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));

    // non-strict proceeds with what is present
    assert!(enforce_contract(&frame, &expected, false).is_ok());
}

#[test]
fn scope_invariants_hold() {
    assert!(Scope::new(vec!["a".to_string()], "y").is_ok());
    assert!(Scope::new(vec!["y".to_string()], "y").is_err());
    assert!(Scope::new(vec![], "y").is_err());
    assert!(Scope::new(vec!["a".to_string()], "").is_err());
}
