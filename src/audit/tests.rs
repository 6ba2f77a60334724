//! Tests for audit module

use super::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use test_case::test_case;

fn field_error(field: &str, message: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(field.to_string(), message.to_string())])
}

#[test_case(0, 0, ConvertStatus::Success; "empty job succeeds")]
#[test_case(0, 10, ConvertStatus::Success; "no failures")]
#[test_case(3, 10, ConvertStatus::PartialSuccess; "some failures")]
#[test_case(10, 10, ConvertStatus::Failed; "all rows failed")]
fn test_classify(failures: u64, total: u64, expected: ConvertStatus) {
    assert_eq!(ConvertStatus::classify(failures, total), expected);
}

#[test]
fn test_status_strings() {
    for status in [
        ConvertStatus::Success,
        ConvertStatus::PartialSuccess,
        ConvertStatus::Failed,
    ] {
        assert_eq!(status.to_string().parse::<ConvertStatus>().unwrap(), status);
    }
    assert!("DONE".parse::<ConvertStatus>().is_err());
}

#[test]
fn test_snapshot() {
    let mut log = AuditLog::new();
    assert_eq!(log.snapshot(), AuditSnapshot::default());

    log.record_success();
    log.record_failure(1, field_error("f0", "bad"));
    let snapshot = log.snapshot();
    assert_eq!(snapshot.failure_count, 1);
    assert!((snapshot.failure_percentage - 50.0).abs() < f64::EPSILON);
}

#[test]
fn test_finalize() {
    let mut log = AuditLog::new();
    log.record_success();
    log.record_failure(1, field_error("f2", "Input data x is not a valid double data"));
    log.record_success();

    let result = log.finalize(3);
    assert_eq!(result.status(), ConvertStatus::PartialSuccess);
    assert_eq!(result.total_count, 3);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.failure_count, 1);
    assert_eq!(
        result.row_errors(1).and_then(|e| e.get("f2")).map(String::as_str),
        Some("Input data x is not a valid double data")
    );
    assert!(result.row_errors(0).is_none());
}

#[test]
fn test_convert_result_json() {
    let mut log = AuditLog::new();
    log.record_failure(11, field_error("f0", "bad"));
    let result = log.finalize(12);

    let json = result.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["result"], "PARTIAL_SUCCESS");
    assert_eq!(value["total_count"], 12);
    assert_eq!(value["failure_count"], 1);
    assert_eq!(value["success_count"], 0);
    assert_eq!(value["errors"]["11"]["f0"], "bad");

    assert_eq!(ConvertResult::from_json(&json).unwrap(), result);
}

#[test]
fn test_convert_result_tolerates_unknown_fields() {
    let json = r#"{"total_count": 2, "failure_count": 0, "success_count": 2, "extra": true}"#;
    let result = ConvertResult::from_json(json).unwrap();
    assert_eq!(result.result, None);
    assert_eq!(result.status(), ConvertStatus::Success);
}
