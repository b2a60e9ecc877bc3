// src/tests/datekey_tests.rs

#![allow(non_snake_case)]

use crate::common::ExtractError;

use crate::data::datekey::{DateKey, DATE_KEY_SZ};

use ::test_case::test_case;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test_case("2024-12-02"; "ordinary")]
#[test_case("2024-02-29"; "leap day")]
#[test_case("1999-01-01"; "last century")]
fn test_DateKey_from_target_ok(target: &str) {
    let key = DateKey::from_target(target).unwrap();
    assert_eq!(key.as_bytes(), target.as_bytes());
    assert_eq!(key.to_string(), target);
}

#[test_case(""; "empty")]
#[test_case("2024-12-2"; "too short")]
#[test_case("2024-12-021"; "too long")]
#[test_case("2024-13-01"; "month 13")]
#[test_case("2023-02-29"; "not a leap year")]
#[test_case("2024/12/02"; "wrong separators")]
#[test_case("yesterday!"; "not a date at all")]
fn test_DateKey_from_target_rejected(target: &str) {
    let result = DateKey::from_target(target);
    assert!(
        matches!(result, Err(ExtractError::InvalidTargetDate { .. })),
        "expected InvalidTargetDate for {:?}, got {:?}",
        target,
        result,
    );
}

#[test]
fn test_DateKey_from_line_prefix_ok() {
    let prefix: &[u8; DATE_KEY_SZ] = b"2024-12-02";
    let key = DateKey::from_line_prefix(prefix, 0).unwrap();
    assert_eq!(key.as_bytes(), prefix);
}

#[test]
fn test_DateKey_from_line_prefix_shape_only() {
    // calendar correctness is not checked for probe lines, only shape
    let prefix: &[u8; DATE_KEY_SZ] = b"2024-19-99";
    assert!(DateKey::from_line_prefix(prefix, 0).is_ok());
}

#[test_case(b"BADLINE NO"; "no digits")]
#[test_case(b"2024_12_02"; "wrong separators")]
#[test_case(b"2024-12- 2"; "space for digit")]
#[test_case(b"\xFF\xFF\xFF\xFF-\xFF\xFF-\xFF\xFF"; "not utf8")]
fn test_DateKey_from_line_prefix_rejected(prefix: &[u8; DATE_KEY_SZ]) {
    let result = DateKey::from_line_prefix(prefix, 33);
    match result {
        Err(ExtractError::InvalidDateFormat { offset, .. }) => {
            assert_eq!(offset, 33, "error should carry the passed offset");
        }
        _ => panic!("expected InvalidDateFormat, got {:?}", result),
    }
}

#[test]
fn test_DateKey_ordering_is_chronological() {
    let a = DateKey::from_target("2023-12-31").unwrap();
    let b = DateKey::from_target("2024-01-01").unwrap();
    let c = DateKey::from_target("2024-01-02").unwrap();
    assert!(a < b);
    assert!(b < c);
    assert!(a < c);
    assert_eq!(b, DateKey::from_target("2024-01-01").unwrap());
}
