//! Numeric ordering of toolchain version labels.

use std::num::IntErrorKind;

use crate::core::schema::ToolchainVersion;
use crate::{HarnessError, HarnessResult};

/// Split a dot-separated label into numeric components.
///
/// Every field must parse as a `u64`; `15.0b1`, an empty label, or a field too large for
/// `u64` is rejected.
pub fn parse_version_label(label: &str) -> HarnessResult<Vec<u64>> {
    label
        .split('.')
        .map(|field| {
            field.trim().parse::<u64>().map_err(|e| {
                let reason = match e.kind() {
                    IntErrorKind::PosOverflow => "is out of range",
                    _ => "is not numeric",
                };
                HarnessError::MalformedVersionLabel {
                    label: label.to_string(),
                    field: field.to_string(),
                    reason: reason.to_string(),
                }
            })
        })
        .collect()
}

/// Sort toolchains ascending by their numeric version components.
///
/// Labels are compared component-wise, so `15.2` sorts before `15.10`. Records with equal
/// labels keep their discovery order.
pub fn order_versions(records: &[ToolchainVersion]) -> HarnessResult<Vec<ToolchainVersion>> {
    let mut keyed = records
        .iter()
        .map(|r| parse_version_label(&r.version).map(|key| (key, r.clone())))
        .collect::<HarnessResult<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, r)| r).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(version: &str) -> ToolchainVersion {
        ToolchainVersion::new(format!("/Applications/Xcode-{version}.app"), version, false)
    }

    #[test]
    fn test_parse_version_label() {
        assert_eq!(parse_version_label("15.2").unwrap(), vec![15, 2]);
        assert_eq!(parse_version_label("14.3.1").unwrap(), vec![14, 3, 1]);
        assert_eq!(parse_version_label("16").unwrap(), vec![16]);
    }

    #[test]
    fn test_parse_version_label_rejects_qualifiers() {
        let err = parse_version_label("16.0b3").unwrap_err();
        match err {
            HarnessError::MalformedVersionLabel { label, field, reason } => {
                assert_eq!(label, "16.0b3");
                assert_eq!(field, "0b3");
                assert_eq!(reason, "is not numeric");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse_version_label("").is_err());
        assert!(parse_version_label("15..2").is_err());
    }

    #[test]
    fn test_parse_version_label_reports_overflow() {
        let err = parse_version_label("15.99999999999999999999").unwrap_err();
        match &err {
            HarnessError::MalformedVersionLabel { field, reason, .. } => {
                assert_eq!(field, "99999999999999999999");
                assert_eq!(reason, "is out of range");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("is out of range"));
        assert_eq!(
            parse_version_label("15.18446744073709551615").unwrap(),
            vec![15, u64::MAX]
        );
    }

    #[test]
    fn test_order_is_numeric_not_lexical() {
        let ordered = order_versions(&[tc("15.10"), tc("15.2"), tc("9.4"), tc("15.2.1")]).unwrap();
        let labels: Vec<&str> = ordered.iter().map(|t| t.version.as_str()).collect();
        assert_eq!(labels, vec!["9.4", "15.2", "15.2.1", "15.10"]);
    }

    #[test]
    fn test_order_is_monotonic() {
        let input = vec![tc("13.1"), tc("16.0"), tc("14.3.1"), tc("14.3"), tc("13.1"), tc("15.4")];
        let ordered = order_versions(&input).unwrap();
        assert_eq!(ordered.len(), input.len());
        for pair in ordered.windows(2) {
            let a = parse_version_label(&pair[0].version).unwrap();
            let b = parse_version_label(&pair[1].version).unwrap();
            assert!(a <= b, "{:?} should not sort after {:?}", a, b);
        }
    }

    #[test]
    fn test_equal_labels_keep_discovery_order() {
        let first = ToolchainVersion::new("/Applications/Xcode.app", "15.2", false);
        let second = ToolchainVersion::new("/Applications/Xcode-copy.app", "15.2", false);
        let ordered = order_versions(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(ordered, vec![first, second]);
    }

    #[test]
    fn test_order_fails_on_any_malformed_label() {
        let result = order_versions(&[tc("15.2"), tc("16.0-beta")]);
        assert!(matches!(result, Err(HarnessError::MalformedVersionLabel { .. })));
    }

    #[test]
    fn test_order_empty() {
        assert!(order_versions(&[]).unwrap().is_empty());
    }
}
