use evtrack::error::TrackerError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(
        TrackerError::config("x"),
        TrackerError::Config { .. }
    ));
    assert!(matches!(
        TrackerError::storage("x"),
        TrackerError::Storage { .. }
    ));
    assert!(matches!(TrackerError::io("x"), TrackerError::Io { .. }));
}

#[test]
fn error_constructors_group_2() {
    let ser = TrackerError::Serialization {
        message: "s".into(),
    };
    assert!(matches!(ser, TrackerError::Serialization { .. }));
    assert!(matches!(
        TrackerError::validation("f", "m"),
        TrackerError::Validation { .. }
    ));
    assert!(matches!(
        TrackerError::generic("x"),
        TrackerError::Generic { .. }
    ));
}

#[test]
fn json_errors_become_serialization_errors() {
    let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let e: TrackerError = err.into();
    assert!(e.to_string().contains("Serialization error"));
}

#[test]
fn display_messages() {
    let e = TrackerError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
}
