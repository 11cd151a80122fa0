use super::*;
use std::error::Error as _;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StagehandError::load("x")
            .to_string()
            .contains("load error:")
    );
    assert!(
        StagehandError::object("x")
            .to_string()
            .contains("object error:")
    );
    assert!(
        StagehandError::execution("x")
            .to_string()
            .contains("execution error:")
    );
}

#[test]
fn wrapped_cause_is_preserved() {
    let base = std::io::Error::other("boom");
    let err = StagehandError::load_with("read failed", base);
    assert!(err.is_load());
    let source = err.source().expect("source");
    assert_eq!(source.to_string(), "boom");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StagehandError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_object());
}
