use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(LipsyncError::input("x").to_string().contains("input error:"));
    assert!(
        LipsyncError::recognizer("x")
            .to_string()
            .contains("recognizer unavailable:")
    );
    assert!(
        LipsyncError::transcode("x")
            .to_string()
            .contains("transcode error:")
    );
    assert!(LipsyncError::render("x").to_string().contains("render error:"));
    assert!(LipsyncError::mux("x").to_string().contains("mux error:"));
    assert!(
        LipsyncError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn recoverable_kinds() {
    assert!(LipsyncError::recognizer("x").is_recoverable());
    assert!(LipsyncError::geometry("x").is_recoverable());
    assert!(LipsyncError::mux("x").is_recoverable());
    assert!(!LipsyncError::render("x").is_recoverable());
    assert!(!LipsyncError::input("x").is_recoverable());
    assert!(!LipsyncError::Cancelled.is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LipsyncError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
