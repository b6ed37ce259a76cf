use hatch_kernel::{TagGuard, TagGuardError};

#[test]
fn tag_guard_accepts_widget_tags_and_rejects_plain_names() {
    assert!(TagGuard::verify("hello-widget").is_ok());

    let err = TagGuard::verify("hello").expect_err("a name without hyphen is not custom");
    assert!(matches!(err, TagGuardError::Validation { .. }));

    assert!(TagGuard::verify("missing-glyph").is_err());
}
