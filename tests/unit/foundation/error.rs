use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AdreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(AdreelError::media("x").to_string().contains("media error:"));
    assert!(AdreelError::config("x").to_string().contains("config error:"));
    assert!(
        AdreelError::from(ComposeFailure::EmptyOutput)
            .to_string()
            .contains("composition error:")
    );
    assert!(
        AdreelError::from(GatewayErrorKind::MissingApiKey)
            .to_string()
            .contains("gateway error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AdreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn kind_accessors_match_variant() {
    let err = AdreelError::from(GatewayErrorKind::ResourceExhausted("quota".into()));
    assert!(matches!(
        err.gateway_kind(),
        Some(GatewayErrorKind::ResourceExhausted(_))
    ));
    assert!(err.compose_failure().is_none());

    let err = AdreelError::from(ComposeFailure::NoClips);
    assert_eq!(err.compose_failure(), Some(&ComposeFailure::NoClips));
    assert!(err.gateway_kind().is_none());
}
