use super::*;

#[test]
fn status_429_is_resource_exhausted() {
    let kind = classify_http_failure(429, "Too Many Requests");
    assert_eq!(
        kind,
        GatewayErrorKind::ResourceExhausted("Too Many Requests".into())
    );
    assert!(kind.is_resource_exhausted());
}

#[test]
fn rpc_status_in_json_body_is_resource_exhausted() {
    let body = r#"{"error":{"code":400,"message":"You exceeded your current quota","status":"RESOURCE_EXHAUSTED"}}"#;
    assert_eq!(
        classify_http_failure(400, body),
        GatewayErrorKind::ResourceExhausted("You exceeded your current quota".into())
    );
}

#[test]
fn other_statuses_keep_provider_message() {
    let body = r#"{"error":{"code":400,"message":"Invalid argument","status":"INVALID_ARGUMENT"}}"#;
    assert_eq!(
        classify_http_failure(400, body),
        GatewayErrorKind::Http {
            status: 400,
            message: "Invalid argument".into()
        }
    );
    assert_eq!(
        classify_http_failure(503, " upstream down \n"),
        GatewayErrorKind::Http {
            status: 503,
            message: "upstream down".into()
        }
    );
}

#[test]
fn operation_errors_are_classified() {
    assert!(classify_operation_error(Some(8), "try later").is_resource_exhausted());
    assert!(classify_operation_error(None, "Quota exceeded for veo").is_resource_exhausted());
    assert!(
        classify_operation_error(Some(3), "Prompt blocked by Responsible AI filters").is_blocked()
    );
    assert_eq!(
        classify_operation_error(Some(13), "internal"),
        GatewayErrorKind::Operation("internal".into())
    );
}

#[test]
fn only_refusal_finish_reasons_block() {
    assert!(classify_finish_reason("SAFETY").is_some_and(|k| k.is_blocked()));
    assert!(classify_finish_reason("IMAGE_SAFETY").is_some());
    assert!(classify_finish_reason("STOP").is_none());
    assert!(classify_finish_reason("MAX_TOKENS").is_none());
}
