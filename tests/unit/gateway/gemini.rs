use super::*;
use base64::Engine as _;

fn response(json: &str) -> GenerateContentResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn extract_inline_picks_first_matching_part() {
    let data = STANDARD.encode([1u8, 2, 3]);
    let resp = response(&format!(
        r#"{{"candidates":[{{"content":{{"parts":[
            {{"text":"here you go"}},
            {{"inlineData":{{"mimeType":"image/png","data":"{data}"}}}}
        ]}},"finishReason":"STOP"}}]}}"#
    ));
    let asset = extract_inline(&resp, "image/", "image").unwrap();
    assert_eq!(asset.content_type(), "image/png");
    assert_eq!(asset.bytes(), Some(&[1u8, 2, 3][..]));
}

#[test]
fn extract_inline_without_payload_is_empty_response() {
    let resp = response(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
    assert_eq!(
        extract_inline(&resp, "image/", "image").unwrap_err(),
        GatewayErrorKind::EmptyResponse("image".into())
    );
}

#[test]
fn extract_inline_rejects_bad_base64() {
    let resp = response(
        r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"audio/L16;rate=24000","data":"!!!"}}]}}]}"#,
    );
    assert!(matches!(
        extract_inline(&resp, "audio/", "audio").unwrap_err(),
        GatewayErrorKind::Malformed(_)
    ));
}

#[test]
fn prompt_feedback_block_is_reported() {
    let resp = response(
        r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY","blockReasonMessage":"unsafe prompt"}}"#,
    );
    assert_eq!(
        extract_text(&resp).unwrap_err(),
        GatewayErrorKind::Blocked("unsafe prompt".into())
    );
}

#[test]
fn safety_finish_reason_is_blocked() {
    let resp = response(r#"{"candidates":[{"finishReason":"IMAGE_SAFETY"}]}"#);
    assert!(extract_inline(&resp, "image/", "image").unwrap_err().is_blocked());
}

#[test]
fn extract_text_joins_and_trims_parts() {
    let resp = response(
        r#"{"candidates":[{"content":{"parts":[{"text":"  Hello "},{"text":"world\n"}]}}]}"#,
    );
    assert_eq!(extract_text(&resp).unwrap(), "Hello world");
}

#[test]
fn extract_text_on_blank_answer_is_empty_response() {
    let resp = response(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#);
    assert_eq!(
        extract_text(&resp).unwrap_err(),
        GatewayErrorKind::EmptyResponse("text".into())
    );
}

#[test]
fn labels_match_case_insensitively() {
    let labels = ["female", "male"];
    assert_eq!(extract_label("Male", &labels).unwrap(), "male");
    assert_eq!(extract_label("\"female\".", &labels).unwrap(), "female");
    assert!(matches!(
        extract_label("unknown", &labels).unwrap_err(),
        GatewayErrorKind::Malformed(_)
    ));
}

fn operation(json: &str) -> Operation {
    serde_json::from_str(json).unwrap()
}

#[test]
fn unfinished_operation_is_pending() {
    let op = operation(r#"{"name":"models/veo/operations/abc","done":false}"#);
    assert_eq!(interpret_operation(&op).unwrap(), VideoPoll::Pending);
    let op = operation(r#"{"name":"models/veo/operations/abc"}"#);
    assert_eq!(interpret_operation(&op).unwrap(), VideoPoll::Pending);
}

#[test]
fn finished_operation_yields_video_uri() {
    let op = operation(
        r#"{"name":"op","done":true,"response":{"generateVideoResponse":{"generatedSamples":[{"video":{"uri":"https://example.test/v.mp4"}}]}}}"#,
    );
    match interpret_operation(&op).unwrap() {
        VideoPoll::Done(Some(asset)) => {
            assert_eq!(asset.content_type(), "video/mp4");
            assert_eq!(
                asset.payload(),
                &crate::assets::asset::AssetPayload::Url("https://example.test/v.mp4".into())
            );
        }
        other => panic!("unexpected poll result: {other:?}"),
    }
}

#[test]
fn finished_operation_with_inline_bytes() {
    let b64 = STANDARD.encode(b"mp4data");
    let op = operation(&format!(
        r#"{{"name":"op","done":true,"response":{{"generateVideoResponse":{{"generatedSamples":[{{"video":{{"bytesBase64Encoded":"{b64}"}}}}]}}}}}}"#
    ));
    match interpret_operation(&op).unwrap() {
        VideoPoll::Done(Some(asset)) => assert_eq!(asset.bytes(), Some(&b"mp4data"[..])),
        other => panic!("unexpected poll result: {other:?}"),
    }
}

#[test]
fn finished_operation_without_samples_has_no_video() {
    let op = operation(r#"{"name":"op","done":true,"response":{"generateVideoResponse":{}}}"#);
    assert_eq!(interpret_operation(&op).unwrap(), VideoPoll::Done(None));
}

#[test]
fn filtered_video_is_blocked() {
    let op = operation(
        r#"{"name":"op","done":true,"response":{"generateVideoResponse":{"raiMediaFilteredCount":1,"raiMediaFilteredReasons":["person generation not allowed"]}}}"#,
    );
    assert_eq!(
        interpret_operation(&op).unwrap_err(),
        GatewayErrorKind::Blocked("person generation not allowed".into())
    );
}

#[test]
fn operation_quota_error_is_resource_exhausted() {
    let op = operation(
        r#"{"name":"op","done":true,"error":{"code":8,"message":"Resource has been exhausted (e.g. check quota)."}}"#,
    );
    assert!(interpret_operation(&op).unwrap_err().is_resource_exhausted());
}

#[test]
fn request_serializes_camel_case() {
    let req = GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".into()),
            parts: vec![text_part("hi")],
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".into()]),
            ..GenerationConfig::default()
        }),
    };
    let v = serde_json::to_value(&req).unwrap();
    assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
    assert_eq!(v["generationConfig"]["responseModalities"][0], "AUDIO");
    assert!(v["generationConfig"].get("speechConfig").is_none());
    assert!(v["contents"][0]["parts"][0].get("inlineData").is_none());
}

#[test]
fn blank_api_key_is_rejected() {
    let err = GeminiGateway::new("  ", GatewayConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AdreelError::Gateway(GatewayErrorKind::MissingApiKey)
    ));
}

#[test]
fn model_urls_follow_base() {
    let cfg = GatewayConfig {
        base_url: "http://localhost:9/v1beta/".into(),
        ..GatewayConfig::default()
    };
    let gw = GeminiGateway::new("key", cfg).unwrap();
    assert_eq!(
        gw.model_url("m", "generateContent"),
        "http://localhost:9/v1beta/models/m:generateContent"
    );
}
