use std::time::Duration;

use imagegen_core::{GenerationRequest, ImageSource};
use imagegen_engine::{ClientSettings, FailureKind, ImageGenerator, ReqwestImageGenerator};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> ClientSettings {
    ClientSettings {
        endpoint: format!("{}/v1/images/generations", server.uri()),
        ..ClientSettings::new("test-key")
    }
}

fn request() -> GenerationRequest {
    GenerationRequest::from_form("a red fox", "blurry", "16:9", 15.0).unwrap()
}

#[tokio::test]
async fn posts_json_body_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "model": "gpt-image-1",
            "prompt": "a red fox",
            "size": "1792x1024",
            "quality": "high",
            "negative_prompt": "blurry",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "b64_json": "ZZZ" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let generator = ReqwestImageGenerator::new(settings(&server));
    let source = generator.generate(&request()).await.expect("generate ok");

    assert_eq!(source, ImageSource::inline_png("ZZZ"));
}

#[tokio::test]
async fn remote_url_dialect_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "imageUrl": "https://cdn.example.com/a.png",
            "images": ["b64data"],
        })))
        .mount(&server)
        .await;

    let generator = ReqwestImageGenerator::new(settings(&server));
    let source = generator.generate(&request()).await.unwrap();

    assert_eq!(
        source,
        ImageSource::RemoteUrl("https://cdn.example.com/a.png".to_string())
    );
}

#[tokio::test]
async fn error_status_surfaces_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("{\"error\":\"content policy\"}"),
        )
        .mount(&server)
        .await;

    let generator = ReqwestImageGenerator::new(settings(&server));
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.message, "{\"error\":\"content policy\"}");
}

#[tokio::test]
async fn error_status_without_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let generator = ReqwestImageGenerator::new(settings(&server));
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.message, "Request failed with status 503");
}

#[tokio::test]
async fn unknown_shape_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let generator = ReqwestImageGenerator::new(settings(&server));
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::UnrecognizedResponseShape);
}

#[tokio::test]
async fn non_json_success_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let generator = ReqwestImageGenerator::new(settings(&server));
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn configured_timeout_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "imageUrl": "https://x/a.png" })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..settings(&server)
    };
    let generator = ReqwestImageGenerator::new(settings);
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn invalid_endpoint_fails_before_sending() {
    let settings = ClientSettings {
        endpoint: "not a url".to_string(),
        ..ClientSettings::new("test-key")
    };
    let generator = ReqwestImageGenerator::new(settings);
    let err = generator.generate(&request()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidEndpoint);
}
