//! Wire-level adapter tests against a local mock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vgen_models::{JobId, JobState};
use vgen_providers::{
    ImageJobSpec, PixverseAdapter, ProviderAdapter, ProviderError, RunwayAdapter, TextJobSpec,
    VeoAdapter, ViduAdapter,
};

fn text_spec(prompt: &str, aspect_ratio: &str, duration_secs: u32) -> TextJobSpec {
    TextJobSpec {
        prompt: prompt.to_string(),
        aspect_ratio: aspect_ratio.to_string(),
        duration_secs,
        with_audio: false,
    }
}

fn image_spec(aspect_ratio: &str, duration_secs: u32) -> ImageJobSpec {
    ImageJobSpec {
        image: vec![0xFF, 0xD8, 0xFF, 0xE0],
        prompt: Some("animate this".to_string()),
        aspect_ratio: aspect_ratio.to_string(),
        duration_secs,
        with_audio: false,
    }
}

#[tokio::test]
async fn test_veo_submit_text_sends_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generation/google/veo3-fast"))
        .and(header("x-api-key", "veo-key"))
        .and(body_partial_json(json!({
            "input": { "prompt": "a cat surfing", "length": 8, "aspectRatio": "16:9" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "taskId": "task-001" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = VeoAdapter::new("veo-key")
        .unwrap()
        .with_base_url(server.uri());
    let id = adapter
        .submit_text(&text_spec("a cat surfing", "16:9", 8))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "task-001");
}

#[tokio::test]
async fn test_veo_submit_image_uploads_then_generates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/file/upload-file"))
        .and(header("x-api-key", "veo-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileName": "frame-42.jpg"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generation/google/veo3-fast"))
        .and(body_partial_json(json!({
            "input": { "prompt": "animate this" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "taskId": "task-img" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = VeoAdapter::new("veo-key")
        .unwrap()
        .with_base_url(server.uri())
        .with_upload_base_url(server.uri());
    let id = adapter.submit_image(&image_spec("16:9", 8)).await.unwrap();
    assert_eq!(id.as_str(), "task-img");
}

#[tokio::test]
async fn test_veo_invalid_aspect_ratio_never_reaches_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = VeoAdapter::new("veo-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter
        .submit_text(&text_spec("a cat surfing", "21:9", 8))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidParameter(_)));
}

#[tokio::test]
async fn test_veo_status_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/generation/task-9/status"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let adapter = VeoAdapter::new("veo-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter.status(&JobId::new("task-9")).await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn test_veo_status_undecodable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/generation/task-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let adapter = VeoAdapter::new("veo-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter.status(&JobId::new("task-9")).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_runway_rejects_text_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = RunwayAdapter::new("rw-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter
        .submit_text(&text_spec("a cat surfing", "1280:720", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnsupportedOperation(_)));
}

#[tokio::test]
async fn test_runway_submit_image_sends_bearer_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/image_to_video"))
        .and(header("Authorization", "Bearer rw-key"))
        .and(header("X-Runway-Version", "2024-11-06"))
        .and(body_partial_json(json!({
            "model": "gen3a_turbo", "ratio": "1280:720", "duration": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "rw-77" })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = RunwayAdapter::new("rw-key")
        .unwrap()
        .with_base_url(server.uri());
    let id = adapter
        .submit_image(&image_spec("1280:720", 5))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "rw-77");
}

#[tokio::test]
async fn test_runway_api_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/image_to_video"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "ratio not allowed" })),
        )
        .mount(&server)
        .await;

    let adapter = RunwayAdapter::new("rw-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter
        .submit_image(&image_spec("1280:720", 5))
        .await
        .unwrap_err();
    match err {
        ProviderError::Api { code, message } => {
            assert_eq!(code, "400");
            assert_eq!(message, "ratio not allowed");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_runway_status_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let adapter = RunwayAdapter::new("rw-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter.status(&JobId::new("gone")).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound));
}

#[tokio::test]
async fn test_pixverse_submit_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openapi/v2/video/text/generate"))
        .and(header("API-KEY", "px-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ErrCode": 0,
            "ErrMsg": "",
            "Resp": { "video_id": 987654 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = PixverseAdapter::new("px-key")
        .unwrap()
        .with_base_url(server.uri());
    let id = adapter
        .submit_text(&text_spec("a cat surfing", "16:9", 5))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "987654");
}

#[tokio::test]
async fn test_pixverse_envelope_error_code_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openapi/v2/video/text/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ErrCode": 500054,
            "ErrMsg": "insufficient credits",
            "Resp": null
        })))
        .mount(&server)
        .await;

    let adapter = PixverseAdapter::new("px-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter
        .submit_text(&text_spec("a cat surfing", "16:9", 5))
        .await
        .unwrap_err();
    match err {
        ProviderError::Api { code, message } => {
            assert_eq!(code, "500054");
            assert_eq!(message, "insufficient credits");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pixverse_moderation_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openapi/v2/video/result/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ErrCode": 0,
            "ErrMsg": "",
            "Resp": { "status": 7 }
        })))
        .mount(&server)
        .await;

    let adapter = PixverseAdapter::new("px-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter.status(&JobId::new("42")).await.unwrap_err();
    assert!(matches!(err, ProviderError::ModerationRejected(_)));
}

#[tokio::test]
async fn test_pixverse_rejects_image_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = PixverseAdapter::new("px-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter
        .submit_image(&image_spec("16:9", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::UnsupportedOperation(_)));
}

#[tokio::test]
async fn test_vidu_submit_uses_token_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ent/v2/text2video"))
        .and(header("Authorization", "Token vd-key"))
        .and(body_partial_json(json!({
            "model": "viduq1", "resolution": "1080p", "duration": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "task_id": "vd-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ViduAdapter::new("vd-key")
        .unwrap()
        .with_base_url(server.uri());
    let id = adapter
        .submit_text(&text_spec("a cat surfing", "16:9", 5))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "vd-1");
}

#[tokio::test]
async fn test_vidu_success_with_empty_creations_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ent/v2/tasks/vd-1/creations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "success",
            "creations": []
        })))
        .mount(&server)
        .await;

    let adapter = ViduAdapter::new("vd-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter.status(&JobId::new("vd-1")).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_vidu_status_success_flow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ent/v2/tasks/vd-1/creations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "state": "success",
            "creations": [{
                "url": "https://cdn/clip.mp4",
                "video": { "resolution": { "width": 1280, "height": 720 } }
            }]
        })))
        .mount(&server)
        .await;

    let adapter = ViduAdapter::new("vd-key")
        .unwrap()
        .with_base_url(server.uri());
    let result = adapter.status(&JobId::new("vd-1")).await.unwrap();
    assert_eq!(result.state, JobState::Succeeded);
    assert_eq!(result.media_url.as_deref(), Some("https://cdn/clip.mp4"));
}

#[tokio::test]
async fn test_vidu_remote_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ent/v2/task/vd-1/cancel"))
        .and(header("Authorization", "Token vd-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ViduAdapter::new("vd-key")
        .unwrap()
        .with_base_url(server.uri());
    assert!(adapter.cancel(&JobId::new("vd-1")).await.unwrap());
}

#[tokio::test]
async fn test_auth_failure_on_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/t-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let adapter = RunwayAdapter::new("rw-key")
        .unwrap()
        .with_base_url(server.uri());
    let err = adapter.status(&JobId::new("t-1")).await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthFailure(_)));
}

#[test]
fn test_empty_api_key_is_config_error() {
    assert!(matches!(
        VeoAdapter::new("  "),
        Err(ProviderError::Config(_))
    ));
    assert!(matches!(
        RunwayAdapter::new(""),
        Err(ProviderError::Config(_))
    ));
}
