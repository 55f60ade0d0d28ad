//! Router-level tests against a scripted upstream

mod helpers;

use axum::http::{header, StatusCode};
use helpers::*;
use std::time::Duration;

#[tokio::test]
async fn test_chat_relays_user_input() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    let (status, headers, body) = get(&app.router, "/api/OmoshiroikotoItte?userInput=abcd").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("[{}] abcd", SYSTEM_ROLE));
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn test_cors_headers_on_error_responses() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    let (status, headers, _) = get(&app.router, "/api/image/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
}

#[tokio::test]
async fn test_chat_decodes_percent_encoded_input() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    let (status, _, body) = get(
        &app.router,
        "/api/OmoshiroikotoItte?userInput=%EB%A7%88%EB%B2%95%20spell",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("[{}] 마법 spell", SYSTEM_ROLE));
}

#[tokio::test]
async fn test_chat_uses_default_prompt_without_input() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    let (status, _, body) = get(&app.router, "/api/OmoshiroikotoItte").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("[{}] {}", SYSTEM_ROLE, DEFAULT_PROMPT));

    let (_, _, body) = get(&app.router, "/api/OmoshiroikotoItte?userInput=").await;
    assert_eq!(body["message"], format!("[{}] {}", SYSTEM_ROLE, DEFAULT_PROMPT));
}

#[tokio::test]
async fn test_chat_upstream_failure_is_reported() {
    let app = test_app(MockUpstream::failing_chat("rate limited"));

    let (status, _, body) = get(&app.router, "/api/OmoshiroikotoItte?userInput=hi").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "rate limited");
}

#[tokio::test]
async fn test_non_get_is_rejected() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    for uri in ["/api/OmoshiroikotoItte", "/api/image", "/somewhere/else"] {
        let (status, _, body) = send(&app.router, "POST", uri).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        assert_eq!(body["error"], "Method Not Allowed");
    }
}

#[tokio::test]
async fn test_unknown_path_gets_greeting() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    let (status, _, body) = get(&app.router, "/api/nothing-here").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello from oracle-relay!");
}

#[tokio::test]
async fn test_spell_returns_structured_object() {
    let app = test_app(MockUpstream::new(Ok("https://img/unused")));

    let (status, _, body) = get(&app.router, "/api/spell?userInput=fire").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Emberlight");
    assert_eq!(body["incantation"], "Ignis parvus");
}

#[tokio::test]
async fn test_spell_rejects_off_schema_output() {
    let mut upstream = MockUpstream::new(Ok("https://img/unused"));
    upstream.spell = serde_json::json!({ "name": "Half a spell" });
    let app = test_app(upstream);

    let (status, _, body) = get(&app.router, "/api/spell").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("Malformed"));
}

#[tokio::test]
async fn test_image_job_completes() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    let (status, _, body) = get(&app.router, "/api/image?prompt=a%20red%20fox").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let (status, _, body) = get(&app.router, &format!("/api/image/{}", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "pending" }));

    app.upstream.release.notify_one();
    let body = poll_until_finished(&app.router, &job_id).await;
    assert_eq!(
        body,
        serde_json::json!({ "status": "complete", "url": "https://img/abc" })
    );

    let (status, headers, _) = get(&app.router, &format!("/api/image/{}/result", job_id)).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "https://img/abc");
}

#[tokio::test]
async fn test_image_job_records_upstream_error() {
    let app = test_app(MockUpstream::new(Err("rate limited")));

    let (_, _, body) = get(&app.router, "/api/image?prompt=a%20red%20fox").await;
    let job_id = body["jobId"].as_str().unwrap().to_string();

    app.upstream.release.notify_one();
    let body = poll_until_finished(&app.router, &job_id).await;
    assert_eq!(
        body,
        serde_json::json!({ "status": "error", "error": "rate limited" })
    );

    let (status, _, body) = get(&app.router, &format!("/api/image/{}/result", job_id)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "rate limited");

    // Reported the same way on every poll
    let (_, _, again) = get(&app.router, &format!("/api/image/{}", job_id)).await;
    assert_eq!(again["status"], "error");
}

#[tokio::test]
async fn test_result_of_pending_job_is_accepted() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    let (_, _, body) = get(&app.router, "/api/image?prompt=owl").await;
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let (status, headers, body) = get(&app.router, &format!("/api/image/{}/result", job_id)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(headers.get(header::LOCATION).is_none());
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    let (status, _, _) = get(&app.router, "/api/image/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    get(&app.router, "/api/image?prompt=owl").await;

    let (status, _, body) = get(&app.router, "/api/image/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("does-not-exist"));

    let (status, _, _) = get(&app.router, "/api/image/does-not-exist/result").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_image_job_requires_prompt() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    let (status, _, body) = get(&app.router, "/api/image").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(app.jobs.is_empty().await);
}

#[tokio::test]
async fn test_image_job_rejects_unknown_size() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    let (status, _, _) = get(&app.router, "/api/image?prompt=owl&size=3x3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(&app.router, "/api/image?prompt=owl&size=512x512").await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_full_store_returns_unavailable() {
    let app = test_app_with(
        MockUpstream::new(Ok("https://img/abc")),
        1,
        Duration::from_secs(5),
    );

    let (status, _, _) = get(&app.router, "/api/image?prompt=one").await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _, body) = get(&app.router, "/api/image?prompt=two").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("full"));
}

#[tokio::test]
async fn test_stalled_job_times_out() {
    let app = test_app_with(
        MockUpstream::new(Ok("https://img/never")),
        10,
        Duration::from_millis(20),
    );

    let (_, _, body) = get(&app.router, "/api/image?prompt=owl").await;
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let body = poll_until_finished(&app.router, &job_id).await;
    assert_eq!(body["status"], "error");
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_health_reports_job_count() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    get(&app.router, "/api/image?prompt=owl").await;
    get(&app.router, "/api/image?prompt=cat").await;

    let (status, _, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["jobs"], 2);
}

#[tokio::test]
async fn test_metrics_route_absent_without_recorder() {
    let app = test_app(MockUpstream::new(Ok("https://img/abc")));

    // Falls through to the greeting
    let (status, _, body) = get(&app.router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello from oracle-relay!");
}
