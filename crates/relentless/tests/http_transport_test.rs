//! End-to-end tests for the reqwest-backed transport against a local
//! wiremock server, including the full loop driving it.

use relentless::{
    ErrorKind, HttpRequest, HttpTransport, Request, RequestOptions, SharedContext, Transport,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn transport_passes_requests_and_responses_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/echo"))
        .and(header("X-Test", "1"))
        .and(body_string("ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-Id", "abc123")
                .set_body_json(serde_json::json!({"reply": "pong"})),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new().expect("client builds");
    let request = HttpRequest::new("POST")
        .with_header("X-Test", "1")
        .with_text_body("ping");

    let response = transport
        .send_http(&format!("{}/v1/echo", server.uri()), &request)
        .await
        .expect("the exchange completes");

    assert_eq!(response.status, 200);
    assert_eq!(response.get_header("x-request-id"), Some("abc123"));

    let body: serde_json::Value = response.json().expect("body is JSON");
    assert_eq!(body["reply"], "pong");
}

#[tokio::test]
async fn failing_statuses_are_responses_not_transport_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/broken"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().expect("client builds");
    let response = transport
        .send_http(&format!("{}/v1/broken", server.uri()), &HttpRequest::default())
        .await
        .expect("a 503 is still a response");

    assert_eq!(response.status, 503);
    assert!(response.is_error());
}

#[tokio::test]
async fn loop_retries_against_a_real_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    // max_delay of zero clamps the whole backoff curve away
    let options = RequestOptions::builder()
        .retries(2)
        .max_delay(Duration::ZERO)
        .build();
    let error = Request::with_options(
        format!("{}/v1/flaky", server.uri()),
        HttpRequest::new("GET"),
        options,
    )
    .with_context(SharedContext::new())
    .send()
    .await
    .expect_err("the server never recovers");

    assert_eq!(error.kind(), ErrorKind::Http);
    assert_eq!(error.response().unwrap().status, 503);
    server.verify().await;
}

#[tokio::test]
async fn retry_after_header_is_honored_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let options = RequestOptions::builder().max_delay(Duration::ZERO).build();
    let response = Request::with_options(
        format!("{}/v1/limited", server.uri()),
        HttpRequest::new("GET"),
        options,
    )
    .with_context(SharedContext::new())
    .send()
    .await
    .expect("succeeds once the window reopens");

    assert_eq!(response.status, 200);
    // 1 s hint plus the 100 ms pad, with the backoff clamped away
    assert!(started.elapsed() >= Duration::from_millis(1100));
}

#[tokio::test]
async fn custom_transports_slot_into_the_loop() {
    // The Transport trait is object safe; the stock client is just one impl
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new().expect("client builds"));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/ok"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = Request::new(format!("{}/v1/ok", server.uri()), HttpRequest::new("GET"))
        .with_context(SharedContext::new())
        .with_transport(transport)
        .send()
        .await
        .expect("completes");
    assert_eq!(response.status, 204);
}
