//! ApiClient against a mock chat-completion server.

use std::time::Duration;

use ai_commit::{ErrorCode, Result, api::{ApiClient, ChatClient}};
use serde_json::json;
use wiremock::{
   Mock, MockServer, ResponseTemplate,
   matchers::{body_json, header, method, path},
};

const ROUTE: &str = "/api/v1/chat/completions";

/// The blocking client must live outside the async runtime.
async fn send(server: &MockServer, text: &'static str) -> Result<String> {
   let endpoint = format!("{}{ROUTE}", server.uri());
   tokio::task::spawn_blocking(move || {
      ApiClient::new("sk-test", Some("test/model"))?
         .with_endpoint(endpoint)
         .send_message(text)
   })
   .await
   .expect("blocking task panicked")
}

fn completion(content: &str) -> serde_json::Value {
   json!({
      "id": "gen-1",
      "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
   })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sends_exact_body_and_headers() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .and(path(ROUTE))
      .and(header("authorization", "Bearer sk-test"))
      .and(header("x-title", "ai-commit"))
      .and(header("http-referer", "https://ai-commit.lucaguzzon.com"))
      .and(body_json(json!({
         "model": "test/model",
         "temperature": 0,
         "top_p": 0.2,
         "messages": [{ "role": "user", "content": "describe this diff" }]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion("  feat: x  \n")))
      .expect(1)
      .mount(&server)
      .await;

   assert_eq!(send(&server, "describe this diff").await.unwrap(), "feat: x");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rate_limit() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(429))
      .mount(&server)
      .await;

   let err = send(&server, "hi").await.unwrap_err();
   assert_eq!(err.code(), ErrorCode::ApiRateLimit);
   assert!(err.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_service_unavailable() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
      .mount(&server)
      .await;

   assert_eq!(send(&server, "hi").await.unwrap_err().code(), ErrorCode::ApiServiceUnavailable);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_error_includes_body_message() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .respond_with(
         ResponseTemplate::new(401)
            .set_body_json(json!({ "error": { "message": "User not found.", "code": 401 } })),
      )
      .mount(&server)
      .await;

   let err = send(&server, "hi").await.unwrap_err();
   assert_eq!(err.code(), ErrorCode::ApiError);
   let text = err.to_string();
   assert!(text.contains("401"), "{text}");
   assert!(text.contains("User not found."), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blank_content_is_invalid_response() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
      .mount(&server)
      .await;

   assert_eq!(send(&server, "hi").await.unwrap_err().code(), ErrorCode::ApiInvalidResponse);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_choices_is_invalid_response() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "object": "chat.completion" })))
      .mount(&server)
      .await;

   assert_eq!(send(&server, "hi").await.unwrap_err().code(), ErrorCode::ApiInvalidResponse);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_response_times_out() {
   let server = MockServer::start().await;
   Mock::given(method("POST"))
      .respond_with(
         ResponseTemplate::new(200)
            .set_body_json(completion("feat: late"))
            .set_delay(Duration::from_secs(3)),
      )
      .mount(&server)
      .await;

   let endpoint = format!("{}{ROUTE}", server.uri());
   let err = tokio::task::spawn_blocking(move || {
      ApiClient::new("sk-test", None)?
         .with_endpoint(endpoint)
         .with_timeout(Duration::from_millis(200))
         .send_message("hi")
   })
   .await
   .expect("blocking task panicked")
   .unwrap_err();

   assert_eq!(err.code(), ErrorCode::ApiTimeout);
   assert!(err.is_retryable());
}

#[test]
fn test_refused_connection() {
   let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
   let port = listener.local_addr().unwrap().port();
   drop(listener);

   let err = ApiClient::new("sk-test", None)
      .unwrap()
      .with_endpoint(format!("http://127.0.0.1:{port}{ROUTE}"))
      .send_message("hi")
      .unwrap_err();
   assert_eq!(err.code(), ErrorCode::ApiConnectionFailed);
}
