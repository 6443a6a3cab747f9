use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
   config::DEFAULT_MODEL,
   error::{AiCommitError, ErrorCode, Result},
};

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const REFERER: &str = "https://ai-commit.lucaguzzon.com";
const TITLE: &str = "ai-commit";

/// Anything that can turn a prompt into a completion. The generator only
/// depends on this.
pub trait ChatClient {
   fn model(&self) -> &str;

   /// Send `text` as a single user message and return the trimmed reply.
   fn send_message(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct Message<'a> {
   role:    &'static str,
   content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
   model:       &'a str,
   temperature: u8,
   top_p:       f32,
   messages:    [Message<'a>; 1],
}

impl<'a> ChatRequest<'a> {
   const fn new(model: &'a str, content: &'a str) -> Self {
      Self { model, temperature: 0, top_p: 0.2, messages: [Message { role: "user", content }] }
   }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
   #[serde(default)]
   choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   #[serde(default)]
   message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
   #[serde(default)]
   error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
   #[serde(default)]
   message: Option<String>,
}

/// Blocking chat-completion client for an OpenRouter-compatible endpoint.
/// One request per call, no retries.
pub struct ApiClient {
   api_key:  String,
   model:    String,
   endpoint: String,
   timeout:  Duration,
   client:   reqwest::blocking::Client,
}

impl fmt::Debug for ApiClient {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("ApiClient")
         .field("model", &self.model)
         .field("endpoint", &self.endpoint)
         .field("timeout", &self.timeout)
         .finish_non_exhaustive()
   }
}

impl ApiClient {
   /// Build a client. A blank key is an auth failure; a missing model falls
   /// back to the auto-routing model.
   pub fn new(api_key: &str, model: Option<&str>) -> Result<Self> {
      let api_key = api_key.trim();
      if api_key.is_empty() {
         return Err(AiCommitError::api(
            ErrorCode::ApiAuthFailed,
            "API key is required and must be a non-empty string",
            None,
         ));
      }

      let client = reqwest::blocking::Client::builder()
         .timeout(REQUEST_TIMEOUT)
         .build()
         .map_err(|e| {
            AiCommitError::api(ErrorCode::ApiError, format!("Failed to build HTTP client: {e}"), None)
         })?;

      Ok(Self {
         api_key: api_key.to_string(),
         model: model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL)
            .to_string(),
         endpoint: DEFAULT_ENDPOINT.to_string(),
         timeout: REQUEST_TIMEOUT,
         client,
      })
   }

   /// Point the client at another chat-completion URL.
   #[must_use]
   pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
      self.endpoint = endpoint.into();
      self
   }

   /// Per-request timeout; [`REQUEST_TIMEOUT`] unless overridden.
   #[must_use]
   pub const fn with_timeout(mut self, timeout: Duration) -> Self {
      self.timeout = timeout;
      self
   }

   pub fn endpoint(&self) -> &str {
      &self.endpoint
   }

   pub const fn timeout(&self) -> Duration {
      self.timeout
   }
}

impl ChatClient for ApiClient {
   fn model(&self) -> &str {
      &self.model
   }

   fn send_message(&self, text: &str) -> Result<String> {
      if text.trim().is_empty() {
         return Err(AiCommitError::validation(
            ErrorCode::ValidationRequired,
            "Message text is required and must be a non-empty string",
            Some("text"),
         ));
      }

      let response = self
         .client
         .post(&self.endpoint)
         .bearer_auth(&self.api_key)
         .header("HTTP-Referer", REFERER)
         .header("X-Title", TITLE)
         .timeout(self.timeout)
         .json(&ChatRequest::new(&self.model, text))
         .send()
         .map_err(|e| classify_transport(&e, self.timeout))?;

      let status = response.status();
      let body = response.text().map_err(|e| classify_transport(&e, self.timeout))?;

      if !status.is_success() {
         return Err(classify_status(status.as_u16(), &body));
      }

      extract_content(&body)
   }
}

/// Map a non-success status (and its body) to an Api error.
fn classify_status(status: u16, body: &str) -> AiCommitError {
   match status {
      429 => AiCommitError::api(
         ErrorCode::ApiRateLimit,
         "Rate limit exceeded. Please try again later.",
         Some(status),
      ),
      s if s >= 500 => AiCommitError::api(
         ErrorCode::ApiServiceUnavailable,
         format!("API service unavailable (status {s})"),
         Some(status),
      ),
      s => {
         let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| body.trim().chars().take(200).collect());
         let message = if detail.is_empty() {
            format!("API request failed with status {s}")
         } else {
            format!("API request failed with status {s}: {detail}")
         };
         AiCommitError::api(ErrorCode::ApiError, message, Some(status))
      },
   }
}

/// Map a transport failure (no usable HTTP response) to an Api error.
fn classify_transport(e: &reqwest::Error, timeout: Duration) -> AiCommitError {
   if e.is_timeout() {
      AiCommitError::api(
         ErrorCode::ApiTimeout,
         format!("Request timed out after {timeout:?}"),
         None,
      )
   } else if e.is_connect() {
      AiCommitError::api(ErrorCode::ApiConnectionFailed, format!("Connection failed: {e}"), None)
   } else {
      AiCommitError::api(ErrorCode::ApiError, format!("API request failed: {e}"), None)
   }
}

/// Pull `choices[0].message.content` out of a success body.
fn extract_content(body: &str) -> Result<String> {
   let invalid = || {
      AiCommitError::api(
         ErrorCode::ApiInvalidResponse,
         "Invalid response from API: missing message content",
         None,
      )
   };

   let parsed: ChatResponse = serde_json::from_str(body).map_err(|_| invalid())?;
   let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message)
      .and_then(|m| m.content)
      .ok_or_else(invalid)?;

   let content = content.trim();
   if content.is_empty() {
      return Err(invalid());
   }
   Ok(content.to_string())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_request_body_shape() {
      let body = serde_json::to_string(&ChatRequest::new("openrouter/auto", "hi")).unwrap();
      assert_eq!(
         body,
         r#"{"model":"openrouter/auto","temperature":0,"top_p":0.2,"messages":[{"role":"user","content":"hi"}]}"#
      );
   }

   #[test]
   fn test_new_requires_key() {
      let err = ApiClient::new("  ", None).unwrap_err();
      assert_eq!(err.code(), ErrorCode::ApiAuthFailed);
   }

   #[test]
   fn test_new_defaults_model() {
      let client = ApiClient::new("sk-test", None).unwrap();
      assert_eq!(client.model(), DEFAULT_MODEL);
      assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
      assert_eq!(client.timeout(), REQUEST_TIMEOUT);

      let client = ApiClient::new("sk-test", Some("openai/gpt-4o"))
         .unwrap()
         .with_endpoint("http://localhost:1/v1")
         .with_timeout(Duration::from_secs(5));
      assert_eq!(client.timeout(), Duration::from_secs(5));
      assert_eq!(client.model(), "openai/gpt-4o");
      assert_eq!(client.endpoint(), "http://localhost:1/v1");
   }

   #[test]
   fn test_debug_hides_key() {
      let client = ApiClient::new("sk-secret", None).unwrap();
      assert!(!format!("{client:?}").contains("sk-secret"));
   }

   #[test]
   fn test_send_rejects_blank_text() {
      let client = ApiClient::new("sk-test", None).unwrap();
      let err = client.send_message(" \n").unwrap_err();
      assert_eq!(err.code(), ErrorCode::ValidationRequired);
   }

   #[test]
   fn test_classify_status() {
      let err = classify_status(429, "");
      assert_eq!(err.code(), ErrorCode::ApiRateLimit);
      assert!(err.to_string().contains("try again later"));

      assert_eq!(classify_status(503, "").code(), ErrorCode::ApiServiceUnavailable);
      assert_eq!(classify_status(500, "").code(), ErrorCode::ApiServiceUnavailable);

      let err = classify_status(401, r#"{"error":{"message":"No auth credentials found"}}"#);
      assert_eq!(err.code(), ErrorCode::ApiError);
      assert!(err.to_string().contains("401"));
      assert!(err.to_string().contains("No auth credentials found"));

      let err = classify_status(404, "");
      assert!(err.to_string().ends_with("status 404"));
   }

   #[test]
   fn test_extract_content() {
      let body = r#"{"choices":[{"message":{"role":"assistant","content":"  feat: x \n"}}]}"#;
      assert_eq!(extract_content(body).unwrap(), "feat: x");

      for bad in [
         r#"{"choices":[]}"#,
         r#"{"choices":[{"message":{"content":"   "}}]}"#,
         r#"{"choices":[{"message":{}}]}"#,
         r#"{}"#,
         "not json",
      ] {
         assert_eq!(extract_content(bad).unwrap_err().code(), ErrorCode::ApiInvalidResponse, "{bad}");
      }
   }
}
