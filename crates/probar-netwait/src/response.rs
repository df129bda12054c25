//! Mock responses and decoded response snapshots
//!
//! [`MockResponse`] is what a handler hands back to the page under test.
//! [`DecodedResponse`] is the read-only view the completion pipeline stores
//! on a call after decoding the body exactly once.

use crate::result::NetwaitResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response a handler hands back to the page
///
/// The default is an empty `200` with a JSON content type and no delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    /// Status code sent to the page
    pub status: u16,
    /// Extra headers; `content_type` is sent separately
    pub headers: HashMap<String, String>,
    /// Raw body bytes
    pub body: Vec<u8>,
    /// Value of the `content-type` header
    pub content_type: String,
    /// Milliseconds to hold the response before delivery
    pub delay_ms: u64,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            delay_ms: 0,
        }
    }
}

const JSON_CONTENT_TYPE: &str = "application/json";

impl MockResponse {
    /// `200` whose body and content type are given
    fn with_payload(body: Vec<u8>, content_type: &str) -> Self {
        Self {
            body,
            content_type: content_type.to_string(),
            ..Self::default()
        }
    }

    /// `200` carrying `data` serialized as JSON
    pub fn json<T: Serialize>(data: &T) -> NetwaitResult<Self> {
        Ok(Self::with_payload(serde_json::to_vec(data)?, JSON_CONTENT_TYPE))
    }

    /// `200` carrying `content` as `text/plain`
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::with_payload(content.as_bytes().to_vec(), "text/plain")
    }

    /// `{"error": message}` sent with `status`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::with_payload(body.into_bytes(), JSON_CONTENT_TYPE).with_status(status)
    }

    /// Replace the status
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Insert or overwrite one header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Hold delivery for `delay_ms`
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Body as lossy UTF-8
    #[must_use]
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode a copy of this response for correlation
    ///
    /// Reads the body bytes without consuming them, so the response can
    /// still be delivered to the page afterwards.
    #[must_use]
    pub fn decode(&self) -> DecodedResponse {
        let mut headers = self.headers.clone();
        headers
            .entry("content-type".to_string())
            .or_insert_with(|| self.content_type.clone());
        DecodedResponse {
            status: self.status,
            headers,
            body: ResponseBody::decode(&self.body),
        }
    }
}

/// Response body after best-effort decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Body parsed as JSON
    Json(serde_json::Value),
    /// Body kept as UTF-8 text (lossy)
    Text(String),
}

impl ResponseBody {
    /// UTF-8 decode, then try JSON. Parse failures keep the text.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes).into_owned();
        match serde_json::from_str(&text) {
            Ok(value) => Self::Json(value),
            Err(err) => {
                if !text.is_empty() {
                    tracing::debug!(error = %err, len = text.len(), "response body kept as text");
                }
                Self::Text(text)
            }
        }
    }

    /// JSON value, if the body parsed
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Raw text, if the body did not parse
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// Response attached to a completed call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, including `content-type`
    pub headers: HashMap<String, String>,
    /// Decoded body
    pub body: ResponseBody,
}

impl DecodedResponse {
    /// Whether the status is 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Helper handed to response builders for constructing mock responses
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    /// JSON body with status 200
    pub fn json<T: Serialize>(&self, data: &T) -> NetwaitResult<MockResponse> {
        MockResponse::json(data)
    }

    /// GraphQL success payload: `{"data": ...}`
    pub fn data<T: Serialize>(&self, data: &T) -> NetwaitResult<MockResponse> {
        let payload = serde_json::json!({ "data": serde_json::to_value(data)? });
        MockResponse::json(&payload)
    }

    /// GraphQL error payload: `{"errors": [{"message": ...}]}`
    pub fn errors(&self, messages: &[&str]) -> NetwaitResult<MockResponse> {
        let errors: Vec<_> = messages
            .iter()
            .map(|m| serde_json::json!({ "message": m }))
            .collect();
        MockResponse::json(&serde_json::json!({ "errors": errors }))
    }

    /// Plain text body
    #[must_use]
    pub fn text(&self, content: &str) -> MockResponse {
        MockResponse::text(content)
    }

    /// Status-only response with an empty body
    #[must_use]
    pub fn status(&self, status: u16) -> MockResponse {
        MockResponse::default().with_status(status)
    }

    /// 204 No Content
    #[must_use]
    pub fn empty(&self) -> MockResponse {
        self.status(204)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod mock_response_tests {
        use super::*;

        #[test]
        fn test_default() {
            let response = MockResponse::default();
            assert_eq!(response.status, 200);
            assert_eq!(response.content_type, "application/json");
            assert_eq!(response.delay_ms, 0);
        }

        #[test]
        fn test_text_and_json_content_types() {
            let text = MockResponse::text("OK");
            assert_eq!(text.content_type, "text/plain");
            assert_eq!(text.status, 200);
            let json = MockResponse::json(&serde_json::json!([1, 2])).unwrap();
            assert_eq!(json.content_type, "application/json");
            assert_eq!(json.body_string(), "[1,2]");
        }

        #[test]
        fn test_error() {
            let response = MockResponse::error(404, "No route matched");
            assert_eq!(response.status, 404);
            assert!(response.body_string().contains("No route matched"));
        }

        #[test]
        fn test_builders() {
            let response = MockResponse::text("OK")
                .with_status(201)
                .with_header("x-trace", "1")
                .with_delay(1000);
            assert_eq!(response.status, 201);
            assert_eq!(response.delay_ms, 1000);
            assert_eq!(response.headers.get("x-trace"), Some(&"1".to_string()));
        }

        #[test]
        fn test_decode_leaves_original_intact() {
            let response = MockResponse::json(&serde_json::json!({"id": 1})).unwrap();
            let decoded = response.decode();
            assert_eq!(decoded.body.as_json().unwrap()["id"], 1);
            assert_eq!(response.body_string(), r#"{"id":1}"#);
            assert_eq!(
                decoded.headers.get("content-type"),
                Some(&"application/json".to_string())
            );
        }
    }

    mod body_tests {
        use super::*;

        #[test]
        fn test_plain_text_falls_back() {
            let body = ResponseBody::decode(b"OK");
            assert_eq!(body, ResponseBody::Text("OK".to_string()));
            assert_eq!(body.as_text(), Some("OK"));
        }

        #[test]
        fn test_empty_body_is_text() {
            assert_eq!(ResponseBody::decode(b""), ResponseBody::Text(String::new()));
        }

        #[test]
        fn test_json_scalar() {
            assert_eq!(
                ResponseBody::decode(b"42"),
                ResponseBody::Json(serde_json::json!(42))
            );
        }

        #[test]
        fn test_invalid_utf8_is_lossy_text() {
            let body = ResponseBody::decode(&[0xff, b'o', b'k']);
            assert!(body.as_text().unwrap().ends_with("ok"));
        }
    }

    mod composer_tests {
        use super::*;

        #[test]
        fn test_data_wraps_payload() {
            let response = ResponseComposer
                .data(&serde_json::json!({"title": "X"}))
                .unwrap();
            let decoded = response.decode();
            assert_eq!(decoded.body.as_json().unwrap()["data"]["title"], "X");
        }

        #[test]
        fn test_errors_payload() {
            let response = ResponseComposer.errors(&["boom"]).unwrap();
            let decoded = response.decode();
            assert_eq!(decoded.body.as_json().unwrap()["errors"][0]["message"], "boom");
        }

        #[test]
        fn test_empty_is_204() {
            let response = ResponseComposer.empty();
            assert_eq!(response.status, 204);
            assert!(response.body.is_empty());
        }
    }
}
