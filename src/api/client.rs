use crate::api::ChatRequest;
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::Arc;

pub const CHAT_PATH: &str = "/api/v1/chat";
pub const CONVERSATION_ID_HEADER: &str = "x-conversation-id";

pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Response head plus the still unread body of a chat request.
pub struct ChatResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl ChatResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Conversation id assigned by the server, if any.
    pub fn conversation_id(&self) -> Option<String> {
        self.headers
            .get(CONVERSATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

/// Opens a streamed chat turn against the remote service.
///
/// Error statuses are reported through [`ChatResponse::status`]; only
/// network level faults come back as `Err`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        (**self).stream_chat(request).await
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ChatError::NetworkError))
            .boxed();

        Ok(ChatResponse {
            status,
            headers,
            body,
        })
    }
}

/// Resolve the chat endpoint from a service base URL.
pub fn chat_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with(CHAT_PATH) {
        base.to_string()
    } else if base.ends_with("/api/v1") {
        format!("{}/chat", base)
    } else {
        format!("{}{}", base, CHAT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_header(value: &str) -> ChatResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONVERSATION_ID_HEADER, HeaderValue::from_str(value).unwrap());
        ChatResponse {
            status: StatusCode::OK,
            headers,
            body: futures::stream::empty().boxed(),
        }
    }

    #[test]
    fn test_chat_endpoint_variants() {
        assert_eq!(
            chat_endpoint("https://api.example.dev"),
            "https://api.example.dev/api/v1/chat"
        );
        assert_eq!(
            chat_endpoint("https://api.example.dev/"),
            "https://api.example.dev/api/v1/chat"
        );
        assert_eq!(
            chat_endpoint("http://localhost:8080/api/v1"),
            "http://localhost:8080/api/v1/chat"
        );
        assert_eq!(
            chat_endpoint("http://localhost:8080/api/v1/chat"),
            "http://localhost:8080/api/v1/chat"
        );
    }

    #[test]
    fn test_conversation_id_header() {
        assert_eq!(
            response_with_header("conv-42").conversation_id(),
            Some("conv-42".to_string())
        );
        assert_eq!(response_with_header("  ").conversation_id(), None);
    }

    #[test]
    fn test_rate_limited_status() {
        let mut response = response_with_header("x");
        response.status = StatusCode::TOO_MANY_REQUESTS;
        assert!(response.is_rate_limited());
        assert!(!response.is_success());
    }
}
