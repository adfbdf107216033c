#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sitechat::api::client::CONVERSATION_ID_HEADER;
use sitechat::api::{ByteStream, ChatRequest, ChatResponse, ChatTransport};
use sitechat::error::{ChatError, Result};
use sitechat::models::Message;
use sitechat::session::ConversationStore;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Response {
        status: u16,
        conversation_id: Option<String>,
        body: ByteStream,
    },
    NetworkError,
    /// The request never gets an answer.
    Hang,
}

/// Transport replaying canned responses in order and recording requests.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, conversation_id: Option<&str>, body: ByteStream) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Response {
            status,
            conversation_id: conversation_id.map(str::to_string),
            body,
        });
        self
    }

    pub fn ok(self, body: ByteStream) -> Self {
        self.respond(200, None, body)
    }

    pub fn network_error(self) -> Self {
        self.script.lock().unwrap().push_back(Scripted::NetworkError);
        self
    }

    pub fn hang(self) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Hang);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Response {
                status,
                conversation_id,
                body,
            }) => {
                let mut headers = HeaderMap::new();
                if let Some(id) = conversation_id {
                    headers.insert(CONVERSATION_ID_HEADER, HeaderValue::from_str(&id).unwrap());
                }
                Ok(ChatResponse {
                    status: StatusCode::from_u16(status).unwrap(),
                    headers,
                    body,
                })
            }
            Some(Scripted::NetworkError) => Err(ChatError::Other("connection refused".to_string())),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(ChatError::Other("no scripted response left".to_string())),
        }
    }
}

/// Store whose every write fails, as on a read-only or full disk.
#[derive(Default)]
pub struct FailingStore;

impl FailingStore {
    fn fault<T>() -> Result<T> {
        Err(ChatError::StorageError("disk unavailable".to_string()))
    }
}

impl ConversationStore for FailingStore {
    fn load(&self) -> Result<Vec<Message>> {
        Self::fault()
    }

    fn save(&self, _messages: &[Message]) -> Result<()> {
        Self::fault()
    }

    fn clear(&self) -> Result<()> {
        Self::fault()
    }

    fn conversation_id(&self) -> Result<Option<String>> {
        Self::fault()
    }

    fn set_conversation_id(&self, _id: &str) -> Result<()> {
        Self::fault()
    }

    fn clear_conversation_id(&self) -> Result<()> {
        Self::fault()
    }
}

pub fn frame(event: Value) -> String {
    format!("data: {}\n", event)
}

pub fn delta(text: &str) -> String {
    frame(json!({"type": "text_delta", "delta": text}))
}

pub fn error_event(message: &str) -> String {
    frame(json!({"type": "error", "message": message}))
}

pub fn tool_result(tool_name: &str, result: Value) -> String {
    frame(json!({"type": "tool_result", "tool_name": tool_name, "result": result, "successful": true}))
}

/// Body delivering each string as its own chunk, then ending.
pub fn body(chunks: &[String]) -> ByteStream {
    let chunks: Vec<Result<Bytes>> = chunks
        .iter()
        .map(|chunk| Ok(Bytes::from(chunk.clone())))
        .collect();
    futures::stream::iter(chunks).boxed()
}

/// Body delivering the given chunks and then never ending.
pub fn stalled_body(chunks: &[String]) -> ByteStream {
    body(chunks).chain(futures::stream::pending()).boxed()
}

/// Body fed by the test through the returned sender; ends when it drops.
pub fn channel_body() -> (UnboundedSender<Result<Bytes>>, ByteStream) {
    let (tx, rx) = unbounded();
    (tx, rx.boxed())
}

pub fn send_chunk(tx: &UnboundedSender<Result<Bytes>>, chunk: String) {
    tx.unbounded_send(Ok(Bytes::from(chunk))).unwrap();
}

/// Yield to other tasks until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition was never reached");
}
