pub mod client;
pub mod models;
pub mod streaming;
pub mod tools;

pub use client::{chat_endpoint, ByteStream, ChatResponse, ChatTransport, HttpTransport};
pub use models::{ChatRequest, StreamEvent, ToolResultEvent};
pub use streaming::{EventDecoder, EventStream};
pub use tools::ToolResult;
