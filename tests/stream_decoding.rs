mod common;

use bytes::Bytes;
use common::{body, delta, frame};
use futures::StreamExt;
use serde_json::json;
use sitechat::api::{EventStream, StreamEvent};
use sitechat::error::{ChatError, Result};

async fn collect(mut events: EventStream) -> Vec<StreamEvent> {
    let mut out = Vec::new();
    while let Some(event) = events.next_event().await {
        out.push(event.unwrap());
    }
    out
}

/// Re-chunk `text` into pieces of `size` bytes, ignoring char boundaries.
fn rechunk(text: &str, size: usize) -> Vec<Result<Bytes>> {
    text.as_bytes()
        .chunks(size)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect()
}

#[tokio::test]
async fn test_events_survive_arbitrary_chunking() {
    let deltas = ["Über", " ", "naïve", " café", "s ", "🚀", "!"];
    let payload: String = deltas.iter().map(|d| delta(d)).collect();

    for size in [1, 2, 3, 7, 64] {
        let stream = futures::stream::iter(rechunk(&payload, size)).boxed();
        let events = collect(EventStream::new(stream)).await;

        let text: String = events
            .into_iter()
            .map(|event| match event {
                StreamEvent::TextDelta { delta } => delta,
                other => panic!("unexpected event: {:?}", other),
            })
            .collect();
        assert_eq!(text, deltas.concat(), "chunk size {}", size);
    }
}

#[tokio::test]
async fn test_mixed_event_kinds() {
    let events = collect(EventStream::new(body(&[
        ": comment\n".to_string(),
        delta("hi"),
        frame(json!({"type": "tool_result", "tool_name": "GetShares", "result": "[]", "successful": true})),
        frame(json!({"type": "error", "message": "boom"})),
        "data: [DONE]\n".to_string(),
    ])))
    .await;

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[0], StreamEvent::TextDelta { delta } if delta == "hi"));
    assert!(matches!(&events[1], StreamEvent::ToolResult(tool) if tool.tool_name == "GetShares" && tool.successful));
    assert!(matches!(&events[2], StreamEvent::Error { message } if message == "boom"));
}

#[tokio::test]
async fn test_unterminated_tail_is_discarded() {
    let events = collect(EventStream::new(body(&[
        delta("kept"),
        "data: {\"type\":\"text_delta\",\"delta\":\"lost\"}".to_string(),
    ])))
    .await;

    assert_eq!(
        events,
        vec![StreamEvent::TextDelta {
            delta: "kept".to_string()
        }]
    );
}

#[tokio::test]
async fn test_body_error_is_reported_after_earlier_events() {
    let chunks: Vec<Result<Bytes>> = vec![
        Ok(Bytes::from(delta("before"))),
        Err(ChatError::Other("connection reset".to_string())),
    ];
    let mut events = EventStream::new(futures::stream::iter(chunks).boxed());

    assert!(matches!(events.next_event().await, Some(Ok(StreamEvent::TextDelta { .. }))));
    assert!(matches!(events.next_event().await, Some(Err(ChatError::Other(_)))));
    assert!(events.next_event().await.is_none());
}
