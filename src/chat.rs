use crate::api::{ChatRequest, ChatTransport, EventStream, StreamEvent};
use crate::models::{Message, Role};
use crate::references::{merge_references, references_from_event};
use crate::session::ConversationStore;
use futures::FutureExt;
use std::future::Future;
use std::pin::{pin, Pin};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

pub const RATE_LIMITED_MESSAGE: &str =
    "You're sending messages too quickly. Please wait a moment and try again.";
pub const REQUEST_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";
pub const TIMED_OUT_MESSAGE: &str = "The request timed out. Please try again.";

/// Snapshot of a conversation as the presentation layer sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub is_streaming: bool,
    pub error: Option<String>,
    /// Id of the assistant message currently receiving text. When set it is
    /// always the last message.
    pub streaming_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    User,
    Timeout,
}

/// How a call to [`Chat::send_message`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input, or another turn was still streaming.
    Ignored,
    Completed,
    Cancelled,
    TimedOut,
    RateLimited,
    Failed,
    /// The server sent an error event.
    ServerError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatUpdate {
    UserMessage,
    AssistantStarted,
    TextDelta(String),
    References { added: usize },
    Error,
    Finished(TurnOutcome),
    Cleared,
}

/// Observer notified after every state change.
///
/// Called while the chat state is locked, so implementations must not call
/// back into the [`Chat`].
pub trait ChatListener: Send + Sync {
    fn on_update(&self, update: &ChatUpdate, state: &ChatState);
}

impl<F> ChatListener for F
where
    F: Fn(&ChatUpdate, &ChatState) + Send + Sync,
{
    fn on_update(&self, update: &ChatUpdate, state: &ChatState) {
        self(update, state)
    }
}

/// Conversation state machine: `idle -> streaming -> idle`.
///
/// One instance is shared (e.g. behind an `Arc`) by everything that reads or
/// drives the conversation. At most one turn streams at a time.
pub struct Chat<T, S> {
    transport: T,
    store: S,
    timeout: Duration,
    state: Mutex<ChatState>,
    active: Mutex<Option<watch::Sender<Option<StopReason>>>>,
    listeners: Vec<Box<dyn ChatListener>>,
}

impl<T, S> Chat<T, S>
where
    T: ChatTransport,
    S: ConversationStore,
{
    /// Create the chat, restoring any persisted history.
    pub fn new(transport: T, store: S) -> Self {
        let messages = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "discarding unreadable conversation history");
            Vec::new()
        });

        Self {
            transport,
            store,
            timeout: DEFAULT_TURN_TIMEOUT,
            state: Mutex::new(ChatState {
                messages,
                ..Default::default()
            }),
            active: Mutex::new(None),
            listeners: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_listener(mut self, listener: impl ChatListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn state(&self) -> ChatState {
        self.lock_state().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.lock_state().is_streaming
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Send `text` and stream the assistant's answer into the conversation.
    pub async fn send_message(&self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }

        let (stop_tx, stop_rx) = watch::channel(None);
        {
            let mut state = self.lock_state();
            if state.is_streaming {
                debug!("turn already streaming, ignoring message");
                return TurnOutcome::Ignored;
            }
            state.is_streaming = true;
            state.error = None;
            state.messages.push(Message::user(text));
            self.persist(&state.messages);
            *self.lock_active() = Some(stop_tx);
            self.notify(&ChatUpdate::UserMessage, &state);
        }

        info!(chars = text.len(), "starting chat turn");

        let request = ChatRequest {
            message: text.to_string(),
            conversation_id: self.conversation_id(),
        };
        let stop = pin!(wait_for_stop(stop_rx, self.timeout));
        let outcome = self.drive_turn(request, stop).await;

        self.finish_turn(outcome);
        outcome
    }

    /// Cancel the active turn, keeping any text that already arrived.
    pub fn stop_streaming(&self) {
        if let Some(stop_tx) = self.lock_active().as_ref() {
            stop_tx.send_if_modified(|current| {
                if current.is_none() {
                    *current = Some(StopReason::User);
                    true
                } else {
                    false
                }
            });
        }
    }

    /// Forget the conversation: messages, error, persisted history and id.
    pub fn clear_chat(&self) {
        self.stop_streaming();

        let mut state = self.lock_state();
        state.messages.clear();
        state.error = None;
        state.streaming_id = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "ignoring conversation store failure");
        }
        self.notify(&ChatUpdate::Cleared, &state);
    }

    async fn drive_turn<F>(&self, request: ChatRequest, mut stop: Pin<&mut F>) -> TurnOutcome
    where
        F: Future<Output = StopReason>,
    {
        let response = tokio::select! {
            biased;
            reason = stop.as_mut() => return stopped(reason),
            response = self.transport.stream_chat(&request) => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "chat request failed");
                return TurnOutcome::Failed;
            }
        };

        if response.is_rate_limited() {
            return TurnOutcome::RateLimited;
        }
        if !response.is_success() {
            warn!(status = %response.status, "chat request rejected");
            return TurnOutcome::Failed;
        }

        if let Some(id) = response.conversation_id() {
            // Checked under the state lock so a concurrent clear_chat cannot
            // have its id reset undone.
            let _state = self.lock_state();
            if let Some(reason) = stop.as_mut().now_or_never() {
                return stopped(reason);
            }
            if let Err(e) = self.store.set_conversation_id(&id) {
                warn!(error = %e, "ignoring conversation store failure");
            }
        }

        let placeholder_id = self.open_placeholder();
        let mut events = EventStream::new(response.body);

        loop {
            let next = tokio::select! {
                biased;
                reason = stop.as_mut() => return stopped(reason),
                next = events.next_event() => next,
            };

            match next {
                None => return TurnOutcome::Completed,
                Some(Err(e)) => {
                    warn!(error = %e, "chat stream failed");
                    return TurnOutcome::Failed;
                }
                Some(Ok(event)) => {
                    if let Some(outcome) = self.apply_event(&placeholder_id, event) {
                        return outcome;
                    }
                }
            }
        }
    }

    fn open_placeholder(&self) -> String {
        let placeholder = Message::assistant_placeholder();
        let id = placeholder.id.clone();

        let mut state = self.lock_state();
        state.messages.push(placeholder);
        state.streaming_id = Some(id.clone());
        self.notify(&ChatUpdate::AssistantStarted, &state);
        id
    }

    /// Apply one event to the open placeholder; `Some` ends the turn.
    fn apply_event(&self, placeholder_id: &str, event: StreamEvent) -> Option<TurnOutcome> {
        match event {
            StreamEvent::TextDelta { delta } => {
                if delta.is_empty() {
                    return None;
                }
                let mut state = self.lock_state();
                match placeholder_mut(&mut state, placeholder_id) {
                    Some(message) => message.content.push_str(&delta),
                    None => {
                        debug!("placeholder gone, dropping text delta");
                        return None;
                    }
                }
                self.notify(&ChatUpdate::TextDelta(delta), &state);
                None
            }
            StreamEvent::ToolResult(tool) => {
                let incoming = references_from_event(&tool);
                if incoming.is_empty() {
                    return None;
                }
                let mut state = self.lock_state();
                let added = placeholder_mut(&mut state, placeholder_id)
                    .map(|message| {
                        merge_references(message.references.get_or_insert_with(Vec::new), incoming)
                    })
                    .unwrap_or(0);
                if added > 0 {
                    debug!(tool = %tool.tool_name, added, "attached content references");
                    self.notify(&ChatUpdate::References { added }, &state);
                }
                None
            }
            StreamEvent::Error { message } => {
                if message.is_empty() {
                    return None;
                }
                let mut state = self.lock_state();
                let empty_placeholder = placeholder_mut(&mut state, placeholder_id)
                    .is_some_and(|placeholder| placeholder.content.is_empty());
                if empty_placeholder {
                    state.messages.pop();
                    state.streaming_id = None;
                }
                state.error = Some(message);
                self.notify(&ChatUpdate::Error, &state);
                Some(TurnOutcome::ServerError)
            }
        }
    }

    fn finish_turn(&self, outcome: TurnOutcome) {
        let mut state = self.lock_state();

        if let Some(id) = state.streaming_id.take() {
            let blank = state
                .messages
                .last()
                .is_some_and(|message| message.id == id && message.is_blank());
            if blank {
                state.messages.pop();
            }
        }

        match outcome {
            TurnOutcome::RateLimited => state.error = Some(RATE_LIMITED_MESSAGE.to_string()),
            TurnOutcome::Failed => state.error = Some(REQUEST_FAILED_MESSAGE.to_string()),
            TurnOutcome::TimedOut => state.error = Some(TIMED_OUT_MESSAGE.to_string()),
            _ => {}
        }

        state.is_streaming = false;
        self.lock_active().take();
        self.persist(&state.messages);

        info!(?outcome, "chat turn finished");
        self.notify(&ChatUpdate::Finished(outcome), &state);
    }

    fn conversation_id(&self) -> Option<String> {
        self.store.conversation_id().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring conversation store failure");
            None
        })
    }

    // Persistence is best effort: failures are logged and dropped here.
    fn persist(&self, messages: &[Message]) {
        if let Err(e) = self.store.save(messages) {
            warn!(error = %e, "ignoring conversation store failure");
        }
    }

    fn notify(&self, update: &ChatUpdate, state: &ChatState) {
        for listener in &self.listeners {
            listener.on_update(update, state);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<watch::Sender<Option<StopReason>>>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn placeholder_mut<'a>(state: &'a mut ChatState, id: &str) -> Option<&'a mut Message> {
    state
        .messages
        .last_mut()
        .filter(|message| message.role == Role::Assistant && message.id == id)
}

fn stopped(reason: StopReason) -> TurnOutcome {
    match reason {
        StopReason::User => TurnOutcome::Cancelled,
        StopReason::Timeout => TurnOutcome::TimedOut,
    }
}

/// Resolves when the turn must stop: on an explicit stop, or once the
/// watchdog expires.
async fn wait_for_stop(
    mut stop_rx: watch::Receiver<Option<StopReason>>,
    timeout: Duration,
) -> StopReason {
    let requested = async move {
        let reason = match stop_rx.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        };
        match reason {
            Some(reason) => reason,
            // Sender dropped without a stop; only the watchdog can end it.
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        reason = requested => reason,
        _ = tokio::time::sleep(timeout) => StopReason::Timeout,
    }
}
