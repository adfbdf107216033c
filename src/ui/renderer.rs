use super::output::{display_error, display_references};
use super::reveal::WordReveal;
use crate::chat::{ChatListener, ChatState, ChatUpdate};
use crate::models::{ContentReference, Role};
use colored::*;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::time::{interval, Duration, MissedTickBehavior};

pub const REVEAL_TICK: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    AssistantStarted,
    Text(String),
    TurnFinished {
        references: Vec<ContentReference>,
        error: Option<String>,
    },
}

/// Listener forwarding chat updates to the terminal renderer.
pub fn render_listener(tx: UnboundedSender<RenderEvent>) -> impl ChatListener {
    move |update: &ChatUpdate, state: &ChatState| {
        let event = match update {
            ChatUpdate::AssistantStarted => RenderEvent::AssistantStarted,
            ChatUpdate::TextDelta(delta) => RenderEvent::Text(delta.clone()),
            ChatUpdate::Finished(_) => RenderEvent::TurnFinished {
                references: last_assistant_references(state),
                error: state.error.clone(),
            },
            _ => return,
        };
        // The renderer only goes away at shutdown.
        let _ = tx.send(event);
    }
}

fn last_assistant_references(state: &ChatState) -> Vec<ContentReference> {
    match state.messages.last() {
        Some(message) if message.role == Role::Assistant => message.references().to_vec(),
        _ => Vec::new(),
    }
}

/// Print streamed answers word by word. `rendered` is notified once a
/// finished turn has been fully written out.
pub async fn run_renderer(
    mut rx: UnboundedReceiver<RenderEvent>,
    site_url: String,
    rendered: Arc<Notify>,
) {
    let mut reveal = WordReveal::streaming();
    let mut started = false;
    let mut finished: Option<(Vec<ContentReference>, Option<String>)> = None;

    let mut ticker = interval(REVEAL_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                None => break,
                Some(RenderEvent::AssistantStarted) => {
                    reveal = WordReveal::streaming();
                    started = true;
                    print!("{} ", "assistant>".green().bold());
                    let _ = io::stdout().flush();
                }
                Some(RenderEvent::Text(delta)) => reveal.push_str(&delta),
                Some(RenderEvent::TurnFinished { references, error }) => {
                    finished = Some((references, error));
                }
            },
            _ = ticker.tick() => {
                if let Some(words) = reveal.tick() {
                    print!("{}", words);
                    let _ = io::stdout().flush();
                }
                if reveal.is_drained() {
                    if let Some((references, error)) = finished.take() {
                        if started {
                            println!();
                        }
                        display_references(&references, &site_url);
                        if let Some(error) = error {
                            display_error(&error);
                        }
                        started = false;
                        rendered.notify_one();
                    }
                }
            }
        }
    }

    if let Some(rest) = reveal.flush() {
        println!("{}", rest);
    }
}
