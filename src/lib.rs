pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod references;
pub mod session;
pub mod ui;

pub use chat::{Chat, ChatListener, ChatState, ChatUpdate, TurnOutcome};
pub use error::{ChatError, Result};
