use clap::Parser;
use colored::*;
use sitechat::api::HttpTransport;
use sitechat::chat::{Chat, TurnOutcome};
use sitechat::cli::Args;
use sitechat::config::Config;
use sitechat::session::{ConversationStore, FilesystemConversationStore, MemoryConversationStore};
use sitechat::ui::{self, output};
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Notify};
use tracing::warn;

type SiteChat = Chat<HttpTransport, Box<dyn ConversationStore>>;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    sitechat::logging::init(config.verbose);

    let store = open_store(&args, &config);

    // Handle --clear option
    if args.clear_history {
        match store.clear() {
            Ok(()) => {
                println!("{}", "Conversation history cleared.".green());
                return;
            }
            Err(e) => {
                eprintln!("{}", format!("Error clearing history: {}", e).red());
                process::exit(1);
            }
        }
    }

    if args.show_history {
        match store.load() {
            Ok(messages) => output::display_history(&messages, &config.site_url),
            Err(e) => {
                eprintln!("{}", format!("Error reading history: {}", e).red());
                process::exit(1);
            }
        }
        return;
    }

    let transport = match HttpTransport::new(config.endpoint.clone()) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if config.verbose {
        eprintln!("{}", format!("[sitechat] Endpoint: {}", transport.endpoint()).dimmed());
    }

    let (render_tx, render_rx) = mpsc::unbounded_channel();
    let rendered = Arc::new(Notify::new());
    tokio::spawn(ui::run_renderer(
        render_rx,
        config.site_url.clone(),
        Arc::clone(&rendered),
    ));

    let chat: Arc<SiteChat> = Arc::new(
        Chat::new(transport, store)
            .with_timeout(config.timeout)
            .with_listener(ui::render_listener(render_tx)),
    );

    if args.new_conversation {
        chat.clear_chat();
    }

    spawn_interrupt_handler(Arc::clone(&chat));

    let exit_code = if args.message.is_empty() {
        interactive(&chat, &rendered, &config.site_url).await
    } else {
        let outcome = run_turn(&chat, &rendered, &args.message.join(" ")).await;
        exit_code_for(outcome)
    };

    process::exit(exit_code);
}

fn open_store(args: &Args, config: &Config) -> Box<dyn ConversationStore> {
    if args.no_history {
        return Box::new(MemoryConversationStore::new());
    }

    match config
        .data_dir
        .clone()
        .or_else(FilesystemConversationStore::default_dir)
    {
        Some(dir) => Box::new(FilesystemConversationStore::new(dir)),
        None => {
            warn!("no data directory available, history will not be saved");
            Box::new(MemoryConversationStore::new())
        }
    }
}

/// Ctrl-C stops a streaming answer; when idle it exits.
fn spawn_interrupt_handler(chat: Arc<SiteChat>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if chat.is_streaming() {
                chat.stop_streaming();
            } else {
                println!();
                process::exit(130);
            }
        }
    });
}

async fn run_turn(chat: &SiteChat, rendered: &Notify, text: &str) -> TurnOutcome {
    let outcome = chat.send_message(text).await;
    if outcome != TurnOutcome::Ignored {
        rendered.notified().await;
    }
    outcome
}

async fn interactive(chat: &SiteChat, rendered: &Notify, site_url: &str) -> i32 {
    println!(
        "{}",
        "Ask anything about the site. /new starts over, /history shows the conversation, /quit exits."
            .dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "you>".blue().bold());
        let _ = io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                return 1;
            }
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                chat.clear_chat();
                println!("{}", "Started a new conversation.".green());
            }
            "/history" => output::display_history(&chat.messages(), site_url),
            text => {
                run_turn(chat, rendered, text).await;
            }
        }
    }

    0
}

fn exit_code_for(outcome: TurnOutcome) -> i32 {
    match outcome {
        TurnOutcome::Completed | TurnOutcome::Cancelled | TurnOutcome::Ignored => 0,
        TurnOutcome::RateLimited
        | TurnOutcome::Failed
        | TurnOutcome::TimedOut
        | TurnOutcome::ServerError => 1,
    }
}
