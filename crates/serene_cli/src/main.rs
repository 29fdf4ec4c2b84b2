use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serene_api::HttpWellnessApi;
use serene_core::{ChatMessage, SereneConfig, Sender};
use serene_reasoning::providers::create_client;
use serene_reasoning::ChatSession;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "serene", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "SERENE_CONFIG")]
    config: Option<PathBuf>,

    /// User id to log under (overrides config)
    #[arg(short, long)]
    user: Option<String>,

    /// Model to use for replies (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Start with an empty transcript instead of loading chat history
    #[arg(long)]
    no_history: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_logging(log_dir: Option<&PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "serene.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("serene")
        .join("config.toml")
}

fn history_file() -> Option<PathBuf> {
    let dir = dirs::data_dir()?.join("serene");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join("repl_history.txt"))
}

fn print_transcript(transcript: &[ChatMessage]) {
    if transcript.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for msg in transcript {
        let who = match msg.sender {
            Sender::User => "You",
            Sender::Bot => "Serene",
        };
        println!("[{}] {}: {}", msg.timestamp.format("%Y-%m-%d %H:%M"), who, msg.text);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_ref());

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    info!("Loading config from {}...", config_path.display());
    let mut config = SereneConfig::load_or_default(&config_path);
    if let Some(user) = args.user {
        config.session.user_id = user;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }

    info!(
        "Using {} provider with model {}",
        config.llm.provider, config.llm.model
    );
    let client = create_client(&config.llm)?;
    let api = Arc::new(HttpWellnessApi::new(&config.api)?);

    let mut session = ChatSession::from_config(&config, client, api);
    session
        .open(config.session.seed_history && !args.no_history)
        .await;

    let mut editor = DefaultEditor::new()?;
    let history_path = history_file();
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    println!("Serene is here. Type '/history' to review, '/quit' to leave.");

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        match trimmed {
            "/quit" | "quit" | "exit" => break,
            "/history" => {
                print_transcript(session.transcript());
                continue;
            }
            _ => {}
        }

        match session.send(&line).await {
            Ok(outcome) => {
                println!("\nSerene: {}\n", outcome.reply.text);
            }
            Err(e) => {
                warn!("Turn failed: {}", e);
                println!("\n[!] {}\n", e.user_message());
            }
        }
    }

    if let Some(path) = &history_path {
        if let Err(e) = editor.save_history(path) {
            warn!("Could not save input history: {}", e);
        }
    }

    info!("Waiting for pending logs...");
    session.close().await;
    println!("Take care.");
    Ok(())
}
