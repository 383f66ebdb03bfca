use std::io::{self, Read, Write};

use clap::Parser;
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

use tutor_chat::chat::HttpChatClient;
use tutor_chat::cli::{Args, Command, SettingsAction};
use tutor_chat::config::ClientConfig;
use tutor_chat::error::TutorError;
use tutor_chat::escape::escape_html;
use tutor_chat::format::format_message;
use tutor_chat::history::Role;
use tutor_chat::session::{ChatSession, RenderedMessage};
use tutor_chat::settings::{Language, SettingsStore};
use tutor_chat::storage::FileStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Unexpected failures are logged, never shown as chat output.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!(%info, "unexpected failure");
    }));
}

/// The argument if given, otherwise all of stdin minus one trailing newline.
fn read_input(text: Option<String>) -> io::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}

fn run_settings(action: SettingsAction, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SettingsStore::new(FileStore::new(&config.storage_dir));
    let mut settings = store.load();

    if let SettingsAction::Set { language, auto_play } = action {
        if let Some(code) = language {
            settings.language = Language::coerce(&code);
        }
        if let Some(auto_play) = auto_play {
            settings.auto_play_audio = auto_play;
        }
        store.save(&settings)?;
        eprintln!("{}", "Settings saved.".green());
    }

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn print_message(message: &RenderedMessage, html: bool) {
    if html {
        println!("{}", message.html);
        return;
    }
    let label = match message.role {
        Role::User => "you>".green().bold(),
        Role::Assistant => "tutor>".cyan().bold(),
    };
    println!("{} {}", label, message.content);
}

async fn run_chat(config: &ClientConfig, html: bool) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpChatClient::new(&config.endpoint, config.request_timeout())?;
    let url = client.url().to_string();
    let mut session = ChatSession::new(client, FileStore::new(&config.storage_dir));
    let settings = session.settings();

    eprintln!(
        "{} {} (language: {}, autoplay: {})",
        "Connected to".dimmed(),
        url.bright_blue(),
        settings.language,
        settings.auto_play_audio
    );
    eprintln!("{}", "Type /clear to reset the conversation, /quit to exit.".dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "you>".green().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                print_message(&session.clear_history(), html);
                continue;
            }
            _ => {}
        }

        match session.submit_message(&line).await {
            Ok(turn) => {
                for message in turn.messages.iter().filter(|m| m.role == Role::Assistant) {
                    print_message(message, html);
                }
                if let Some(url) = turn.audio_url {
                    println!("{} {}", "audio:".magenta(), url);
                }
            }
            Err(TutorError::EmptyMessage) => {}
            Err(e @ TutorError::InputTooLarge { .. }) => {
                eprintln!("{} {}", "Not sent:".red().bold(), e);
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    install_panic_hook();

    let args = Args::parse();
    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(storage_dir) = args.storage_dir {
        config.storage_dir = storage_dir;
    }

    match args.command {
        Command::Format { text } => println!("{}", format_message(&read_input(text)?)),
        Command::Escape { text } => println!("{}", escape_html(&read_input(text)?)),
        Command::Settings { action } => run_settings(action, &config)?,
        Command::Chat { html } => run_chat(&config, html).await?,
    }

    Ok(())
}
