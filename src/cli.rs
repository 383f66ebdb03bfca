use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tutor-chat")]
#[command(version)]
#[command(about = "Terminal client for an AI language tutor with safe HTML message formatting")]
pub struct Args {
    /// Path to a TOML config file (defaults to ./tutor-chat.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat backend base URL, overrides config and TUTOR_CHAT_ENDPOINT
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Directory for persisted preferences
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Interactive chat; `/clear` resets history, `/quit` exits
    Chat {
        /// Print HTML fragments instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Format text (argument or stdin) into an HTML fragment
    Format { text: Option<String> },
    /// HTML-escape text (argument or stdin)
    Escape { text: Option<String> },
    /// Show or change persisted preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum SettingsAction {
    /// Print the current preferences as JSON
    Show,
    /// Update preferences; unknown languages fall back to zh
    Set {
        /// Interface language: zh, fr or en
        #[arg(long)]
        language: Option<String>,

        /// Play reply audio automatically
        #[arg(long)]
        auto_play: Option<bool>,
    },
}
