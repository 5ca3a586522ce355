//! CLI for songsync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use songsync_core::config;
use std::path::PathBuf;

use commands::{run_download, run_download_all, run_list, run_session, run_watch, Context};

/// Top-level CLI for songsync.
#[derive(Debug, Parser)]
#[command(name = "songsync")]
#[command(about = "songsync: mirror a song server's download list", long_about = None)]
pub struct Cli {
    /// Server base URL (overrides `server_url` from config.toml).
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll the song list and print changes until Ctrl-C.
    Watch {
        /// Poll interval in milliseconds (overrides `poll_interval_ms`).
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },

    /// Fetch the song list once and print it.
    List,

    /// Download one song by file name (only once the server marks it ready).
    Download {
        /// File name as shown by `list`.
        file_name: String,
        /// Destination path (default: the file name in the current directory).
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Download every song of the session as one zip archive.
    DownloadAll {
        /// Destination path.
        #[arg(long, value_name = "PATH", default_value = "songs.zip")]
        out: PathBuf,
    },

    /// Inspect or change the stored session id.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum SessionAction {
    /// Print the stored session id.
    Show,
    /// Forget the stored session id.
    Reset,
    /// Ask the server for a fresh session id and store it.
    New,
    /// Store a session id, e.g. to share the list a browser sees.
    Set {
        /// A bare id, or a cookie string copied from the browser
        /// (`uid=...; other=...`).
        value: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        if let Some(server) = cli.server {
            cfg.server_url = server;
        }
        tracing::debug!("loaded config: {:?}", cfg);
        let ctx = Context::new(cfg)?;

        match cli.command {
            CliCommand::Watch { interval_ms } => run_watch(&ctx, interval_ms).await?,
            CliCommand::List => run_list(&ctx).await?,
            CliCommand::Download { file_name, out } => {
                run_download(&ctx, &file_name, out).await?
            }
            CliCommand::DownloadAll { out } => run_download_all(&ctx, &out).await?,
            CliCommand::Session { action } => run_session(&ctx, action).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
