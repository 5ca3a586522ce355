//! `songsync download` / `songsync download-all` – fetch files from the server.

use anyhow::{Context as _, Result};
use songsync_core::poller;
use songsync_core::transfer;
use std::path::{Path, PathBuf};

use super::Context;

async fn fetch_to(ctx: &Context, url: String, cookie: Option<String>, dest: PathBuf) -> Result<u64> {
    let timeout = ctx.cfg.connect_timeout();
    tokio::task::spawn_blocking(move || {
        transfer::download_to(&url, cookie.as_deref(), &dest, timeout)
    })
    .await?
}

pub async fn run_download(ctx: &Context, file_name: &str, out: Option<PathBuf>) -> Result<()> {
    let session = ctx.session_id().await;
    let table = poller::snapshot_table(ctx.source(session.as_deref())?).await?;
    let song = table
        .download_target(file_name)
        .with_context(|| format!("'{}' is not in the song list or not ready yet", file_name))?;

    let dest = out.unwrap_or_else(|| PathBuf::from(transfer::local_file_name(&song.file_name)));
    let url = ctx.links.download_url(&song.file_name)?;
    let bytes = fetch_to(ctx, url.to_string(), ctx.cookie_header(session.as_deref()), dest.clone()).await?;
    println!("Saved {} ({} bytes).", dest.display(), bytes);
    Ok(())
}

pub async fn run_download_all(ctx: &Context, out: &Path) -> Result<()> {
    let session = ctx.session_id().await;
    let url = ctx.links.download_all_url()?;
    let bytes = fetch_to(
        ctx,
        url.to_string(),
        ctx.cookie_header(session.as_deref()),
        out.to_path_buf(),
    )
    .await
    .context("no songs to download, or the server refused")?;
    println!("Saved {} ({} bytes).", out.display(), bytes);
    Ok(())
}
