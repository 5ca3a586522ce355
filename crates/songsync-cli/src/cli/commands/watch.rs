//! `songsync watch` – poll the song list and print changes until Ctrl-C.

use anyhow::Result;
use songsync_core::poller::Poller;
use songsync_core::song::{Song, SongId};
use songsync_core::view::{SongTable, ViewSink};
use std::time::Duration;

use super::Context;

/// Prints one line per visible change; repeated enables stay quiet.
struct PrintSink {
    table: SongTable,
}

impl ViewSink for PrintSink {
    fn add(&mut self, song: &Song) {
        println!(
            "+ {:<6} {} - {} ({}, {})",
            song.id, song.author, song.title, song.length, song.size
        );
        self.table.add(song);
    }

    fn enable(&mut self, id: SongId) {
        let was_enabled = self.table.get(id).map(|r| r.enabled).unwrap_or(true);
        self.table.enable(id);
        if !was_enabled {
            if let Some(row) = self.table.get(id) {
                println!("* {:<6} ready: {}", id, row.song.file_name);
            }
        }
    }

    fn remove(&mut self, id: SongId) {
        if self.table.get(id).is_some() {
            println!("- {}", id);
        }
        self.table.remove(id);
    }
}

pub async fn run_watch(ctx: &Context, interval_ms: Option<u64>) -> Result<()> {
    let session = ctx.session_id().await;
    let source = ctx.source(session.as_deref())?;
    let interval = match interval_ms {
        Some(ms) => Duration::from_millis(ms.max(songsync_core::config::MIN_POLL_INTERVAL_MS)),
        None => ctx.cfg.poll_interval(),
    };
    println!(
        "Watching {} every {} ms (Ctrl-C to stop).",
        ctx.links.list_url()?,
        interval.as_millis()
    );

    let sink = PrintSink {
        table: SongTable::new(),
    };
    let handle = Poller::new(source, sink, interval).spawn();

    tokio::signal::ctrl_c().await?;
    let stats = handle.stop().await?;
    tracing::info!(
        ticks = stats.ticks,
        applied = stats.applied,
        failed = stats.failed,
        "watch finished"
    );
    Ok(())
}
