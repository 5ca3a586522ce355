//! `songsync list` – fetch the song list once and print it.

use anyhow::Result;
use songsync_core::poller;

use super::Context;

pub async fn run_list(ctx: &Context) -> Result<()> {
    let session = ctx.session_id().await;
    let table = poller::snapshot_table(ctx.source(session.as_deref())?).await?;
    if table.is_empty() {
        println!("No songs.");
    } else {
        print!("{}", table.render());
    }
    Ok(())
}
