//! `songsync session` – show, reset, renew, or set the stored session id.

use anyhow::Result;
use songsync_core::session;

use super::Context;
use crate::cli::SessionAction;

pub async fn run_session(ctx: &Context, action: SessionAction) -> Result<()> {
    match action {
        SessionAction::Show => match ctx.store.load()? {
            Some(id) => println!("{}", id),
            None => println!("No session (stored at {}).", ctx.store.path().display()),
        },
        SessionAction::Reset => {
            ctx.store.clear()?;
            println!("Session cleared.");
        }
        SessionAction::New => {
            let id = ctx.new_session().await?;
            println!("{}", id);
        }
        SessionAction::Set { value } => {
            let id = session_id_from_input(&value, &ctx.cfg.session_cookie)?;
            ctx.store.save(id)?;
            println!("{}", id);
        }
    }
    Ok(())
}

/// Session id from user input: either the bare id or a `k=v; ...` cookie
/// string that contains `cookie_name`.
fn session_id_from_input<'a>(input: &'a str, cookie_name: &str) -> Result<&'a str> {
    let input = input.trim();
    let id = if input.contains('=') {
        session::cookie_value(input, cookie_name)
            .ok_or_else(|| anyhow::anyhow!("no `{}` cookie in {:?}", cookie_name, input))?
    } else {
        input
    };
    if id.is_empty() {
        anyhow::bail!("empty session id");
    }
    Ok(id)
}
