//! Session identifier: cookie parsing, persistence, and bootstrap.
//!
//! The server scopes the song list by a session cookie (`uid` by default)
//! that it mints on the first visit to `/`. We keep that id in the XDG
//! state dir and send it back on every request.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

/// Value of `name` in a `k1=v1; k2=v2` cookie string.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.trim() == name).then(|| v.trim())
    })
}

/// Value of cookie `name` from one response header line
/// (`Set-Cookie: name=value; Path=/`). Returns None for other headers.
pub fn set_cookie_value(header_line: &str, name: &str) -> Option<String> {
    let (header, value) = header_line.split_once(':')?;
    if !header.trim().eq_ignore_ascii_case("set-cookie") {
        return None;
    }
    let first = value.split(';').next()?;
    let (k, v) = first.split_once('=')?;
    if k.trim() != name {
        return None;
    }
    let v = v.trim().trim_matches('"');
    (!v.is_empty()).then(|| v.to_string())
}

/// `Cookie` request header for the given session.
pub fn cookie_header(name: &str, session_id: &str) -> String {
    format!("Cookie: {}={}", name, session_id)
}

/// Session id stored in a single-line file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.local/state/songsync/session`.
    pub fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("songsync")?;
        Ok(Self::at(xdg_dirs.place_state_file("session")?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session id; None if the file is missing or blank.
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => {
                let s = s.trim();
                Ok((!s.is_empty()).then(|| s.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read session: {}", self.path.display())),
        }
    }

    pub fn save(&self, session_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        std::fs::write(&self.path, format!("{}\n", session_id))
            .with_context(|| format!("write session: {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove session: {}", self.path.display())),
        }
    }
}

/// Visit the server root and return the session id it assigns.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn establish(
    base_url: &str,
    cookie_name: &str,
    connect_timeout: Duration,
) -> Result<String> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(base_url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(Duration::from_secs(30))?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        // Page body is not needed.
        transfer.write_function(|data| Ok(data.len()))?;
        transfer.perform().context("session request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", base_url, code);
    }

    let id = headers
        .iter()
        .find_map(|line| set_cookie_value(line, cookie_name))
        .with_context(|| format!("server did not set a '{}' cookie", cookie_name))?;
    tracing::info!("established session {}", id);
    Ok(id)
}
