//! Single-stream GET of a song (or the session zip) into a local file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Suffix of the file a download is streamed into before it replaces `dest`.
pub const TEMP_SUFFIX: &str = ".part";

/// Fallback when a server-provided name sanitizes to nothing.
const DEFAULT_SONG_FILE: &str = "song.mp3";

/// Local file name for a server-provided song name.
///
/// Path separators, NUL and control characters become `_`; leading and
/// trailing dots and spaces are dropped so the result can never escape the
/// target directory. Truncated to 255 bytes (Linux NAME_MAX).
pub fn local_file_name(server_name: &str) -> String {
    const NAME_MAX: usize = 255;

    let replaced: String = server_name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == ' ' || c == '.');

    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let name = &trimmed[..take];
    if name.is_empty() {
        DEFAULT_SONG_FILE.to_string()
    } else {
        name.to_string()
    }
}

/// Path the body is written to while downloading: `dest` plus `.part`
/// (`songs.zip` -> `songs.zip.part`).
pub fn temp_path(dest: &Path) -> PathBuf {
    let mut o = dest.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Downloads `url` to `dest`, sending `cookie` (a full `Cookie: ...` header
/// line) if given. Returns the number of bytes written.
///
/// The body goes to [`temp_path`] first and is renamed onto `dest` only after
/// a 2xx response, so a failed download leaves an existing `dest` untouched.
/// On failure the temp file is removed.
///
/// Blocking; call from `spawn_blocking` if used from async code.
pub fn download_to(
    url: &str,
    cookie: Option<&str>,
    dest: &Path,
    connect_timeout: Duration,
) -> Result<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let part = temp_path(dest);
    let written = match download_inner(url, cookie, &part, connect_timeout) {
        Ok(n) => n,
        Err(e) => {
            let _ = std::fs::remove_file(&part);
            return Err(e);
        }
    };
    if let Err(e) = std::fs::rename(&part, dest) {
        let _ = std::fs::remove_file(&part);
        return Err(e).with_context(|| {
            format!("failed to rename {} to {}", part.display(), dest.display())
        });
    }

    tracing::info!(bytes = written, "downloaded {} to {}", url, dest.display());
    Ok(written)
}

fn download_inner(
    url: &str,
    cookie: Option<&str>,
    part: &Path,
    connect_timeout: Duration,
) -> Result<u64> {
    let mut file =
        File::create(part).with_context(|| format!("create file: {}", part.display()))?;
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    if let Some(cookie) = cookie {
        let mut list = curl::easy::List::new();
        list.append(cookie)?;
        easy.http_headers(list)?;
    }

    let perform = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("download write failed: {}", e);
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(e).with_context(|| format!("write {}", part.display()));
    }
    perform.context("GET request failed")?;

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    file.flush()?;
    Ok(written)
}
