//! Song records as served by the list endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable server-side identifier of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub u64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the song list.
///
/// Field names follow the wire format; `downloaded` is the "ready" flag that
/// gates the per-song download control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub title: String,
    /// Formatted duration (`HH:MM:SS`).
    #[serde(default)]
    pub length: String,
    /// Human-readable file size (e.g. `4.2MB`).
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// Name under which the server offers the file at `/download/<file_name>`.
    #[serde(default)]
    pub file_name: String,
    /// External video id the song was extracted from.
    #[serde(default)]
    pub yt_id: String,
    #[serde(default)]
    pub downloaded: bool,
}

impl Song {
    pub fn is_ready(&self) -> bool {
        self.downloaded
    }
}

/// Decode a list response body.
///
/// A JSON `null` is the server's "no data" answer and yields `None`.
pub fn parse_song_list(body: &[u8]) -> serde_json::Result<Option<Vec<Song>>> {
    serde_json::from_slice(body)
}

/// Minimal song for tests in other modules.
#[cfg(test)]
pub(crate) fn sample(id: u64, ready: bool) -> Song {
    Song {
        id: SongId(id),
        author: format!("author {id}"),
        title: format!("title {id}"),
        length: "00:03:00".to_string(),
        size: "3.0MB".to_string(),
        thumbnail_url: String::new(),
        file_name: format!("song-{id}.mp3"),
        yt_id: format!("yt{id}"),
        downloaded: ready,
    }
}
