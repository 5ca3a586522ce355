//! View effects produced by reconciliation.

use std::fmt;

use crate::song::{Song, SongId};

/// A change the view must apply to stay in sync with the server list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Render a new row for this song, download control disabled.
    Add(Song),
    /// Enable the download control of this song. Safe to repeat.
    Enable(SongId),
    /// Drop the row of this song.
    Remove(SongId),
}

impl Effect {
    /// True for effects that change which rows exist.
    pub fn is_structural(&self) -> bool {
        matches!(self, Effect::Add(_) | Effect::Remove(_))
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Add(song) => write!(f, "+ {} {} - {}", song.id, song.author, song.title),
            Effect::Enable(id) => write!(f, "* {} ready", id),
            Effect::Remove(id) => write!(f, "- {}", id),
        }
    }
}
