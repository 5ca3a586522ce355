//! Client-side view of the song list.
//!
//! [`ViewSink`] receives reconciliation effects; [`SongTable`] is the
//! in-memory table the CLI renders and picks download targets from.

use std::sync::{Arc, Mutex};

use crate::reconcile::Effect;
use crate::song::{Song, SongId};

/// Receiver of reconciliation effects. All three operations must tolerate
/// repeats and unknown ids.
pub trait ViewSink: Send + 'static {
    fn add(&mut self, song: &Song);
    fn enable(&mut self, id: SongId);
    fn remove(&mut self, id: SongId);

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::Add(song) => self.add(song),
            Effect::Enable(id) => self.enable(*id),
            Effect::Remove(id) => self.remove(*id),
        }
    }
}

impl<V: ViewSink> ViewSink for Arc<Mutex<V>> {
    fn add(&mut self, song: &Song) {
        let mut v = self.lock().unwrap_or_else(|p| p.into_inner());
        v.add(song);
    }

    fn enable(&mut self, id: SongId) {
        let mut v = self.lock().unwrap_or_else(|p| p.into_inner());
        v.enable(id);
    }

    fn remove(&mut self, id: SongId) {
        let mut v = self.lock().unwrap_or_else(|p| p.into_inner());
        v.remove(id);
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub song: Song,
    /// Download control state; rows start disabled.
    pub enabled: bool,
}

/// Ordered rows, newest at the bottom.
#[derive(Debug, Default, Clone)]
pub struct SongTable {
    rows: Vec<Row>,
}

impl SongTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: SongId) -> Option<&Row> {
        self.rows.iter().find(|r| r.song.id == id)
    }

    /// Song whose file may be downloaded: matched by file name, enabled only.
    pub fn download_target(&self, file_name: &str) -> Option<&Song> {
        self.rows
            .iter()
            .find(|r| r.enabled && r.song.file_name == file_name)
            .map(|r| &r.song)
    }

    /// Plain-text table, one row per song.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{:<6} {:<6} {:<9} {:<9} {}\n",
            "ID", "READY", "LENGTH", "SIZE", "TITLE"
        );
        for r in &self.rows {
            out.push_str(&format!(
                "{:<6} {:<6} {:<9} {:<9} {} - {}\n",
                r.song.id,
                if r.enabled { "yes" } else { "no" },
                r.song.length,
                r.song.size,
                r.song.author,
                r.song.title
            ));
        }
        out
    }
}

impl ViewSink for SongTable {
    fn add(&mut self, song: &Song) {
        if self.get(song.id).is_none() {
            self.rows.push(Row {
                song: song.clone(),
                enabled: false,
            });
        }
    }

    fn enable(&mut self, id: SongId) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.song.id == id) {
            row.enabled = true;
        }
    }

    fn remove(&mut self, id: SongId) {
        self.rows.retain(|r| r.song.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::Reconciler;
    use crate::song::sample;

    #[test]
    fn rows_start_disabled_and_enable_is_idempotent() {
        let mut t = SongTable::new();
        t.add(&sample(1, true));
        assert!(!t.get(SongId(1)).unwrap().enabled);
        t.enable(SongId(1));
        t.enable(SongId(1));
        assert!(t.get(SongId(1)).unwrap().enabled);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut t = SongTable::new();
        t.enable(SongId(9));
        t.remove(SongId(9));
        assert!(t.is_empty());
    }

    #[test]
    fn download_target_requires_enabled_row() {
        let mut t = SongTable::new();
        t.add(&sample(1, false));
        assert!(t.download_target("song-1.mp3").is_none());
        t.enable(SongId(1));
        assert_eq!(t.download_target("song-1.mp3").unwrap().id, SongId(1));
        assert!(t.download_target("song-2.mp3").is_none());
    }

    #[test]
    fn table_follows_reconciler() {
        let mut r = Reconciler::new();
        let mut t = SongTable::new();
        for snap in [
            vec![sample(1, false)],
            vec![sample(1, true), sample(2, false)],
            vec![sample(2, false)],
        ] {
            for e in r.apply(&snap) {
                t.apply(&e);
            }
        }
        assert_eq!(t.len(), 1);
        let row = t.get(SongId(2)).unwrap();
        assert!(!row.enabled);
    }

    #[test]
    fn shared_table_applies_through_mutex() {
        let shared = Arc::new(Mutex::new(SongTable::new()));
        let mut sink = Arc::clone(&shared);
        sink.apply(&Effect::Add(sample(3, false)));
        sink.apply(&Effect::Enable(SongId(3)));
        assert!(shared.lock().unwrap().get(SongId(3)).unwrap().enabled);
    }

    #[test]
    fn render_lists_rows() {
        let mut t = SongTable::new();
        t.add(&sample(1, false));
        t.add(&sample(2, false));
        t.enable(SongId(2));
        let text = t.render();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("author 2 - title 2"));
    }
}
