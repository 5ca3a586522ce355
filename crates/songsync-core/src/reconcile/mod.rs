//! List reconciliation: diff the latest song list against what is displayed.
//!
//! A [`Reconciler`] owns the displayed set and turns each authoritative
//! snapshot into a list of [`Effect`]s for a view to apply. Snapshots are
//! never merged: after a snapshot is applied, the displayed set equals the
//! ids it contains.

mod effect;

pub use effect::Effect;

use std::collections::HashSet;

use crate::song::{Song, SongId};

/// Outcome of applying a sequence-tagged fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// An equal or newer response was already applied; nothing changed.
    Stale { seq: u64, last_applied: u64 },
    /// The server answered "no data"; the displayed set is untouched.
    NoData,
    /// The snapshot was reconciled into these effects (possibly none).
    Effects(Vec<Effect>),
}

/// Displayed-set state carried across ticks.
#[derive(Debug, Default)]
pub struct Reconciler {
    /// Displayed ids in the order they were added.
    displayed: Vec<SongId>,
    members: HashSet<SongId>,
    /// Ids whose download control has been enabled. Never shrinks except on removal.
    enabled: HashSet<SongId>,
    last_applied: Option<u64>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently displayed ids, oldest addition first.
    pub fn displayed(&self) -> &[SongId] {
        &self.displayed
    }

    pub fn is_displayed(&self, id: SongId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_enabled(&self, id: SongId) -> bool {
        self.enabled.contains(&id)
    }

    /// Sequence number of the last applied response, if any.
    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    /// Reconcile one authoritative snapshot.
    ///
    /// Emits `Add` for ids not yet displayed, `Enable` for every ready song,
    /// and `Remove` for displayed ids missing from the snapshot, in that
    /// order of discovery. Applying the same snapshot again emits no `Add`
    /// or `Remove`.
    pub fn apply(&mut self, snapshot: &[Song]) -> Vec<Effect> {
        let mut effects = Vec::new();
        let mut seen: HashSet<SongId> = HashSet::with_capacity(snapshot.len());

        for song in snapshot {
            if self.members.insert(song.id) {
                self.displayed.push(song.id);
                effects.push(Effect::Add(song.clone()));
            }
            seen.insert(song.id);
            // A later not-ready report never disables an enabled control.
            if song.is_ready() {
                self.enabled.insert(song.id);
                effects.push(Effect::Enable(song.id));
            }
        }

        let (kept, absent): (Vec<SongId>, Vec<SongId>) = self
            .displayed
            .iter()
            .copied()
            .partition(|id| seen.contains(id));
        self.displayed = kept;
        for id in absent {
            self.members.remove(&id);
            self.enabled.remove(&id);
            effects.push(Effect::Remove(id));
        }

        effects
    }

    /// Apply the result of fetch number `seq`.
    ///
    /// Responses whose sequence number is not newer than the last applied
    /// one are discarded, so an overlapping slow fetch can never roll the
    /// view back to an older list.
    pub fn apply_tagged(&mut self, seq: u64, snapshot: Option<&[Song]>) -> Applied {
        if let Some(last_applied) = self.last_applied {
            if seq <= last_applied {
                return Applied::Stale { seq, last_applied };
            }
        }
        self.last_applied = Some(seq);
        match snapshot {
            None => Applied::NoData,
            Some(songs) => Applied::Effects(self.apply(songs)),
        }
    }
}
