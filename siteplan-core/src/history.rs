//! Bounded undo/redo history over full layout snapshots.
//!
//! Snapshots are deep copies of [`SiteLayout`] taken once per committed
//! mutation. Undo and redo move a cursor over the snapshot list. While a
//! restore is in flight the replay flag stays raised, so the commit path a
//! restore triggers cannot push the restored state back as a new entry.

use crate::layout::SiteLayout;

/// Maximum number of snapshots kept; the oldest is evicted past this.
pub const MAX_SNAPSHOTS: usize = 50;

/// Snapshot history with a movable cursor.
#[derive(Debug)]
pub struct History {
    snapshots: Vec<SiteLayout>,
    index: usize,
    replaying: bool,
}

impl History {
    /// New history seeded with the initial state as its first snapshot, so
    /// undoing every later commit lands back on it.
    #[must_use]
    pub fn new(initial: SiteLayout) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            replaying: false,
        }
    }

    /// Record a committed state.
    ///
    /// No-op while a replay is in progress. Otherwise truncates any future
    /// entries past the cursor, appends, and evicts the oldest snapshot if
    /// the bound is exceeded.
    pub fn push(&mut self, snapshot: SiteLayout) {
        if self.replaying {
            return;
        }
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > MAX_SNAPSHOTS {
            self.snapshots.remove(0);
            tracing::debug!("history bound reached, oldest snapshot evicted");
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step the cursor back one snapshot, raising the replay flag.
    ///
    /// Returns a deep copy of the snapshot to restore, or `None` at the
    /// oldest entry. The caller applies the snapshot, lets every
    /// state-change listener run, and only then calls
    /// [`History::end_replay`]; pushes in between are suppressed.
    pub fn begin_undo(&mut self) -> Option<SiteLayout> {
        if self.index == 0 {
            return None;
        }
        self.replaying = true;
        self.index -= 1;
        Some(self.snapshots[self.index].clone())
    }

    /// Step the cursor forward one snapshot, raising the replay flag.
    ///
    /// Symmetric with [`History::begin_undo`].
    pub fn begin_redo(&mut self) -> Option<SiteLayout> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.replaying = true;
        self.index += 1;
        Some(self.snapshots[self.index].clone())
    }

    /// Lower the replay flag once a restore has fully propagated.
    pub fn end_replay(&mut self) {
        self.replaying = false;
    }

    /// Whether a restore is currently in flight.
    #[must_use]
    pub const fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Whether undo can step back.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether redo can step forward.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Polygon};

    fn layout_with_square(side: f64) -> SiteLayout {
        SiteLayout {
            boundary: Some(Polygon::rectangle(
                Point::new(0.0, 0.0),
                Point::new(side, side),
            )),
            ..SiteLayout::default()
        }
    }

    #[test]
    fn test_push_then_undo_restores_prior() {
        let mut history = History::new(SiteLayout::default());
        history.push(layout_with_square(10.0));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let restored = history.begin_undo().expect("one step back");
        assert_eq!(restored, SiteLayout::default());
        history.end_replay();
        assert!(history.can_redo());
    }

    #[test]
    fn test_undo_stops_at_oldest() {
        let mut history = History::new(SiteLayout::default());
        assert!(history.begin_undo().is_none());
        assert!(!history.is_replaying());
    }

    #[test]
    fn test_redo_restores_undone_state() {
        let mut history = History::new(SiteLayout::default());
        let committed = layout_with_square(10.0);
        history.push(committed.clone());

        history.begin_undo().expect("step back");
        history.end_replay();
        let restored = history.begin_redo().expect("step forward");
        history.end_replay();
        assert_eq!(restored, committed);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_truncates_future_entries() {
        let mut history = History::new(SiteLayout::default());
        history.push(layout_with_square(10.0));
        history.push(layout_with_square(20.0));
        history.begin_undo().expect("step back");
        history.end_replay();

        history.push(layout_with_square(30.0));
        // The 20.0 branch is gone; redo has nothing.
        assert!(!history.can_redo());
        assert_eq!(history.snapshot_count(), 3);
    }

    #[test]
    fn test_push_suppressed_while_replaying() {
        let mut history = History::new(SiteLayout::default());
        history.push(layout_with_square(10.0));
        history.begin_undo().expect("step back");

        // A listener reacting to the restore tries to re-push.
        history.push(layout_with_square(99.0));
        assert_eq!(history.snapshot_count(), 2);
        assert!(history.can_redo());
        history.end_replay();
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_bound_evicts_oldest() {
        let mut history = History::new(SiteLayout::default());
        for i in 0..(MAX_SNAPSHOTS + 10) {
            history.push(layout_with_square(i as f64 + 1.0));
        }
        assert_eq!(history.snapshot_count(), MAX_SNAPSHOTS);

        // Walk all the way back; the oldest surviving snapshot is no longer
        // the seeded initial state.
        let mut oldest = None;
        while let Some(snapshot) = history.begin_undo() {
            history.end_replay();
            oldest = Some(snapshot);
        }
        assert!(oldest.expect("walked back").boundary.is_some());
    }
}
