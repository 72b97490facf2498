// ── Reactive door store ──
//
// Single-writer snapshot storage for door state. A refresh builds the
// complete replacement table first and publishes it with one send, so
// subscribers never observe a partially updated door list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::{Door, DoorId};
use crate::stream::DoorStream;

/// The published snapshot: doors keyed by stable id, in controller order.
pub type DoorTable = IndexMap<DoorId, Arc<Door>>;

/// Central reactive store for door state.
///
/// The coordinator is the only writer; entities and consumers read
/// shared snapshots and subscribe to replacement notifications via
/// `watch` channels.
pub struct DoorStore {
    snapshot: watch::Sender<Arc<DoorTable>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DoorStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(DoorTable::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            snapshot,
            last_refresh,
        }
    }

    // ── Write path (coordinator only) ────────────────────────────────

    /// Replace the entire snapshot with the doors from one refresh cycle.
    ///
    /// The new table is fully materialized before the single publish;
    /// notification therefore always carries a complete, consistent view.
    pub(crate) fn apply_snapshot(&self, doors: Vec<Door>) {
        let mut table = DoorTable::with_capacity(doors.len());
        for door in doors {
            table.insert(door.id.clone(), Arc::new(door));
        }

        self.snapshot.send_replace(Arc::new(table));
        let _ = self.last_refresh.send(Some(Utc::now()));
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<DoorTable> {
        self.snapshot.borrow().clone()
    }

    /// Look up a door by its stable id in the current snapshot.
    pub fn door(&self, id: &DoorId) -> Option<Arc<Door>> {
        self.snapshot.borrow().get(id).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> DoorStream {
        DoorStream::new(self.snapshot.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last refresh completed, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DoorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LockState;

    fn door(id: &str, name: &str, state: LockState) -> Door {
        Door {
            id: DoorId::new(id),
            name: name.into(),
            full_name: None,
            floor_id: None,
            bound_to_hub: true,
            lock_state: state,
            position: None,
        }
    }

    #[test]
    fn starts_empty_with_no_refresh_timestamp() {
        let store = DoorStore::new();
        assert!(store.is_empty());
        assert!(store.last_refresh().is_none());
        assert!(store.data_age().is_none());
    }

    #[test]
    fn apply_snapshot_replaces_whole_table() {
        let store = DoorStore::new();
        store.apply_snapshot(vec![
            door("a", "Front Door", LockState::Locked),
            door("b", "Side Entrance", LockState::Unlocked),
        ]);
        assert_eq!(store.len(), 2);

        // The next refresh drops door "b" entirely.
        store.apply_snapshot(vec![door("a", "Front Door", LockState::Locked)]);
        assert_eq!(store.len(), 1);
        assert!(store.door(&DoorId::new("a")).is_some());
        assert!(store.door(&DoorId::new("b")).is_none());
    }

    #[test]
    fn lookup_is_by_id_not_position() {
        let store = DoorStore::new();
        store.apply_snapshot(vec![
            door("a", "Front Door", LockState::Locked),
            door("b", "Side Entrance", LockState::Locked),
        ]);

        // Reordered on the next refresh; ids still resolve correctly.
        store.apply_snapshot(vec![
            door("b", "Side Entrance", LockState::Locked),
            door("a", "Front Door", LockState::Unlocked),
        ]);

        let a = store.door(&DoorId::new("a")).unwrap();
        assert_eq!(a.name, "Front Door");
        assert_eq!(a.lock_state, LockState::Unlocked);
    }

    #[test]
    fn snapshot_preserves_controller_order() {
        let store = DoorStore::new();
        store.apply_snapshot(vec![
            door("z", "Warehouse", LockState::Locked),
            door("a", "Front Door", LockState::Locked),
        ]);

        let snapshot = store.snapshot();
        let names: Vec<&str> = snapshot
            .values()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Warehouse", "Front Door"]);
    }

    #[test]
    fn one_notification_per_refresh() {
        let store = DoorStore::new();
        let mut stream = store.subscribe();
        assert!(stream.current().is_empty());

        store.apply_snapshot(vec![
            door("a", "Front Door", LockState::Locked),
            door("b", "Side Entrance", LockState::Locked),
        ]);

        // Both doors arrive in the same notification: the snapshot is
        // fully materialized before subscribers see anything.
        let snap = stream.latest();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn refresh_timestamp_advances() {
        let store = DoorStore::new();
        store.apply_snapshot(vec![door("a", "Front Door", LockState::Locked)]);
        assert!(store.last_refresh().is_some());
        assert!(store.data_age().is_some());
    }
}
