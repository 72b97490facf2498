// ── Lock entity adapter ──
//
// One DoorLockEntity per door discovered at setup. Mirrors coordinator
// snapshots into a host-consumable composite state and forwards unlock
// commands to the device. The entity never drives lock-state
// transitions; it only observes them.

use std::sync::Arc;

use tokio::sync::watch;

use crate::command::{Command, CommandHandle};
use crate::error::CoreError;
use crate::model::{Door, DoorId};
use crate::store::DoorStore;

/// Integration namespace used in composite device identifiers.
pub const DOMAIN: &str = "unifi_access";
/// Hardware model reported in device descriptors.
pub const MODEL: &str = "UAH";
/// Manufacturer reported in device descriptors.
pub const MANUFACTURER: &str = "Unifi";

// ── Projections ─────────────────────────────────────────────────────

/// Composite host-visible lock state, pushed on every coordinator
/// update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct LockEntityState {
    pub is_locked: bool,
    pub is_locking: bool,
    pub is_unlocking: bool,
    pub available: bool,
}

impl LockEntityState {
    fn from_door(door: &Door) -> Self {
        Self {
            is_locked: door.lock_state.is_locked(),
            is_locking: door.lock_state.is_locking(),
            is_unlocking: door.lock_state.is_unlocking(),
            available: door.is_available(),
        }
    }
}

/// Identity projection for the host's device registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Composite identifier: (integration namespace, door id).
    pub identifiers: (String, String),
    pub name: String,
    pub model: &'static str,
    pub manufacturer: &'static str,
}

// ── Capability traits ───────────────────────────────────────────────

/// Observes coordinator refresh notifications.
pub trait CoordinatorObserver {
    /// React to a snapshot replacement. Must be idempotent: repeated
    /// invocation with unchanged data produces nothing beyond a
    /// redundant state-write.
    fn handle_coordinator_update(&self);
}

/// Accepts host-issued lock commands.
pub trait LockControl {
    /// Unlock the door, optionally with a passcode.
    ///
    /// Never mutates observable lock state: the flags only change when a
    /// later refresh notification reports the new relay status. Failures
    /// propagate unchanged to the caller.
    fn unlock(
        &self,
        passcode: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), CoreError>> + Send;
}

// ── DoorLockEntity ──────────────────────────────────────────────────

/// Per-door bridge between coordinator snapshots and host-visible lock
/// state.
///
/// Holds the store handle plus its door's stable id; display fields are
/// cached at construction and never refreshed (the id, not the name, is
/// the correlation key). The composite state travels through a `watch`
/// channel the host can subscribe to.
pub struct DoorLockEntity {
    store: Arc<DoorStore>,
    commands: CommandHandle,
    door_id: DoorId,
    name: String,
    state: watch::Sender<LockEntityState>,
}

impl DoorLockEntity {
    /// Build an entity for a door present in the current snapshot,
    /// capturing its id, display name, and initial lock flags.
    pub fn new(store: Arc<DoorStore>, commands: CommandHandle, door: &Door) -> Self {
        let (state, _) = watch::channel(LockEntityState::from_door(door));

        Self {
            store,
            commands,
            door_id: door.id.clone(),
            name: door.name.clone(),
            state,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn unique_id(&self) -> &DoorId {
        &self.door_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current composite state (last pushed projection).
    pub fn state(&self) -> LockEntityState {
        *self.state.borrow()
    }

    pub fn is_locked(&self) -> bool {
        self.state().is_locked
    }

    pub fn is_locking(&self) -> bool {
        self.state().is_locking
    }

    pub fn is_unlocking(&self) -> bool {
        self.state().is_unlocking
    }

    /// Subscribe to composite state writes (the host's state-read path).
    pub fn subscribe_state(&self) -> watch::Receiver<LockEntityState> {
        self.state.subscribe()
    }

    /// Availability always derives from the live snapshot, not the
    /// cached projection: the host may poll it between notifications.
    /// A door missing from the current snapshot is unavailable.
    pub fn available(&self) -> bool {
        self.store
            .door(&self.door_id)
            .is_some_and(|door| door.is_available())
    }

    /// Identity projection. Pure; no side effects.
    pub fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            identifiers: (DOMAIN.to_owned(), self.door_id.to_string()),
            name: self.name.clone(),
            model: MODEL,
            manufacturer: MANUFACTURER,
        }
    }
}

impl CoordinatorObserver for DoorLockEntity {
    fn handle_coordinator_update(&self) {
        let Some(door) = self.store.door(&self.door_id) else {
            // Door disappeared from the snapshot: flag unavailable but
            // keep the last known lock flags.
            self.state.send_modify(|s| s.available = false);
            return;
        };

        // Unconditional write -- repeating with unchanged data is just a
        // redundant state-write, which is the contract.
        self.state.send_replace(LockEntityState::from_door(&door));
    }
}

impl LockControl for DoorLockEntity {
    async fn unlock(&self, passcode: Option<&str>) -> Result<(), CoreError> {
        self.commands
            .submit(Command::UnlockDoor {
                id: self.door_id.clone(),
                passcode: passcode.map(str::to_owned),
            })
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LockState;
    use tokio::sync::mpsc;

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

    fn command_handle() -> CommandHandle {
        let (tx, _rx) = mpsc::channel(8);
        CommandHandle::new(tx)
    }

    fn entity_for(store: &Arc<DoorStore>, id: &str) -> DoorLockEntity {
        let snapshot = store.door(&DoorId::new(id)).unwrap();
        DoorLockEntity::new(Arc::clone(store), command_handle(), &snapshot)
    }

    #[test]
    fn constructor_captures_snapshot_fields() {
        let store = Arc::new(DoorStore::new());
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Locked)]);

        let entity = entity_for(&store, "door-1");

        assert_eq!(entity.unique_id().as_str(), "door-1");
        assert_eq!(entity.name(), "Front Door");
        assert!(entity.is_locked());
        assert!(!entity.is_locking());
        assert!(!entity.is_unlocking());
        assert!(entity.available());
    }

    #[test]
    fn descriptor_is_a_pure_projection() {
        let store = Arc::new(DoorStore::new());
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Locked)]);

        let entity = entity_for(&store, "door-1");
        let descriptor = entity.descriptor();

        assert_eq!(
            descriptor.identifiers,
            ("unifi_access".to_owned(), "door-1".to_owned())
        );
        assert_eq!(descriptor.name, "Front Door");
        assert_eq!(descriptor.model, "UAH");
        assert_eq!(descriptor.manufacturer, "Unifi");
    }

    #[test]
    fn availability_reads_live_snapshot_cached_fields_do_not() {
        let store = Arc::new(DoorStore::new());
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Locked)]);

        let entity = entity_for(&store, "door-1");
        assert!(entity.available());

        // The store is refreshed, but no update notification has been
        // handled yet.
        store.apply_snapshot(vec![door("door-1", "Main Entrance", LockState::Unlocked)]);

        assert!(!entity.available()); // live read
        assert_eq!(entity.name(), "Front Door"); // cached
        assert!(entity.is_locked()); // cached until handled
    }

    #[test]
    fn update_handling_mirrors_new_snapshot() {
        let store = Arc::new(DoorStore::new());
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Locked)]);

        let entity = entity_for(&store, "door-1");
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Unlocking)]);

        entity.handle_coordinator_update();

        let state = entity.state();
        assert!(!state.is_locked);
        assert!(state.is_unlocking);
        assert!(!state.available);
    }

    #[test]
    fn update_handling_is_idempotent() {
        let store = Arc::new(DoorStore::new());
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Locked)]);

        let entity = entity_for(&store, "door-1");

        entity.handle_coordinator_update();
        let first = entity.state();
        entity.handle_coordinator_update();
        let second = entity.state();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_door_reports_unavailable_keeps_flags() {
        let store = Arc::new(DoorStore::new());
        store.apply_snapshot(vec![door("door-1", "Front Door", LockState::Locked)]);

        let entity = entity_for(&store, "door-1");

        // The door vanishes on the next refresh.
        store.apply_snapshot(Vec::new());
        entity.handle_coordinator_update();

        let state = entity.state();
        assert!(!state.available);
        assert!(state.is_locked); // last known flags retained
        assert!(!entity.available());
    }
}
