// ── Wire-to-domain conversion ──
//
// Translates accessly-api response types into domain types. Unknown
// relay strings degrade to `Unlocked` rather than failing the whole
// refresh; one odd door must not take down the snapshot.

use accessly_api::types::DoorResponse;

use crate::model::{Door, DoorId, DoorPosition, LockState};

impl From<DoorResponse> for Door {
    fn from(resp: DoorResponse) -> Self {
        let lock_state = lock_state_from_relay(&resp.door_lock_relay_status);
        let position = resp
            .door_position_status
            .as_deref()
            .and_then(position_from_status);

        Self {
            id: DoorId::new(resp.id),
            name: resp.name,
            full_name: resp.full_name,
            floor_id: resp.floor_id,
            bound_to_hub: resp.is_bind_hub,
            lock_state,
            position,
        }
    }
}

/// Map the controller's relay status string onto [`LockState`].
fn lock_state_from_relay(raw: &str) -> LockState {
    match raw {
        "lock" | "locked" => LockState::Locked,
        "locking" => LockState::Locking,
        "unlocking" => LockState::Unlocking,
        // "unlock", "unlocked", and anything unrecognized
        _ => LockState::Unlocked,
    }
}

/// Map the position sensor string onto [`DoorPosition`].
fn position_from_status(raw: &str) -> Option<DoorPosition> {
    match raw {
        "open" => Some(DoorPosition::Open),
        "close" | "closed" => Some(DoorPosition::Closed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(relay: &str) -> DoorResponse {
        DoorResponse {
            id: "door-1".into(),
            name: "Front Door".into(),
            full_name: Some("HQ - Front Door".into()),
            floor_id: Some("floor-1".into()),
            door_type: Some("door".into()),
            is_bind_hub: true,
            door_lock_relay_status: relay.into(),
            door_position_status: Some("close".into()),
        }
    }

    #[test]
    fn converts_locked_door() {
        let door = Door::from(resp("lock"));
        assert_eq!(door.id.as_str(), "door-1");
        assert_eq!(door.name, "Front Door");
        assert_eq!(door.lock_state, LockState::Locked);
        assert_eq!(door.position, Some(DoorPosition::Closed));
        assert!(door.bound_to_hub);
    }

    #[test]
    fn transitional_relay_states() {
        assert_eq!(Door::from(resp("locking")).lock_state, LockState::Locking);
        assert_eq!(
            Door::from(resp("unlocking")).lock_state,
            LockState::Unlocking
        );
    }

    #[test]
    fn unknown_relay_degrades_to_unlocked() {
        let door = Door::from(resp("jammed"));
        assert_eq!(door.lock_state, LockState::Unlocked);
        assert!(!door.is_available());
    }
}
