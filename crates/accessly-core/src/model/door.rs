// ── Door domain types ──
//
// DoorId is the foundation of the whole layer: it is the controller's
// stable identifier and the sole key correlating a refreshed snapshot
// to its lock entity. Positions in the door list carry no meaning.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── DoorId ──────────────────────────────────────────────────────────

/// Stable controller-assigned identifier for a door.
///
/// Survives refreshes, renames, and reordering of the door list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorId(String);

impl DoorId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DoorId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for DoorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DoorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ── LockState ───────────────────────────────────────────────────────

/// Lock relay state as last reported by the controller.
///
/// Purely observational: the bridge never drives transitions, it only
/// mirrors whatever the latest snapshot says. `Locking` and `Unlocking`
/// are transient and resolve to a settled state on a later snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LockState {
    Locked,
    Unlocked,
    Locking,
    Unlocking,
}

impl LockState {
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }

    pub fn is_locking(self) -> bool {
        matches!(self, Self::Locking)
    }

    pub fn is_unlocking(self) -> bool {
        matches!(self, Self::Unlocking)
    }

    pub fn is_transitional(self) -> bool {
        matches!(self, Self::Locking | Self::Unlocking)
    }
}

// ── DoorPosition ────────────────────────────────────────────────────

/// Door position sensor reading. Only reported for doors wired to a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorPosition {
    Open,
    Closed,
}

// ── Door ────────────────────────────────────────────────────────────

/// One refresh cycle's immutable view of a door.
///
/// Created fresh on every coordinator refresh; a new snapshot replaces,
/// never mutates, its predecessor. Read-only to entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub name: String,
    pub full_name: Option<String>,
    pub floor_id: Option<String>,
    /// Whether the door is wired to an Access hub.
    pub bound_to_hub: bool,
    pub lock_state: LockState,
    pub position: Option<DoorPosition>,
}

impl Door {
    /// A door is available to the host exactly when its relay reports
    /// locked, mirroring how the controller exposes reachability.
    pub fn is_available(&self) -> bool {
        self.lock_state.is_locked()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn door_id_from_str() {
        let id: DoorId = "0a1b2c3d".parse().unwrap();
        assert_eq!(id.as_str(), "0a1b2c3d");
        assert_eq!(id.to_string(), "0a1b2c3d");
    }

    #[test]
    fn lock_state_flags() {
        assert!(LockState::Locked.is_locked());
        assert!(!LockState::Locked.is_transitional());
        assert!(LockState::Locking.is_locking());
        assert!(LockState::Locking.is_transitional());
        assert!(LockState::Unlocking.is_unlocking());
        assert!(!LockState::Unlocked.is_locked());
    }

    #[test]
    fn availability_follows_locked_state() {
        let door = Door {
            id: DoorId::new("door-1"),
            name: "Front Door".into(),
            full_name: None,
            floor_id: None,
            bound_to_hub: true,
            lock_state: LockState::Locked,
            position: None,
        };
        assert!(door.is_available());

        let unlocked = Door {
            lock_state: LockState::Unlocked,
            ..door
        };
        assert!(!unlocked.is_available());
    }
}
