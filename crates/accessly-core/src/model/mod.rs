// ── Domain model ──

mod door;

pub use door::{Door, DoorId, DoorPosition, LockState};
