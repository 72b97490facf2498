// accessly-core: Reactive door-state layer between accessly-api and consumers.

pub mod command;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;
pub mod platform;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandHandle, CommandResult};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use entity::{
    CoordinatorObserver, DeviceDescriptor, DoorLockEntity, LockControl, LockEntityState,
};
pub use error::CoreError;
pub use platform::LockPlatform;
pub use store::{DoorStore, DoorTable};
pub use stream::DoorStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{Door, DoorId, DoorPosition, LockState};
