// ── Platform setup / wiring ──
//
// One-call assembly of the lock platform: first refresh, entity
// construction, observer task spawn, coordinator start. The host hands
// in a ready-made API client; nothing here consults ambient state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use accessly_api::AccessClient;

use crate::config::CoordinatorConfig;
use crate::coordinator::Coordinator;
use crate::entity::{CoordinatorObserver, DoorLockEntity};
use crate::error::CoreError;
use crate::model::DoorId;
use crate::stream::DoorStream;

/// The assembled lock platform: one coordinator plus one registered
/// entity per door found at setup time.
///
/// Doors added to the controller after setup are not picked up without
/// re-running [`setup`](Self::setup); doors removed after setup keep
/// their entity, which reports unavailable.
pub struct LockPlatform {
    coordinator: Coordinator,
    entities: Vec<Arc<DoorLockEntity>>,
    cancel: CancellationToken,
    observer_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for LockPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockPlatform")
            .field("entities", &self.entities.len())
            .finish_non_exhaustive()
    }
}

impl LockPlatform {
    /// Assemble the platform.
    ///
    /// Performs one first refresh -- failure aborts setup with zero
    /// entities registered and no background tasks left running -- then
    /// builds one entity per door in snapshot order, spawns its observer
    /// task, and starts the coordinator's polling and command tasks.
    pub async fn setup(
        client: AccessClient,
        config: CoordinatorConfig,
    ) -> Result<Self, CoreError> {
        let coordinator = Coordinator::new(client, config);
        coordinator.first_refresh().await?;

        let store = Arc::clone(coordinator.store());
        let commands = coordinator.command_handle();

        let entities: Vec<Arc<DoorLockEntity>> = store
            .snapshot()
            .values()
            .map(|door| {
                Arc::new(DoorLockEntity::new(
                    Arc::clone(&store),
                    commands.clone(),
                    door,
                ))
            })
            .collect();

        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(entities.len());
        for entity in &entities {
            handles.push(tokio::spawn(entity_observer_task(
                Arc::clone(entity),
                store.subscribe(),
                cancel.clone(),
            )));
        }

        coordinator.start().await;
        info!(doors = entities.len(), "lock platform ready");

        Ok(Self {
            coordinator,
            entities,
            cancel,
            observer_handles: Mutex::new(handles),
        })
    }

    /// All registered lock entities, in snapshot order.
    pub fn entities(&self) -> &[Arc<DoorLockEntity>] {
        &self.entities
    }

    /// Look up an entity by door id.
    pub fn entity(&self, id: &DoorId) -> Option<&Arc<DoorLockEntity>> {
        self.entities.iter().find(|e| e.unique_id() == id)
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Tear the platform down: stop observer tasks, then the
    /// coordinator. An in-flight unlock completes or fails on its own;
    /// no cancellation is propagated into it.
    pub async fn teardown(&self) {
        self.cancel.cancel();

        let mut handles = self.observer_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.coordinator.shutdown().await;
        debug!("lock platform torn down");
    }
}

/// Forward every snapshot replacement to the entity's update handler.
async fn entity_observer_task(
    entity: Arc<DoorLockEntity>,
    mut doors: DoorStream,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = doors.changed() => {
                if changed.is_none() {
                    break; // store dropped
                }
                entity.handle_coordinator_update();
            }
        }
    }
}
