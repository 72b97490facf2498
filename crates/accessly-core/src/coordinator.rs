// ── Coordinator abstraction ──
//
// Owns the polling cadence and the current door snapshot. Pulls door
// state from the injected AccessClient on a fixed interval, applies it
// to the DoorStore, and routes commands to the device off the
// notification path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use accessly_api::AccessClient;

use crate::command::{Command, CommandEnvelope, CommandHandle, CommandResult};
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::model::Door;
use crate::store::{DoorStore, DoorTable};
use crate::stream::DoorStream;

const COMMAND_CHANNEL_SIZE: usize = 64;

/// The polling coordinator.
///
/// Cheaply cloneable via `Arc`. The API client is injected at
/// construction; the coordinator never reaches into ambient state to
/// find it. Call [`first_refresh`](Self::first_refresh) before
/// [`start`](Self::start): setup must abort if the initial fetch fails.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: AccessClient,
    config: CoordinatorConfig,
    store: Arc<DoorStore>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a new Coordinator around an injected API client. Does NOT
    /// fetch anything -- call [`first_refresh`](Self::first_refresh) and
    /// then [`start`](Self::start).
    pub fn new(client: AccessClient, config: CoordinatorConfig) -> Self {
        let store = Arc::new(DoorStore::new());
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                config,
                store,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the underlying DoorStore.
    pub fn store(&self) -> &Arc<DoorStore> {
        &self.inner.store
    }

    /// Obtain a command handle for entities.
    pub fn command_handle(&self) -> CommandHandle {
        CommandHandle::new(self.inner.command_tx.clone())
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Perform the initial refresh.
    ///
    /// Failure here is fatal to setup: the caller must abort and surface
    /// the error rather than proceed with an empty snapshot.
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        self.refresh().await?;
        debug!(doors = self.inner.store.len(), "initial door fetch complete");
        Ok(())
    }

    /// Fetch all doors from the controller and replace the snapshot.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let responses = self.inner.client.list_doors().await?;
        let doors: Vec<Door> = responses.into_iter().map(Door::from).collect();

        self.inner.store.apply_snapshot(doors);
        debug!(doors = self.inner.store.len(), "door refresh complete");
        Ok(())
    }

    // ── Task lifecycle ───────────────────────────────────────────────

    /// Spawn the background tasks: periodic refresh (if configured) and
    /// the command processor.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let coordinator = self.clone();
            handles.push(tokio::spawn(command_processor_task(coordinator, rx)));
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(coordinator, interval_secs, cancel)));
        }
    }

    /// Cancel and join all background tasks.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the controller.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.command_handle().submit(cmd).await
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: first refresh, run closure, shut down.
    ///
    /// Optimized for CLI use: disables periodic refresh since only a
    /// single request-response cycle is needed.
    pub async fn oneshot<F, Fut, T>(
        client: AccessClient,
        config: CoordinatorConfig,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let coordinator = Coordinator::new(client, cfg);
        coordinator.first_refresh().await?;
        coordinator.start().await;
        let result = f(coordinator.clone()).await;
        coordinator.shutdown().await;
        result
    }

    // ── Snapshot / stream accessors (delegate to DoorStore) ──────────

    pub fn doors_snapshot(&self) -> Arc<DoorTable> {
        self.inner.store.snapshot()
    }

    pub fn doors(&self) -> DoorStream {
        self.inner.store.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically refresh door state from the controller.
async fn refresh_task(coordinator: Coordinator, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, routing each to the
/// appropriate API call. Running here, off the notification path, a
/// slow unlock round trip cannot stall snapshot delivery.
async fn command_processor_task(
    coordinator: Coordinator,
    mut rx: mpsc::Receiver<CommandEnvelope>,
) {
    let cancel = coordinator.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&coordinator, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────────

/// Route a command to the appropriate API call.
async fn route_command(
    coordinator: &Coordinator,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::UnlockDoor { id, passcode } => {
            // Resolve through the store first, so a stale id fails with
            // a domain error instead of a controller 404.
            if coordinator.inner.store.door(&id).is_none() {
                return Err(CoreError::DoorNotFound { id: id.to_string() });
            }

            coordinator
                .inner
                .client
                .remote_unlock(id.as_str(), passcode.as_deref())
                .await?;
            Ok(CommandResult::Ok)
        }
    }
}
