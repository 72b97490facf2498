// ── Command API ──
//
// The write path to the physical device. Commands flow through an mpsc
// channel to the coordinator's processor task, so a slow device round
// trip never blocks snapshot notification delivery to other entities.

use tokio::sync::{mpsc, oneshot};

use crate::error::CoreError;
use crate::model::DoorId;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against the access controller.
#[derive(Debug, Clone)]
pub enum Command {
    /// Remotely unlock a door, optionally with a passcode.
    UnlockDoor {
        id: DoorId,
        passcode: Option<String>,
    },
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
}

/// Cheaply cloneable handle for submitting commands to the processor
/// task. Entities hold one of these instead of the whole coordinator:
/// they can issue commands but cannot refresh or shut anything down.
#[derive(Clone)]
pub struct CommandHandle {
    tx: mpsc::Sender<CommandEnvelope>,
}

impl CommandHandle {
    pub(crate) fn new(tx: mpsc::Sender<CommandEnvelope>) -> Self {
        Self { tx }
    }

    /// Submit a command and await its result.
    ///
    /// Errors from the device or transport propagate unchanged; a closed
    /// channel means the coordinator has been shut down.
    pub async fn submit(&self, command: Command) -> Result<CommandResult, CoreError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.tx
            .send(CommandEnvelope {
                command,
                response_tx,
            })
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?;

        response_rx
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?
    }
}
