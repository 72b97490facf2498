//! Door command handlers.

use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::Tabled;

use accessly_api::AccessClient;
use accessly_core::{
    Command as CoreCommand, Coordinator, CoordinatorConfig, CoreError, Door, DoorId,
    DoorPosition, DoorTable, LockPlatform, LockState,
};

use crate::cli::{DoorsArgs, DoorsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DoorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Floor")]
    floor: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl From<&Arc<Door>> for DoorRow {
    fn from(d: &Arc<Door>) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            floor: d.floor_id.clone().unwrap_or_default(),
            state: state_label(d.lock_state).into(),
            position: position_label(d.position).into(),
            available: if d.is_available() { "yes" } else { "no" }.into(),
        }
    }
}

fn state_label(state: LockState) -> &'static str {
    match state {
        LockState::Locked => "locked",
        LockState::Unlocked => "unlocked",
        LockState::Locking => "locking",
        LockState::Unlocking => "unlocking",
        _ => "unknown",
    }
}

fn position_label(position: Option<DoorPosition>) -> &'static str {
    match position {
        Some(DoorPosition::Open) => "open",
        Some(DoorPosition::Closed) => "closed",
        None => "-",
    }
}

fn detail(d: &Arc<Door>) -> String {
    [
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.name),
        format!("Full name: {}", d.full_name.as_deref().unwrap_or("-")),
        format!("Floor:     {}", d.floor_id.as_deref().unwrap_or("-")),
        format!("State:     {}", state_label(d.lock_state)),
        format!("Position:  {}", position_label(d.position)),
        format!("Hub wired: {}", if d.bound_to_hub { "yes" } else { "no" }),
        format!("Available: {}", if d.is_available() { "yes" } else { "no" }),
    ]
    .join("\n")
}

// ── Door resolution ─────────────────────────────────────────────────

/// Resolve a door by id, falling back to exact name match.
fn resolve_door(table: &DoorTable, ident: &str) -> Result<Arc<Door>, CoreError> {
    if let Some(door) = table.get(&DoorId::new(ident)) {
        return Ok(Arc::clone(door));
    }
    table
        .values()
        .find(|d| d.name == ident)
        .map(Arc::clone)
        .ok_or_else(|| CoreError::DoorNotFound { id: ident.into() })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: AccessClient,
    args: DoorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DoorsCommand::List => {
            let snapshot = Coordinator::oneshot(
                client,
                CoordinatorConfig::default(),
                |c| async move { Ok(c.doors_snapshot()) },
            )
            .await?;

            let doors: Vec<Arc<Door>> = snapshot.values().map(Arc::clone).collect();
            let rendered = output::render_list(
                &global.output,
                &doors,
                |d| DoorRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        DoorsCommand::Get { door } => {
            let snapshot = Coordinator::oneshot(
                client,
                CoordinatorConfig::default(),
                |c| async move { Ok(c.doors_snapshot()) },
            )
            .await?;

            let found = resolve_door(&snapshot, &door)?;
            let rendered =
                output::render_single(&global.output, &found, |d| detail(d), |d| d.id.to_string());
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        DoorsCommand::Unlock { door, passcode } => {
            let name = Coordinator::oneshot(
                client,
                CoordinatorConfig::default(),
                move |c| async move {
                    let found = resolve_door(&c.doors_snapshot(), &door)?;
                    c.execute(CoreCommand::UnlockDoor {
                        id: found.id.clone(),
                        passcode,
                    })
                    .await?;
                    Ok(found.name.clone())
                },
            )
            .await?;

            output::print_output(&format!("Unlock sent to {name}"), global.quiet);
            Ok(())
        }

        DoorsCommand::Watch { interval } => watch(client, interval, global).await,
    }
}

// ── Watch loop ──────────────────────────────────────────────────────

/// Stream door state changes until Ctrl-C.
async fn watch(client: AccessClient, interval: u64, global: &GlobalOpts) -> Result<(), CliError> {
    let platform = LockPlatform::setup(
        client,
        CoordinatorConfig {
            refresh_interval_secs: interval.max(1),
        },
    )
    .await?;

    let color = output::should_color(&global.color);
    let mut doors = platform.coordinator().doors();

    // Initial state so the stream starts from something visible.
    let mut previous = doors.latest();
    for door in previous.values() {
        print_door_line(door, color, global.quiet);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = doors.changed() => {
                let Some(current) = changed else { break };
                for door in current.values() {
                    let unchanged = previous
                        .get(&door.id)
                        .is_some_and(|old| old.lock_state == door.lock_state
                            && old.position == door.position);
                    if !unchanged {
                        print_door_line(door, color, global.quiet);
                    }
                }
                previous = current;
            }
        }
    }

    platform.teardown().await;
    Ok(())
}

fn print_door_line(door: &Arc<Door>, color: bool, quiet: bool) {
    let timestamp = chrono::Utc::now().format("%H:%M:%S");
    let label = state_label(door.lock_state);
    let state = if color {
        match door.lock_state {
            LockState::Locked => label.green().to_string(),
            LockState::Unlocked => label.red().to_string(),
            _ => label.yellow().to_string(),
        }
    } else {
        label.to_string()
    };
    output::print_output(
        &format!("{timestamp}  {:<24} {state}", door.name),
        quiet,
    );
}
