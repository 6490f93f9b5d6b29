use super::*;
use crate::test_fixtures::{base_config, entity, entity_ref, RecordingHost};

mod chat;
mod dispatch;
mod roster;

// --- Shared test helpers ------------------------------------------------

const BASELINE: &str = "1.8.8";
const INTERMEDIATE: &str = "1.16.5-R0.1-SNAPSHOT";
const CURRENT: &str = "1.20.4";

fn spawn() -> Location {
    Location::new("world", 0.5, 64.0, 0.5)
}

fn nether() -> Location {
    Location::new("world_nether", 8.0, 72.0, -16.0)
}

fn dispatcher(version: &str, config: Config) -> Dispatcher<RecordingHost> {
    Dispatcher::initialize(
        version,
        config,
        RecordingHost::default(),
        DestinationStore::new(),
    )
    .unwrap()
}

/// Connect an entity at spawn and deliver its Join event.
fn join(d: &mut Dispatcher<RecordingHost>, n: u128, name: &str) -> EntityId {
    let who = entity_ref(n, name);
    d.host_mut().join(who.id, name, spawn());
    let outcome = d.handle_event(&PlatformEvent::Join { entity: who.clone() });
    assert_eq!(outcome, EventOutcome::Allow);
    who.id
}

fn quit(d: &mut Dispatcher<RecordingHost>, id: EntityId) {
    d.host_mut().leave(id);
    d.handle_event(&PlatformEvent::Quit { entity: id });
}

fn run_ticks(d: &mut Dispatcher<RecordingHost>, n: usize) -> Vec<TaskFault> {
    let mut faults = Vec::new();
    for _ in 0..n {
        faults.extend(d.tick());
    }
    faults
}

/// Deliver a move the way a host would: apply it unless told otherwise.
fn attempt_move(d: &mut Dispatcher<RecordingHost>, id: EntityId, to: Location) -> EventOutcome {
    let from = d.host().position(id).unwrap();
    let outcome = d.handle_event(&PlatformEvent::Move {
        entity: id,
        from,
        to: to.clone(),
    });
    match &outcome {
        EventOutcome::Allow => {
            d.host_mut().positions.insert(id, to);
        }
        EventOutcome::ResetPosition(back) => {
            d.host_mut().positions.insert(id, back.clone());
        }
        EventOutcome::Cancel => {}
    }
    outcome
}

fn equipment_config() -> Config {
    Config {
        roster_hidden: false,
        chat_restricted: false,
        countdown_enabled: false,
        ..base_config()
    }
}

fn countdown_config(timing: TeleportTiming) -> Config {
    Config {
        roster_hidden: false,
        chat_restricted: false,
        equipment_effect_enabled: false,
        teleport_timing: timing,
        countdown_duration_ticks: 5,
        ..base_config()
    }
}
