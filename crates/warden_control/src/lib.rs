//! Input sources that drive a `Dispatcher` the way a host platform would.

mod memory_host;

pub use memory_host::{EntityRecord, MemoryHost, Notification, FULL_HEALTH};

use serde::Deserialize;
use warden_core::{
    AdminCommand, CommandOutcome, Dispatcher, EntityId, EntityRef, EquipmentSlot, EventOutcome,
    Host, Location, Material, PlatformEvent, TaskFault, Tier,
};

/// Produces the inputs due at a given tick.
pub trait EventSource {
    fn inputs_for(&mut self, tick: u64) -> Vec<Input>;

    /// True once no further input will ever be produced.
    fn is_exhausted(&self) -> bool;
}

/// Something that happens on the host side. Host-state changes are turned
/// into the event shape the active Tier would deliver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Input {
    Connect {
        entity: EntityRef,
        at: Location,
        #[serde(default)]
        permissions: Vec<String>,
    },
    Disconnect {
        entity: EntityId,
    },
    Wear {
        entity: EntityId,
        slot: EquipmentSlot,
        #[serde(default)]
        material: Option<Material>,
    },
    /// Off-hand changes raise no event on any Tier; only polling sees them.
    Hold {
        entity: EntityId,
        #[serde(default)]
        material: Option<Material>,
    },
    Walk {
        entity: EntityId,
        to: Location,
    },
    Interact {
        entity: EntityId,
    },
    Drop {
        entity: EntityId,
    },
    Chat {
        entity: EntityId,
        message: String,
    },
    Command {
        entity: EntityId,
        command: String,
    },
    Admin {
        command: AdminCommand,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Event(EventOutcome),
    Command(CommandOutcome),
    /// Host state changed but the Tier raises no event for it.
    Silent,
}

// ---------------------------------------------------------------------------
// Scripted sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScriptedStep {
    pub at_tick: u64,
    pub input: Input,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    steps: Vec<ScriptedStep>,
}

/// Replays a fixed list of inputs, each at its tick. Steps sharing a tick
/// keep their file order.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    steps: Vec<ScriptedStep>,
    cursor: usize,
}

impl ScriptedSession {
    pub fn new(mut steps: Vec<ScriptedStep>) -> Self {
        steps.sort_by_key(|step| step.at_tick);
        Self { steps, cursor: 0 }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let file: ScenarioFile = serde_json::from_str(json)?;
        Ok(Self::new(file.steps))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Tick of the last scripted step, if any.
    pub fn last_tick(&self) -> Option<u64> {
        self.steps.last().map(|step| step.at_tick)
    }
}

impl EventSource for ScriptedSession {
    fn inputs_for(&mut self, tick: u64) -> Vec<Input> {
        let mut due = Vec::new();
        while let Some(step) = self.steps.get(self.cursor) {
            if step.at_tick > tick {
                break;
            }
            // Steps scheduled for a tick that already passed still run, late.
            due.push(step.input.clone());
            self.cursor += 1;
        }
        due
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Apply one input to the host and hand the resulting event to the
/// dispatcher, then apply the dispatcher's verdict back to the host.
pub fn deliver(dispatcher: &mut Dispatcher<MemoryHost>, input: Input) -> Delivery {
    match input {
        Input::Connect {
            entity,
            at,
            permissions,
        } => {
            dispatcher.host_mut().connect(&entity, at, &permissions);
            Delivery::Event(dispatcher.handle_event(&PlatformEvent::Join { entity }))
        }
        Input::Disconnect { entity } => {
            dispatcher.host_mut().disconnect(entity);
            Delivery::Event(dispatcher.handle_event(&PlatformEvent::Quit { entity }))
        }
        Input::Wear {
            entity,
            slot,
            material,
        } => wear(dispatcher, entity, slot, material),
        Input::Hold { entity, material } => {
            dispatcher.host_mut().set_auxiliary(entity, material);
            Delivery::Silent
        }
        Input::Walk { entity, to } => walk(dispatcher, entity, to),
        Input::Interact { entity } => {
            Delivery::Event(dispatcher.handle_event(&PlatformEvent::Interact { entity }))
        }
        Input::Drop { entity } => {
            Delivery::Event(dispatcher.handle_event(&PlatformEvent::DropItem { entity }))
        }
        Input::Chat { entity, message } => {
            Delivery::Event(dispatcher.handle_event(&PlatformEvent::Chat { entity, message }))
        }
        Input::Command { entity, command } => Delivery::Event(
            dispatcher.handle_event(&PlatformEvent::CommandIssued { entity, command }),
        ),
        Input::Admin { command } => Delivery::Command(dispatcher.apply(command)),
    }
}

fn wear(
    dispatcher: &mut Dispatcher<MemoryHost>,
    entity: EntityId,
    slot: EquipmentSlot,
    material: Option<Material>,
) -> Delivery {
    dispatcher
        .host_mut()
        .set_slot(entity, slot, material.clone());
    let event = match dispatcher.tier() {
        Tier::Baseline => PlatformEvent::InventoryClick { entity },
        Tier::Intermediate => PlatformEvent::ArmorChange {
            entity,
            slot,
            material,
        },
        Tier::Current => PlatformEvent::EquipmentChange {
            entity,
            slot,
            material,
        },
    };
    Delivery::Event(dispatcher.handle_event(&event))
}

fn walk(dispatcher: &mut Dispatcher<MemoryHost>, entity: EntityId, to: Location) -> Delivery {
    let Some(from) = dispatcher.host().position(entity) else {
        return Delivery::Silent;
    };
    let outcome = dispatcher.handle_event(&PlatformEvent::Move {
        entity,
        from,
        to: to.clone(),
    });
    match &outcome {
        EventOutcome::Allow => dispatcher.host_mut().place(entity, to),
        EventOutcome::ResetPosition(back) => dispatcher.host_mut().place(entity, back.clone()),
        EventOutcome::Cancel => {}
    }
    Delivery::Event(outcome)
}

/// What happened during one `run_tick`.
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub delivered: usize,
    pub cancelled: usize,
    pub rejected: usize,
    pub faults: Vec<TaskFault>,
}

/// Deliver everything `source` has for the current tick, then advance the
/// dispatcher by one tick.
pub fn run_tick<S: EventSource + ?Sized>(
    dispatcher: &mut Dispatcher<MemoryHost>,
    source: &mut S,
) -> TickReport {
    let tick = dispatcher.current_tick();
    let mut report = TickReport {
        tick,
        ..TickReport::default()
    };
    for input in source.inputs_for(tick) {
        report.delivered += 1;
        match deliver(dispatcher, input) {
            Delivery::Event(EventOutcome::Cancel | EventOutcome::ResetPosition(_)) => {
                report.cancelled += 1;
            }
            Delivery::Command(CommandOutcome::Rejected(rejection)) => {
                tracing::warn!(tick, %rejection, "scripted admin command rejected");
                report.rejected += 1;
            }
            Delivery::Event(EventOutcome::Allow) | Delivery::Command(_) | Delivery::Silent => {}
        }
    }
    report.faults = dispatcher.tick();
    report
}
