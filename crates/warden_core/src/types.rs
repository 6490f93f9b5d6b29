//! Type definitions for `warden_core`.
//!
//! Identifiers, configuration snapshot, equipment model, platform events and
//! the small enums shared between the dispatcher and its components.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identifier of a connected entity, borrowed from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub name: String,
}

/// Ordered platform capability level. Resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Baseline,
    Intermediate,
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    EquipmentEffect,
    RosterHide,
    FreezeCountdown,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [
        TaskKind::EquipmentEffect,
        TaskKind::RosterHide,
        TaskKind::FreezeCountdown,
    ];
}

/// Registry key: at most one task per entity per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub entity: EntityId,
    pub kind: TaskKind,
}

impl TaskKey {
    pub fn new(entity: EntityId, kind: TaskKind) -> Self {
        Self { entity, kind }
    }
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:?}", self.entity, self.kind)
    }
}

// ---------------------------------------------------------------------------
// World positions and destinations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// True when both locations name the same block-precision point.
    pub fn same_position(&self, other: &Location) -> bool {
        const EPSILON: f64 = 1e-9;
        self.world == other.world
            && (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.z - other.z).abs() < EPSILON
    }
}

/// A named, world-qualified coordinate associated with an owner entity name.
/// Several destinations may share an owner; names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub owner: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeleportTiming {
    AtStart,
    #[default]
    AtEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationPolicy {
    #[default]
    First,
    Last,
    Random,
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

pub type Material = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentSlot {
    Helmet,
    Chestplate,
    Leggings,
    Boots,
}

impl EquipmentSlot {
    pub const ARMOR: [EquipmentSlot; 4] = [
        EquipmentSlot::Helmet,
        EquipmentSlot::Chestplate,
        EquipmentSlot::Leggings,
        EquipmentSlot::Boots,
    ];

    pub fn index(self) -> usize {
        match self {
            EquipmentSlot::Helmet => 0,
            EquipmentSlot::Chestplate => 1,
            EquipmentSlot::Leggings => 2,
            EquipmentSlot::Boots => 3,
        }
    }
}

/// What an entity is wearing at one instant, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    /// Indexed by `EquipmentSlot::index`.
    pub armor: [Option<Material>; 4],
    /// The off-hand slot.
    pub auxiliary: Option<Material>,
}

impl EquipmentSnapshot {
    pub fn slot(&self, slot: EquipmentSlot) -> Option<&str> {
        self.armor[slot.index()].as_deref()
    }

    pub fn with_slot(mut self, slot: EquipmentSlot, material: Option<Material>) -> Self {
        self.armor[slot.index()] = material;
        self
    }
}

/// Equipment predicate parameters. Derived from `Config` plus the active
/// Tier's canonical material list; replaced wholesale on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentRule {
    pub slots: SmallVec<[EquipmentSlot; 4]>,
    pub materials: Vec<Material>,
    pub include_auxiliary: bool,
    pub damage: f64,
    pub interval_ticks: u32,
}

// ---------------------------------------------------------------------------
// Configuration snapshot
// ---------------------------------------------------------------------------

fn default_damage() -> f64 {
    1.0
}
fn default_twenty() -> u32 {
    20
}
fn default_countdown_duration() -> u32 {
    100
}
fn default_one() -> u32 {
    1
}
fn default_chat_bypass() -> String {
    "warden.chat.bypass".to_string()
}
fn default_update_notify() -> String {
    "warden.update.notify".to_string()
}

/// Configuration consumed by the dispatcher. Persistence lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub chat_restricted: bool,
    #[serde(default)]
    pub roster_hidden: bool,
    #[serde(default)]
    pub equipment_effect_enabled: bool,
    #[serde(default)]
    pub countdown_enabled: bool,
    #[serde(default = "default_damage")]
    pub damage_amount: f64,
    #[serde(default = "default_twenty")]
    pub damage_interval_ticks: u32,
    #[serde(default = "default_countdown_duration")]
    pub countdown_duration_ticks: u32,
    #[serde(default = "default_one")]
    pub countdown_step_ticks: u32,
    #[serde(default)]
    pub teleport_timing: TeleportTiming,
    #[serde(default)]
    pub multi_destination_policy: DestinationPolicy,
    /// Empty means "all four armor slots".
    #[serde(default)]
    pub equipment_slots: Vec<EquipmentSlot>,
    /// Empty means "the Tier's canonical material list".
    #[serde(default)]
    pub equipment_materials: Vec<Material>,
    #[serde(default)]
    pub include_auxiliary: bool,
    #[serde(default = "default_twenty")]
    pub poll_interval_ticks: u32,
    #[serde(default = "default_twenty")]
    pub roster_refresh_ticks: u32,
    #[serde(default = "default_chat_bypass")]
    pub chat_bypass_permission: String,
    #[serde(default = "default_update_notify")]
    pub update_notify_permission: String,
    #[serde(default)]
    pub rng_seed: Option<u64>,
    #[serde(default)]
    pub release_check_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chat_restricted: false,
            roster_hidden: false,
            equipment_effect_enabled: false,
            countdown_enabled: false,
            damage_amount: default_damage(),
            damage_interval_ticks: default_twenty(),
            countdown_duration_ticks: default_countdown_duration(),
            countdown_step_ticks: default_one(),
            teleport_timing: TeleportTiming::default(),
            multi_destination_policy: DestinationPolicy::default(),
            equipment_slots: Vec::new(),
            equipment_materials: Vec::new(),
            include_auxiliary: false,
            poll_interval_ticks: default_twenty(),
            roster_refresh_ticks: default_twenty(),
            chat_bypass_permission: default_chat_bypass(),
            update_notify_permission: default_update_notify(),
            rng_seed: None,
            release_check_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Platform events and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyKind {
    Info,
    Warning,
    FeedbackTick,
}

/// Host event shapes. Which ones are delivered depends on the host's Tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlatformEvent {
    Join { entity: EntityRef },
    Quit { entity: EntityId },
    Move { entity: EntityId, from: Location, to: Location },
    Interact { entity: EntityId },
    DropItem { entity: EntityId },
    CommandIssued { entity: EntityId, command: String },
    Chat { entity: EntityId, message: String },
    /// Baseline hosts: an inventory click that may have changed armor.
    InventoryClick { entity: EntityId },
    /// Intermediate hosts: single armor slot delta.
    ArmorChange {
        entity: EntityId,
        slot: EquipmentSlot,
        material: Option<Material>,
    },
    /// Current hosts: equipment slot delta.
    EquipmentChange {
        entity: EntityId,
        slot: EquipmentSlot,
        material: Option<Material>,
    },
}

/// Discriminant of `PlatformEvent`, used by capability bundles to declare
/// their subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventShape {
    Join,
    Quit,
    Move,
    Interact,
    DropItem,
    CommandIssued,
    Chat,
    InventoryClick,
    ArmorChange,
    EquipmentChange,
}

impl PlatformEvent {
    pub fn shape(&self) -> EventShape {
        match self {
            PlatformEvent::Join { .. } => EventShape::Join,
            PlatformEvent::Quit { .. } => EventShape::Quit,
            PlatformEvent::Move { .. } => EventShape::Move,
            PlatformEvent::Interact { .. } => EventShape::Interact,
            PlatformEvent::DropItem { .. } => EventShape::DropItem,
            PlatformEvent::CommandIssued { .. } => EventShape::CommandIssued,
            PlatformEvent::Chat { .. } => EventShape::Chat,
            PlatformEvent::InventoryClick { .. } => EventShape::InventoryClick,
            PlatformEvent::ArmorChange { .. } => EventShape::ArmorChange,
            PlatformEvent::EquipmentChange { .. } => EventShape::EquipmentChange,
        }
    }

    pub fn entity(&self) -> EntityId {
        match self {
            PlatformEvent::Join { entity } => entity.id,
            PlatformEvent::Quit { entity }
            | PlatformEvent::Move { entity, .. }
            | PlatformEvent::Interact { entity }
            | PlatformEvent::DropItem { entity }
            | PlatformEvent::CommandIssued { entity, .. }
            | PlatformEvent::Chat { entity, .. }
            | PlatformEvent::InventoryClick { entity }
            | PlatformEvent::ArmorChange { entity, .. }
            | PlatformEvent::EquipmentChange { entity, .. } => *entity,
        }
    }
}

/// What the host must do with the event it delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Allow,
    Cancel,
    /// Let the event through but put the entity back at this location.
    ResetPosition(Location),
}

// ---------------------------------------------------------------------------
// Administrative commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AdminCommand {
    RequestCountdownTeleport {
        entity: EntityId,
        destination: Location,
    },
    CancelFreeze {
        entity: EntityId,
    },
    RefreshEquipmentTasks,
    ResolveAndTeleport {
        entity: EntityId,
        owner: String,
        #[serde(default)]
        policy: Option<DestinationPolicy>,
    },
    Reload {
        config: Box<Config>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Accepted,
    Rejected(crate::Rejection),
    Resolved(Destination),
    FreezeCancelled(bool),
    Refreshed { active: usize },
}
