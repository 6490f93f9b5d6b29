//! Shared test fixtures for `warden_core` and downstream crates.
//!
//! `RecordingHost` is a `Host` that keeps world state in plain collections
//! and records every side effect the dispatcher asks for.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::{
    Config, EntityId, EntityRef, EquipmentSlot, EquipmentSnapshot, Host, Location, NotifyKind,
};

pub fn entity(n: u128) -> EntityId {
    EntityId(Uuid::from_u128(n))
}

pub fn entity_ref(n: u128, name: &str) -> EntityRef {
    EntityRef {
        id: entity(n),
        name: name.to_string(),
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Every feature on, short intervals, deterministic RNG.
pub fn base_config() -> Config {
    Config {
        chat_restricted: true,
        roster_hidden: true,
        equipment_effect_enabled: true,
        countdown_enabled: true,
        damage_amount: 2.0,
        damage_interval_ticks: 20,
        countdown_duration_ticks: 5,
        equipment_slots: vec![EquipmentSlot::Helmet, EquipmentSlot::Chestplate],
        equipment_materials: vec!["IRON_HELMET".to_string()],
        rng_seed: Some(42),
        ..Config::default()
    }
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub joined: Vec<EntityRef>,
    pub positions: HashMap<EntityId, Location>,
    pub equipment: HashMap<EntityId, EquipmentSnapshot>,
    pub permissions: HashMap<EntityId, HashSet<String>>,
    pub damage: Vec<(EntityId, f64)>,
    pub teleports: Vec<(EntityId, Location)>,
    pub roster_hidden: HashSet<EntityId>,
    pub roster_writes: usize,
    pub notifications: Vec<(EntityId, String, NotifyKind)>,
}

impl RecordingHost {
    pub fn join(&mut self, id: EntityId, name: &str, at: Location) {
        self.joined.push(EntityRef {
            id,
            name: name.to_string(),
        });
        self.positions.insert(id, at);
        self.equipment.entry(id).or_default();
    }

    pub fn leave(&mut self, id: EntityId) {
        self.joined.retain(|e| e.id != id);
        self.positions.remove(&id);
        self.equipment.remove(&id);
    }

    pub fn wear(&mut self, id: EntityId, slot: EquipmentSlot, material: Option<&str>) {
        let snapshot = self.equipment.entry(id).or_default();
        snapshot.armor[slot.index()] = material.map(str::to_string);
    }

    pub fn hold_auxiliary(&mut self, id: EntityId, material: Option<&str>) {
        self.equipment.entry(id).or_default().auxiliary = material.map(str::to_string);
    }

    pub fn grant(&mut self, id: EntityId, permission: &str) {
        self.permissions
            .entry(id)
            .or_default()
            .insert(permission.to_string());
    }

    pub fn damage_count(&self, id: EntityId) -> usize {
        self.damage.iter().filter(|(e, _)| *e == id).count()
    }

    pub fn messages_of(&self, id: EntityId, kind: NotifyKind) -> Vec<&str> {
        self.notifications
            .iter()
            .filter(|(e, _, k)| *e == id && *k == kind)
            .map(|(_, message, _)| message.as_str())
            .collect()
    }

    /// Remaining counts carried by feedback-tick notifications, in order.
    pub fn feedback_counts(&self, id: EntityId) -> Vec<u32> {
        self.messages_of(id, NotifyKind::FeedbackTick)
            .iter()
            .filter_map(|message| {
                message
                    .split_whitespace()
                    .find_map(|word| word.trim_end_matches('.').parse().ok())
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn online(&self) -> Vec<EntityRef> {
        self.joined.clone()
    }

    fn position(&self, entity: EntityId) -> Option<Location> {
        self.positions.get(&entity).cloned()
    }

    fn equipment(&self, entity: EntityId) -> Option<EquipmentSnapshot> {
        self.equipment.get(&entity).cloned()
    }

    fn has_permission(&self, entity: EntityId, permission: &str) -> bool {
        self.permissions
            .get(&entity)
            .is_some_and(|granted| granted.contains(permission))
    }

    fn teleport(&mut self, entity: EntityId, to: &Location) {
        self.positions.insert(entity, to.clone());
        self.teleports.push((entity, to.clone()));
    }

    fn damage(&mut self, entity: EntityId, amount: f64) {
        self.damage.push((entity, amount));
    }

    fn set_roster_hidden(&mut self, entity: EntityId, hidden: bool) {
        self.roster_writes += 1;
        if hidden {
            self.roster_hidden.insert(entity);
        } else {
            self.roster_hidden.remove(&entity);
        }
    }

    fn notify(&mut self, entity: EntityId, message: &str, kind: NotifyKind) {
        self.notifications.push((entity, message.to_string(), kind));
    }
}
