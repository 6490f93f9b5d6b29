//! An in-memory `Host`: the world state a real platform would own, kept in
//! plain collections so sessions can run without one.

use ahash::AHashSet;
use indexmap::IndexMap;
use serde::Serialize;
use warden_core::{
    EntityId, EntityRef, EquipmentSlot, EquipmentSnapshot, Host, Location, Material, NotifyKind,
};

pub const FULL_HEALTH: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub name: String,
    pub position: Location,
    pub equipment: EquipmentSnapshot,
    pub permissions: AHashSet<String>,
    pub health: f64,
    pub damage_taken: f64,
    pub hits: u32,
    pub roster_hidden: bool,
    pub teleports: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub entity: EntityId,
    pub message: String,
    pub kind: NotifyKind,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    online: IndexMap<EntityId, EntityRecord>,
    /// Entities that left, kept so a summary can still report them.
    departed: IndexMap<EntityId, EntityRecord>,
    notifications: Vec<Notification>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, entity: &EntityRef, at: Location, permissions: &[String]) {
        // Rejoining keeps health and counters from the earlier visit.
        let mut record = self
            .departed
            .shift_remove(&entity.id)
            .unwrap_or_else(|| EntityRecord {
                name: entity.name.clone(),
                position: at.clone(),
                equipment: EquipmentSnapshot::default(),
                permissions: AHashSet::new(),
                health: FULL_HEALTH,
                damage_taken: 0.0,
                hits: 0,
                roster_hidden: false,
                teleports: 0,
            });
        record.position = at;
        record.permissions.extend(permissions.iter().cloned());
        self.online.insert(entity.id, record);
    }

    pub fn disconnect(&mut self, entity: EntityId) -> bool {
        match self.online.shift_remove(&entity) {
            Some(record) => {
                self.departed.insert(entity, record);
                true
            }
            None => false,
        }
    }

    pub fn set_slot(&mut self, entity: EntityId, slot: EquipmentSlot, material: Option<Material>) {
        if let Some(record) = self.online.get_mut(&entity) {
            record.equipment.armor[slot.index()] = material;
        }
    }

    pub fn set_auxiliary(&mut self, entity: EntityId, material: Option<Material>) {
        if let Some(record) = self.online.get_mut(&entity) {
            record.equipment.auxiliary = material;
        }
    }

    /// Move the entity without telling anyone; the caller decides whether
    /// the move was allowed.
    pub fn place(&mut self, entity: EntityId, at: Location) {
        if let Some(record) = self.online.get_mut(&entity) {
            record.position = at;
        }
    }

    pub fn record(&self, entity: EntityId) -> Option<&EntityRecord> {
        self.online
            .get(&entity)
            .or_else(|| self.departed.get(&entity))
    }

    /// Every entity ever connected: online ones first, in join order.
    pub fn records(&self) -> impl Iterator<Item = (&EntityId, &EntityRecord)> {
        self.online.iter().chain(self.departed.iter())
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn count_notifications(&self, kind: NotifyKind) -> usize {
        self.notifications.iter().filter(|n| n.kind == kind).count()
    }
}

impl Host for MemoryHost {
    fn online(&self) -> Vec<EntityRef> {
        self.online
            .iter()
            .map(|(id, record)| EntityRef {
                id: *id,
                name: record.name.clone(),
            })
            .collect()
    }

    fn position(&self, entity: EntityId) -> Option<Location> {
        self.online.get(&entity).map(|r| r.position.clone())
    }

    fn equipment(&self, entity: EntityId) -> Option<EquipmentSnapshot> {
        self.online.get(&entity).map(|r| r.equipment.clone())
    }

    fn has_permission(&self, entity: EntityId, permission: &str) -> bool {
        self.online
            .get(&entity)
            .is_some_and(|r| r.permissions.contains(permission))
    }

    fn teleport(&mut self, entity: EntityId, to: &Location) {
        if let Some(record) = self.online.get_mut(&entity) {
            record.position = to.clone();
            record.teleports += 1;
        }
    }

    fn damage(&mut self, entity: EntityId, amount: f64) {
        if let Some(record) = self.online.get_mut(&entity) {
            record.health = (record.health - amount).max(0.0);
            record.damage_taken += amount;
            record.hits += 1;
        }
    }

    fn set_roster_hidden(&mut self, entity: EntityId, hidden: bool) {
        if let Some(record) = self.online.get_mut(&entity) {
            record.roster_hidden = hidden;
        }
    }

    fn notify(&mut self, entity: EntityId, message: &str, kind: NotifyKind) {
        tracing::debug!(%entity, ?kind, message, "notification");
        self.notifications.push(Notification {
            entity,
            message: message.to_string(),
            kind,
        });
    }

    fn is_online(&self, entity: EntityId) -> bool {
        self.online.contains_key(&entity)
    }
}
