use crate::{EntityId, EntityRef, EquipmentSnapshot, Location, NotifyKind};

/// Everything the dispatcher needs from the embedding platform.
///
/// Implementations are called only from the tick thread.
pub trait Host {
    /// Entities currently connected, in the host's join order.
    fn online(&self) -> Vec<EntityRef>;

    fn position(&self, entity: EntityId) -> Option<Location>;

    fn equipment(&self, entity: EntityId) -> Option<EquipmentSnapshot>;

    fn has_permission(&self, entity: EntityId, permission: &str) -> bool;

    fn teleport(&mut self, entity: EntityId, to: &Location);

    fn damage(&mut self, entity: EntityId, amount: f64);

    /// Show or hide the entity's name in the shared roster.
    fn set_roster_hidden(&mut self, entity: EntityId, hidden: bool);

    fn notify(&mut self, entity: EntityId, message: &str, kind: NotifyKind);

    fn is_online(&self, entity: EntityId) -> bool {
        self.online().iter().any(|e| e.id == entity)
    }
}
