//! Capability bundles: which host event shapes each Tier listens to, and how
//! it expresses equipment tracking and movement suppression.

use smallvec::SmallVec;

use crate::condition::canonical_materials;
use crate::freeze::MovementSuppression;
use crate::{Config, DispatchError, EventShape, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentSignal {
    Disabled,
    /// Host delivers slot deltas; no polling.
    EventDriven,
    /// Re-evaluate every online entity on a fixed cadence.
    Polling,
    /// Slot deltas plus polling for what the events cannot see.
    Hybrid,
}

impl EquipmentSignal {
    pub fn polls(self) -> bool {
        matches!(self, EquipmentSignal::Polling | EquipmentSignal::Hybrid)
    }

    pub fn listens(self) -> bool {
        matches!(self, EquipmentSignal::EventDriven | EquipmentSignal::Hybrid)
    }
}

struct BundleDef {
    tier: Tier,
    native_signal: EquipmentSignal,
    equipment_shape: EventShape,
    movement: MovementSuppression,
}

const COMMON_SHAPES: [EventShape; 7] = [
    EventShape::Join,
    EventShape::Quit,
    EventShape::Move,
    EventShape::Interact,
    EventShape::DropItem,
    EventShape::CommandIssued,
    EventShape::Chat,
];

const BUNDLES: &[BundleDef] = &[
    BundleDef {
        tier: Tier::Baseline,
        native_signal: EquipmentSignal::Polling,
        equipment_shape: EventShape::InventoryClick,
        movement: MovementSuppression::ResetPosition,
    },
    BundleDef {
        tier: Tier::Intermediate,
        native_signal: EquipmentSignal::EventDriven,
        equipment_shape: EventShape::ArmorChange,
        movement: MovementSuppression::ResetPosition,
    },
    BundleDef {
        tier: Tier::Current,
        native_signal: EquipmentSignal::EventDriven,
        equipment_shape: EventShape::EquipmentChange,
        movement: MovementSuppression::Cancel,
    },
];

/// The immutable adapter chosen once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityBundle {
    pub tier: Tier,
    pub equipment: EquipmentSignal,
    pub movement: MovementSuppression,
    pub subscriptions: SmallVec<[EventShape; 8]>,
    pub materials: &'static [&'static str],
}

impl CapabilityBundle {
    /// Pick the bundle for `tier`. `include-auxiliary` forces polling on
    /// every Tier since no host event reports the off-hand slot.
    pub fn select(tier: Tier, config: &Config) -> Result<Self, DispatchError> {
        let def = BUNDLES
            .iter()
            .find(|def| def.tier == tier)
            .ok_or(DispatchError::NoBundle(tier))?;

        let equipment = if !config.equipment_effect_enabled {
            EquipmentSignal::Disabled
        } else if config.include_auxiliary && def.native_signal.listens() {
            EquipmentSignal::Hybrid
        } else {
            def.native_signal
        };

        let mut subscriptions: SmallVec<[EventShape; 8]> = SmallVec::from_slice(&COMMON_SHAPES);
        if equipment != EquipmentSignal::Disabled {
            subscriptions.push(def.equipment_shape);
        }

        Ok(Self {
            tier,
            equipment,
            movement: def.movement,
            subscriptions,
            materials: canonical_materials(tier),
        })
    }

    pub fn subscribes(&self, shape: EventShape) -> bool {
        self.subscriptions.contains(&shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment_on() -> Config {
        Config {
            equipment_effect_enabled: true,
            ..Config::default()
        }
    }

    #[test]
    fn test_each_tier_has_a_bundle() {
        for tier in [Tier::Baseline, Tier::Intermediate, Tier::Current] {
            let bundle = CapabilityBundle::select(tier, &equipment_on()).unwrap();
            assert_eq!(bundle.tier, tier);
            for shape in COMMON_SHAPES {
                assert!(bundle.subscribes(shape), "{tier:?} misses {shape:?}");
            }
        }
    }

    #[test]
    fn test_equipment_shapes_differ_per_tier() {
        let config = equipment_on();
        let baseline = CapabilityBundle::select(Tier::Baseline, &config).unwrap();
        let intermediate = CapabilityBundle::select(Tier::Intermediate, &config).unwrap();
        let current = CapabilityBundle::select(Tier::Current, &config).unwrap();

        assert_eq!(baseline.equipment, EquipmentSignal::Polling);
        assert!(baseline.subscribes(EventShape::InventoryClick));
        assert!(!baseline.subscribes(EventShape::ArmorChange));

        assert_eq!(intermediate.equipment, EquipmentSignal::EventDriven);
        assert!(intermediate.subscribes(EventShape::ArmorChange));
        assert!(!intermediate.subscribes(EventShape::EquipmentChange));

        assert!(current.subscribes(EventShape::EquipmentChange));
        assert_eq!(current.movement, MovementSuppression::Cancel);
        assert_eq!(baseline.movement, MovementSuppression::ResetPosition);
    }

    #[test]
    fn test_auxiliary_forces_polling_everywhere() {
        let config = Config {
            include_auxiliary: true,
            ..equipment_on()
        };
        for tier in [Tier::Baseline, Tier::Intermediate, Tier::Current] {
            let bundle = CapabilityBundle::select(tier, &config).unwrap();
            assert!(bundle.equipment.polls(), "{tier:?} must poll");
        }
    }

    #[test]
    fn test_disabled_effect_subscribes_to_no_equipment_shape() {
        let bundle = CapabilityBundle::select(Tier::Current, &Config::default()).unwrap();
        assert_eq!(bundle.equipment, EquipmentSignal::Disabled);
        assert_eq!(bundle.subscriptions.len(), COMMON_SHAPES.len());
    }
}
