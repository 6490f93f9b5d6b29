//! Equipment eligibility predicate and rule derivation.

use smallvec::SmallVec;

use crate::{Config, EquipmentRule, EquipmentSlot, EquipmentSnapshot, Tier};

const BASELINE_MATERIALS: &[&str] = &[
    "LEATHER_HELMET",
    "LEATHER_CHESTPLATE",
    "LEATHER_LEGGINGS",
    "LEATHER_BOOTS",
    "CHAINMAIL_HELMET",
    "CHAINMAIL_CHESTPLATE",
    "CHAINMAIL_LEGGINGS",
    "CHAINMAIL_BOOTS",
    "IRON_HELMET",
    "IRON_CHESTPLATE",
    "IRON_LEGGINGS",
    "IRON_BOOTS",
    "GOLD_HELMET",
    "GOLD_CHESTPLATE",
    "GOLD_LEGGINGS",
    "GOLD_BOOTS",
    "DIAMOND_HELMET",
    "DIAMOND_CHESTPLATE",
    "DIAMOND_LEGGINGS",
    "DIAMOND_BOOTS",
];

const INTERMEDIATE_MATERIALS: &[&str] = &[
    "LEATHER_HELMET",
    "LEATHER_CHESTPLATE",
    "LEATHER_LEGGINGS",
    "LEATHER_BOOTS",
    "CHAINMAIL_HELMET",
    "CHAINMAIL_CHESTPLATE",
    "CHAINMAIL_LEGGINGS",
    "CHAINMAIL_BOOTS",
    "IRON_HELMET",
    "IRON_CHESTPLATE",
    "IRON_LEGGINGS",
    "IRON_BOOTS",
    "GOLDEN_HELMET",
    "GOLDEN_CHESTPLATE",
    "GOLDEN_LEGGINGS",
    "GOLDEN_BOOTS",
    "DIAMOND_HELMET",
    "DIAMOND_CHESTPLATE",
    "DIAMOND_LEGGINGS",
    "DIAMOND_BOOTS",
    "TURTLE_HELMET",
];

const CURRENT_MATERIALS: &[&str] = &[
    "LEATHER_HELMET",
    "LEATHER_CHESTPLATE",
    "LEATHER_LEGGINGS",
    "LEATHER_BOOTS",
    "CHAINMAIL_HELMET",
    "CHAINMAIL_CHESTPLATE",
    "CHAINMAIL_LEGGINGS",
    "CHAINMAIL_BOOTS",
    "IRON_HELMET",
    "IRON_CHESTPLATE",
    "IRON_LEGGINGS",
    "IRON_BOOTS",
    "GOLDEN_HELMET",
    "GOLDEN_CHESTPLATE",
    "GOLDEN_LEGGINGS",
    "GOLDEN_BOOTS",
    "DIAMOND_HELMET",
    "DIAMOND_CHESTPLATE",
    "DIAMOND_LEGGINGS",
    "DIAMOND_BOOTS",
    "TURTLE_HELMET",
    "NETHERITE_HELMET",
    "NETHERITE_CHESTPLATE",
    "NETHERITE_LEGGINGS",
    "NETHERITE_BOOTS",
];

/// The full canonical armor material list for a Tier.
pub fn canonical_materials(tier: Tier) -> &'static [&'static str] {
    match tier {
        Tier::Baseline => BASELINE_MATERIALS,
        Tier::Intermediate => INTERMEDIATE_MATERIALS,
        Tier::Current => CURRENT_MATERIALS,
    }
}

/// Build the rule snapshot for `tier`, substituting defaults for empty sets.
pub fn derive_rule(config: &Config, tier: Tier) -> EquipmentRule {
    let slots: SmallVec<[EquipmentSlot; 4]> = if config.equipment_slots.is_empty() {
        SmallVec::from_slice(&EquipmentSlot::ARMOR)
    } else {
        let mut slots: SmallVec<[EquipmentSlot; 4]> = SmallVec::new();
        for slot in &config.equipment_slots {
            if !slots.contains(slot) {
                slots.push(*slot);
            }
        }
        slots
    };

    let materials = if config.equipment_materials.is_empty() {
        canonical_materials(tier)
            .iter()
            .map(|m| (*m).to_string())
            .collect()
    } else {
        config
            .equipment_materials
            .iter()
            .map(|m| m.trim().to_ascii_uppercase())
            .collect()
    };

    EquipmentRule {
        slots,
        materials,
        include_auxiliary: config.include_auxiliary,
        damage: config.damage_amount,
        interval_ticks: config.damage_interval_ticks.max(1),
    }
}

/// True if any armor slot listed in the rule holds a listed material, or the
/// auxiliary slot is occupied while the rule counts it.
///
/// An empty `slots` set means all four armor slots; an empty `materials` set
/// means the widest canonical list. Neither ever matches nothing.
pub fn eligible(snapshot: &EquipmentSnapshot, rule: &EquipmentRule) -> bool {
    if rule.include_auxiliary && snapshot.auxiliary.is_some() {
        return true;
    }

    let slots: &[EquipmentSlot] = if rule.slots.is_empty() {
        &EquipmentSlot::ARMOR
    } else {
        &rule.slots
    };

    slots.iter().any(|slot| {
        snapshot
            .slot(*slot)
            .is_some_and(|material| material_listed(rule, material))
    })
}

fn material_listed(rule: &EquipmentRule, material: &str) -> bool {
    if rule.materials.is_empty() {
        return CURRENT_MATERIALS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(material));
    }
    rule.materials
        .iter()
        .any(|m| m.eq_ignore_ascii_case(material))
}
