//! # Standard Drift Fauna
//!
//! The three creature types of the base game and the island spawn tables
//! that mix them.

use super::{
    standard_items, AiBehavior, Archetype, ArchetypeCatalog, ArchetypeId, CountRange, LootEntry,
    SpawnTableEntry, SpawnTables,
};
use std::collections::BTreeMap;

/// Small, twitchy, and always in packs.
pub fn skitter() -> Archetype {
    Archetype {
        id: ArchetypeId::new("skitter"),
        name: "Skitter".to_string(),
        max_integrity: 15,
        contact_damage: 5,
        speed: 60.0,
        size: 10.0,
        aggro_radius: 80.0,
        deaggro_radius: 128.0,
        attack_range: 20.0,
        attack_cooldown: 0.8,
        knockback: 6.0,
        behavior: AiBehavior::Darting,
        loot: vec![
            LootEntry::new("shell_fragment", 0.4),
            LootEntry::new("red_essence", 0.15),
        ],
        group_size: CountRange::new(2, 4),
        currency: CountRange::new(2, 4),
    }
}

/// A slow cloud that wobbles toward whoever gets close.
pub fn haze_drifter() -> Archetype {
    Archetype {
        id: ArchetypeId::new("haze_drifter"),
        name: "Haze Drifter".to_string(),
        max_integrity: 25,
        contact_damage: 8,
        speed: 25.0,
        size: 16.0,
        aggro_radius: 64.0,
        deaggro_radius: 120.0,
        attack_range: 16.0,
        attack_cooldown: 1.2,
        knockback: 4.0,
        behavior: AiBehavior::Drifting,
        loot: vec![
            LootEntry::new("haze_wisp", 0.3),
            LootEntry::new("red_essence", 0.2),
        ],
        group_size: CountRange::new(1, 1),
        currency: CountRange::new(4, 8),
    }
}

/// Walks the same loop forever and charges in a straight line.
pub fn loopling() -> Archetype {
    Archetype {
        id: ArchetypeId::new("loopling"),
        name: "Loopling".to_string(),
        max_integrity: 20,
        contact_damage: 6,
        speed: 45.0,
        size: 14.0,
        aggro_radius: 72.0,
        deaggro_radius: 128.0,
        attack_range: 18.0,
        attack_cooldown: 1.0,
        knockback: 8.0,
        behavior: AiBehavior::Patrolling,
        loot: vec![
            LootEntry::new("loop_crystal", 0.35),
            LootEntry::new("red_essence", 0.1),
        ],
        group_size: CountRange::new(1, 2),
        currency: CountRange::new(8, 15),
    }
}

/// Island spawn tables, easiest near the harbor and hardest far out.
pub fn spawn_tables() -> SpawnTables {
    let mut islands = BTreeMap::new();
    // Port Clawson
    islands.insert(
        0,
        vec![
            SpawnTableEntry::new("skitter", 70),
            SpawnTableEntry::new("haze_drifter", 20),
            SpawnTableEntry::new("loopling", 10),
        ],
    );
    // Molthaven
    islands.insert(
        1,
        vec![
            SpawnTableEntry::new("skitter", 50),
            SpawnTableEntry::new("haze_drifter", 30),
            SpawnTableEntry::new("loopling", 20),
        ],
    );
    // Iron Reef
    islands.insert(
        2,
        vec![
            SpawnTableEntry::new("skitter", 30),
            SpawnTableEntry::new("haze_drifter", 35),
            SpawnTableEntry::new("loopling", 35),
        ],
    );
    // Deepcoil Isle
    islands.insert(
        3,
        vec![
            SpawnTableEntry::new("haze_drifter", 40),
            SpawnTableEntry::new("loopling", 60),
        ],
    );

    SpawnTables {
        islands,
        default: vec![
            SpawnTableEntry::new("skitter", 40),
            SpawnTableEntry::new("haze_drifter", 30),
            SpawnTableEntry::new("loopling", 30),
        ],
    }
}

impl ArchetypeCatalog {
    /// The built-in catalog of the base game.
    pub fn standard() -> Self {
        let archetypes = vec![skitter(), haze_drifter(), loopling()];
        Self {
            archetypes: archetypes.into_iter().map(|a| (a.id.clone(), a)).collect(),
            spawn_tables: spawn_tables(),
            items: standard_items().into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }
}
