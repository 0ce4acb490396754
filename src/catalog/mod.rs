//! # Catalog Module
//!
//! Immutable definitions shared by every live creature: archetypes, the
//! location-keyed spawn tables, drop items, and weapons.
//!
//! The catalog is loaded once (from the built-in [`ArchetypeCatalog::standard`]
//! data or from JSON), validated, and then only ever read. Enemy instances
//! refer to their archetype by [`ArchetypeId`] and never copy its data.

pub mod items;
pub mod standard;

pub use items::*;

use crate::{EncounterError, EncounterResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Identifier of an island, as reported by the island topology.
pub type IslandId = u32;

/// Stable identifier of an archetype (e.g. `"skitter"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeId(String);

impl ArchetypeId {
    /// Creates an archetype id from its string key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The string key of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArchetypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Movement personality of an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiBehavior {
    /// Pauses, then bursts a short distance in a fresh direction
    Darting,
    /// Undulates along a slow sinusoidal path
    Drifting,
    /// Walks a fixed polygon and charges when the player gets close
    Patrolling,
}

/// One independent drop roll of a loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Item placed in the world when the roll succeeds
    pub item: ItemId,
    /// Probability of the drop, 0.0 to 1.0
    pub chance: f64,
}

impl LootEntry {
    pub fn new(item: impl Into<String>, chance: f64) -> Self {
        Self {
            item: ItemId::new(item),
            chance,
        }
    }
}

/// Inclusive `[min, max]` range of unsigned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Immutable stat and behavior template shared by every creature of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Stable key used by spawn tables, statistics, and quests
    pub id: ArchetypeId,
    /// Display name
    pub name: String,
    /// Maximum shell integrity
    pub max_integrity: u32,
    /// Damage dealt to the player by one bite
    pub contact_damage: u32,
    /// Movement speed in px/s
    pub speed: f32,
    /// Edge length of the square bounding box
    pub size: f32,
    /// Distance under which a wandering creature starts chasing
    pub aggro_radius: f32,
    /// Distance over which a chasing creature gives up (≥ aggro radius)
    pub deaggro_radius: f32,
    /// Distance under which a chasing creature starts an attack
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    /// Displacement applied when the creature is struck
    pub knockback: f32,
    /// Movement personality
    pub behavior: AiBehavior,
    /// Independent drop rolls made on Disperse
    pub loot: Vec<LootEntry>,
    /// Number of creatures spawned together
    pub group_size: CountRange,
    /// Base Brine Token award before the Resolve multiplier
    pub currency: CountRange,
}

impl Archetype {
    /// Checks the internal consistency of the archetype's numbers.
    pub fn validate(&self) -> EncounterResult<()> {
        let fail = |reason: &str| {
            Err(EncounterError::InvalidCatalog(format!(
                "archetype '{}': {}",
                self.id, reason
            )))
        };

        if self.max_integrity == 0 {
            return fail("max integrity must be positive");
        }
        if !(self.size > 0.0) || !(self.speed >= 0.0) {
            return fail("size must be positive and speed non-negative");
        }
        if !(self.aggro_radius > 0.0) || !(self.attack_range > 0.0) {
            return fail("aggro radius and attack range must be positive");
        }
        if self.deaggro_radius < self.aggro_radius {
            return fail("deaggro radius must not be smaller than aggro radius");
        }
        if !(self.attack_cooldown >= 0.0) || !(self.knockback >= 0.0) {
            return fail("attack cooldown and knockback must be non-negative");
        }
        if self.group_size.min == 0 || self.group_size.min > self.group_size.max {
            return fail("group size must satisfy 1 <= min <= max");
        }
        if self.currency.min > self.currency.max {
            return fail("currency range must satisfy min <= max");
        }
        if let Some(entry) = self.loot.iter().find(|e| !(0.0..=1.0).contains(&e.chance)) {
            return fail(&format!("drop chance for '{}' outside [0, 1]", entry.item));
        }
        Ok(())
    }
}

/// A weighted candidate in a spawn table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnTableEntry {
    pub archetype: ArchetypeId,
    pub weight: u32,
}

impl SpawnTableEntry {
    pub fn new(archetype: impl Into<String>, weight: u32) -> Self {
        Self {
            archetype: ArchetypeId::new(archetype),
            weight,
        }
    }
}

/// Spawn tables keyed by the nearest island, with a fallback.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnTables {
    /// Per-island tables
    pub islands: BTreeMap<IslandId, Vec<SpawnTableEntry>>,
    /// Used when no island resolves or the island has no table
    pub default: Vec<SpawnTableEntry>,
}

impl SpawnTables {
    /// Selects the table for the given island, falling back to the default.
    pub fn table_for(&self, island: Option<IslandId>) -> &[SpawnTableEntry] {
        island
            .and_then(|id| self.islands.get(&id))
            .filter(|table| !table.is_empty())
            .unwrap_or(&self.default)
    }
}

/// A melee weapon the player can have equipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub name: String,
    /// Integrity removed per accepted hit
    pub damage: u32,
    /// Reach of the hitbox beyond the player's box, in px
    pub range: f32,
    /// Seconds between accepted swings
    pub cooldown: f32,
    pub knockback: f32,
    /// Swing arc in radians, used by presentation
    pub swing_arc: f32,
}

impl WeaponDefinition {
    /// The starter wrench every player carries.
    pub fn dock_wrench() -> Self {
        Self {
            name: "Dock Wrench".to_string(),
            damage: 10,
            range: 24.0,
            cooldown: 0.4,
            knockback: 8.0,
            swing_arc: std::f32::consts::FRAC_PI_2,
        }
    }
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self::dock_wrench()
    }
}

/// The full, validated set of encounter definitions.
///
/// # Examples
///
/// ```
/// use drift_encounter::{ArchetypeCatalog, ArchetypeId, AiBehavior};
///
/// let catalog = ArchetypeCatalog::standard();
/// let skitter = catalog.get(&ArchetypeId::new("skitter")).unwrap();
/// assert_eq!(skitter.behavior, AiBehavior::Darting);
/// assert!(skitter.deaggro_radius >= skitter.aggro_radius);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeCatalog {
    archetypes: BTreeMap<ArchetypeId, Archetype>,
    spawn_tables: SpawnTables,
    #[serde(default)]
    items: BTreeMap<ItemId, CombatItem>,
}

impl ArchetypeCatalog {
    /// Builds and validates a catalog from its parts.
    pub fn new(
        archetypes: Vec<Archetype>,
        spawn_tables: SpawnTables,
        items: Vec<CombatItem>,
    ) -> EncounterResult<Self> {
        let catalog = Self {
            archetypes: archetypes.into_iter().map(|a| (a.id.clone(), a)).collect(),
            spawn_tables,
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses and validates a catalog from JSON.
    pub fn from_json_str(json: &str) -> EncounterResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads, parses, and validates a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> EncounterResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the catalog to pretty-printed JSON.
    pub fn to_json_string(&self) -> EncounterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Looks up an archetype by id.
    pub fn get(&self, id: &ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id)
    }

    /// Looks up an archetype, treating a missing entry as an error.
    pub fn require(&self, id: &ArchetypeId) -> EncounterResult<&Archetype> {
        self.get(id)
            .ok_or_else(|| EncounterError::UnknownArchetype(id.clone()))
    }

    /// Iterates over all archetypes in id order.
    pub fn archetypes(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.values()
    }

    pub fn spawn_tables(&self) -> &SpawnTables {
        &self.spawn_tables
    }

    /// Looks up a drop item definition.
    pub fn item(&self, id: &ItemId) -> Option<&CombatItem> {
        self.items.get(id)
    }

    /// Validates every archetype, spawn table, and loot reference.
    pub fn validate(&self) -> EncounterResult<()> {
        for (key, archetype) in &self.archetypes {
            if key != &archetype.id {
                return Err(EncounterError::InvalidCatalog(format!(
                    "archetype keyed '{}' declares id '{}'",
                    key, archetype.id
                )));
            }
            archetype.validate()?;

            if !self.items.is_empty() {
                if let Some(entry) = archetype.loot.iter().find(|e| !self.items.contains_key(&e.item)) {
                    return Err(EncounterError::InvalidCatalog(format!(
                        "archetype '{}' drops unknown item '{}'",
                        archetype.id, entry.item
                    )));
                }
            }
        }

        if self.spawn_tables.default.is_empty() {
            return Err(EncounterError::InvalidCatalog(
                "default spawn table is empty".to_string(),
            ));
        }

        let tables = std::iter::once(&self.spawn_tables.default)
            .chain(self.spawn_tables.islands.values());
        for entry in tables.flatten() {
            if !self.archetypes.contains_key(&entry.archetype) {
                return Err(EncounterError::UnknownArchetype(entry.archetype.clone()));
            }
            if entry.weight == 0 {
                return Err(EncounterError::InvalidCatalog(format!(
                    "spawn weight for '{}' must be positive",
                    entry.archetype
                )));
            }
        }

        Ok(())
    }
}

impl Default for ArchetypeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken(mutate: impl FnOnce(&mut Archetype)) -> EncounterResult<ArchetypeCatalog> {
        let mut archetype = standard::skitter();
        mutate(&mut archetype);
        ArchetypeCatalog::new(
            vec![archetype],
            SpawnTables {
                islands: BTreeMap::new(),
                default: vec![SpawnTableEntry::new("skitter", 1)],
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = ArchetypeCatalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.archetypes().count(), 3);
    }

    #[test]
    fn test_require_unknown_archetype() {
        let catalog = ArchetypeCatalog::standard();
        let result = catalog.require(&ArchetypeId::new("kraken"));
        assert!(matches!(result, Err(EncounterError::UnknownArchetype(_))));
    }

    #[test]
    fn test_spawn_table_fallback() {
        let catalog = ArchetypeCatalog::standard();
        let tables = catalog.spawn_tables();
        assert_eq!(tables.table_for(Some(3)).len(), 2);
        assert_eq!(tables.table_for(Some(99)), tables.default.as_slice());
        assert_eq!(tables.table_for(None), tables.default.as_slice());
    }

    #[test]
    fn test_rejects_inverted_aggro_radii() {
        let result = broken(|a| a.deaggro_radius = a.aggro_radius - 1.0);
        assert!(matches!(result, Err(EncounterError::InvalidCatalog(_))));
    }

    #[test]
    fn test_rejects_bad_group_and_loot() {
        assert!(broken(|a| a.group_size = CountRange::new(0, 2)).is_err());
        assert!(broken(|a| a.group_size = CountRange::new(3, 2)).is_err());
        assert!(broken(|a| a.loot.push(LootEntry::new("shell_fragment", 1.5))).is_err());
    }

    #[test]
    fn test_rejects_spawn_table_with_unknown_archetype() {
        let result = ArchetypeCatalog::new(
            vec![standard::skitter()],
            SpawnTables {
                islands: BTreeMap::new(),
                default: vec![SpawnTableEntry::new("kraken", 10)],
            },
            Vec::new(),
        );
        assert!(matches!(result, Err(EncounterError::UnknownArchetype(_))));
    }

    #[test]
    fn test_rejects_unknown_loot_item() {
        let result = ArchetypeCatalog::new(
            vec![standard::skitter()],
            SpawnTables {
                islands: BTreeMap::new(),
                default: vec![SpawnTableEntry::new("skitter", 10)],
            },
            vec![CombatItem::new("red_essence", "Red Essence", 10, 15)],
        );
        assert!(matches!(result, Err(EncounterError::InvalidCatalog(_))));
    }

    #[test]
    fn test_json_reload_matches() {
        let catalog = ArchetypeCatalog::standard();
        let json = catalog.to_json_string().unwrap();
        let reloaded = ArchetypeCatalog::from_json_str(&json).unwrap();
        assert_eq!(catalog, reloaded);
    }

    #[test]
    fn test_dock_wrench_defaults() {
        let wrench = WeaponDefinition::default();
        assert_eq!(wrench.damage, 10);
        assert_eq!(wrench.range, 24.0);
        assert_eq!(wrench.cooldown, 0.4);
    }
}
