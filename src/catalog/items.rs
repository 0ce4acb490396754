//! # Combat Items
//!
//! Pickups that Drift Fauna leave behind when dispersed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a world item (e.g. `"shell_fragment"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Definition of a drop item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatItem {
    pub id: ItemId,
    pub name: String,
    /// Maximum stack size in the inventory
    pub max_stack: u32,
    /// Shop value in Brine Tokens
    pub value: u32,
}

impl CombatItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_stack: u32, value: u32) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            max_stack,
            value,
        }
    }
}

/// The four items the standard Drift Fauna drop.
pub fn standard_items() -> Vec<CombatItem> {
    vec![
        CombatItem::new("shell_fragment", "Shell Fragment", 20, 5),
        CombatItem::new("red_essence", "Red Essence", 10, 15),
        CombatItem::new("haze_wisp", "Haze Wisp", 10, 10),
        CombatItem::new("loop_crystal", "Loop Crystal", 10, 12),
    ]
}
