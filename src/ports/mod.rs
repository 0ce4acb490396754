//! # Ports Module
//!
//! Narrow contracts between the encounter engine and the rest of the game.
//!
//! The engine never reaches into a shared game object. Everything it needs to
//! ask (is this tile land? where is the player?) or to tell (award tokens,
//! record a kill) goes through one of these traits, injected when the engine
//! is built.

use crate::{
    ArchetypeId, CombatStatistics, EncounterResult, EnemyId, Facing, IslandId, ItemId, Rect,
    ResolveChoice, Vec2,
};
use serde::{Deserialize, Serialize};

/// Surface type of a world tile, as far as spawning cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Water,
    Shore,
    Land,
}

/// Where the player currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocationContext {
    /// The open world, where Drift Fauna roam
    #[default]
    Outdoor,
    /// Inside a building or other interior
    Indoor,
}

impl LocationContext {
    pub fn is_outdoor(self) -> bool {
        self == LocationContext::Outdoor
    }
}

/// Terrain and island topology queries.
pub trait WorldPort {
    /// Whether a box with its top-left corner at `(x, y)` fits on walkable ground.
    fn is_walkable(&self, x: f32, y: f32, width: f32, height: f32) -> bool;

    /// Surface type of the tile under a world position.
    fn tile_kind(&self, x: f32, y: f32) -> TileKind;

    /// The island nearest to a world position, if any island is known.
    fn nearest_island(&self, position: Vec2) -> Option<IslandId>;
}

/// The currently visible slice of the world.
pub trait CameraPort {
    fn viewport(&self) -> Rect;
}

/// The player avatar as the encounter engine sees it.
pub trait PlayerPort {
    /// Top-left corner of the player's box.
    fn position(&self) -> Vec2;

    /// Size of the player's box.
    fn size(&self) -> Vec2;

    fn facing(&self) -> Facing;

    fn is_dead(&self) -> bool;

    fn location(&self) -> LocationContext;

    /// Applies an enemy bite to the player.
    fn take_damage(&mut self, amount: u32, source: EnemyId);

    /// The player's bounding box.
    fn bounds(&self) -> Rect {
        Rect::from_position_size(self.position(), self.size())
    }

    /// Center of the player's bounding box.
    fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

/// Receiver of Brine Tokens.
pub trait EconomyPort {
    fn add_currency(&mut self, amount: u32);
}

/// Receiver of Continuity.
pub trait ProgressionPort {
    fn add_progress(&mut self, amount: u32, reason: &str);
}

/// Quest-log notifications.
pub trait QuestLogPort {
    fn on_kill(&mut self, archetype: &ArchetypeId);

    fn on_choice_made(&mut self, choice: ResolveChoice);
}

/// Placement of pickups in the world.
pub trait WorldItemPort {
    /// Places `item` at `position`, to vanish after `expiry_secs` seconds.
    fn place_item(&mut self, item: &ItemId, position: Vec2, expiry_secs: f32);
}

/// Cross-session persistence of [`CombatStatistics`].
pub trait StatsStore {
    fn load(&mut self) -> EncounterResult<CombatStatistics>;

    fn save(&mut self, stats: &CombatStatistics) -> EncounterResult<()>;
}

/// Every collaborator the engine talks to, handed over at construction.
pub struct Collaborators {
    pub world: Box<dyn WorldPort>,
    pub camera: Box<dyn CameraPort>,
    pub player: Box<dyn PlayerPort>,
    pub economy: Box<dyn EconomyPort>,
    pub progression: Box<dyn ProgressionPort>,
    pub quest_log: Box<dyn QuestLogPort>,
    pub items: Box<dyn WorldItemPort>,
    pub stats: Box<dyn StatsStore>,
}

/// The reward side of the collaborators, borrowed for one Resolve commit.
pub struct RewardSinks<'a> {
    pub economy: &'a mut dyn EconomyPort,
    pub progression: &'a mut dyn ProgressionPort,
    pub quest_log: &'a mut dyn QuestLogPort,
    pub items: &'a mut dyn WorldItemPort,
    pub stats: &'a mut dyn StatsStore,
}

impl Collaborators {
    pub fn reward_sinks(&mut self) -> RewardSinks<'_> {
        RewardSinks {
            economy: self.economy.as_mut(),
            progression: self.progression.as_mut(),
            quest_log: self.quest_log.as_mut(),
            items: self.items.as_mut(),
            stats: self.stats.as_mut(),
        }
    }
}
