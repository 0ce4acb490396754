//! # Sandbox Module
//!
//! In-memory stand-ins for every collaborator port. The headless simulator
//! runs on these, and so do the tests.
//!
//! Handles ([`PlayerHandle`], [`LedgerHandle`], [`MemoryStore`]) share their
//! state between clones, so a caller can hand one clone to the engine and
//! keep another to script the player or inspect rewards.

use crate::{
    ArchetypeId, CameraPort, Collaborators, EconomyPort, EnemyId, Facing, IslandId, ItemId,
    LocationContext, MemoryStore, PlayerPort, ProgressionPort, QuestLogPort, Rect, ResolveChoice,
    TileKind, Vec2, WorldItemPort, WorldPort,
};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Unbounded terrain with optional walls and tile regions.
#[derive(Debug, Clone)]
pub struct OpenField {
    walls: Vec<Rect>,
    regions: Vec<(Rect, TileKind)>,
    default_tile: TileKind,
    island: Option<IslandId>,
}

impl OpenField {
    /// All land, no walls, no islands.
    pub fn new() -> Self {
        Self {
            walls: Vec::new(),
            regions: Vec::new(),
            default_tile: TileKind::Land,
            island: None,
        }
    }

    /// Adds an impassable box.
    pub fn with_wall(mut self, wall: Rect) -> Self {
        self.walls.push(wall);
        self
    }

    /// Sets the tile kind outside every region.
    pub fn with_default_tile(mut self, kind: TileKind) -> Self {
        self.default_tile = kind;
        self
    }

    /// Paints a region with a tile kind. Earlier regions win on overlap.
    pub fn with_region(mut self, area: Rect, kind: TileKind) -> Self {
        self.regions.push((area, kind));
        self
    }

    /// Reports `island` as the nearest island everywhere.
    pub fn with_island(mut self, island: IslandId) -> Self {
        self.island = Some(island);
        self
    }
}

impl Default for OpenField {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldPort for OpenField {
    fn is_walkable(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        let footprint = Rect::new(x, y, width, height);
        !self.walls.iter().any(|wall| wall.overlaps(&footprint))
    }

    fn tile_kind(&self, x: f32, y: f32) -> TileKind {
        let point = Vec2::new(x, y);
        self.regions
            .iter()
            .find(|(area, _)| area.contains(point))
            .map(|(_, kind)| *kind)
            .unwrap_or(self.default_tile)
    }

    fn nearest_island(&self, _position: Vec2) -> Option<IslandId> {
        self.island
    }
}

/// A camera that never moves.
#[derive(Debug, Clone)]
pub struct FixedCamera {
    viewport: Rect,
}

impl FixedCamera {
    pub fn new(viewport: Rect) -> Self {
        Self { viewport }
    }
}

impl CameraPort for FixedCamera {
    fn viewport(&self) -> Rect {
        self.viewport
    }
}

/// A camera centered on the player.
#[derive(Debug, Clone)]
pub struct FollowCamera {
    player: PlayerHandle,
    width: f32,
    height: f32,
}

impl FollowCamera {
    pub fn new(player: PlayerHandle, width: f32, height: f32) -> Self {
        Self {
            player,
            width,
            height,
        }
    }
}

impl CameraPort for FollowCamera {
    fn viewport(&self) -> Rect {
        let center = self.player.center();
        Rect::new(
            center.x - self.width / 2.0,
            center.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

/// A player avatar moved by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedPlayer {
    position: Vec2,
    size: Vec2,
    facing: Facing,
    dead: bool,
    location: LocationContext,
    /// Every bite taken, in order
    bites: Vec<(u32, EnemyId)>,
}

impl ScriptedPlayer {
    pub const SIZE: f32 = 16.0;

    /// A player whose box has its top-left corner at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            size: Vec2::new(Self::SIZE, Self::SIZE),
            facing: Facing::default(),
            dead: false,
            location: LocationContext::Outdoor,
            bites: Vec::new(),
        }
    }

    /// A player whose box is centered on `center`.
    pub fn centered_at(center: Vec2) -> Self {
        let half = Self::SIZE / 2.0;
        Self::at(center - Vec2::new(half, half))
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.size * 0.5;
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    pub fn set_location(&mut self, location: LocationContext) {
        self.location = location;
    }

    /// Total damage taken from bites.
    pub fn damage_taken(&self) -> u32 {
        self.bites.iter().map(|(amount, _)| amount).sum()
    }

    pub fn bites(&self) -> &[(u32, EnemyId)] {
        &self.bites
    }
}

impl PlayerPort for ScriptedPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn location(&self) -> LocationContext {
        self.location
    }

    fn take_damage(&mut self, amount: u32, source: EnemyId) {
        self.bites.push((amount, source));
    }
}

/// Shared handle to a [`ScriptedPlayer`].
#[derive(Debug, Clone)]
pub struct PlayerHandle(Rc<RefCell<ScriptedPlayer>>);

impl PlayerHandle {
    pub fn new(player: ScriptedPlayer) -> Self {
        Self(Rc::new(RefCell::new(player)))
    }

    pub fn borrow(&self) -> Ref<'_, ScriptedPlayer> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ScriptedPlayer> {
        self.0.borrow_mut()
    }
}

impl PlayerPort for PlayerHandle {
    fn position(&self) -> Vec2 {
        self.borrow().position()
    }

    fn size(&self) -> Vec2 {
        self.borrow().size()
    }

    fn facing(&self) -> Facing {
        self.borrow().facing()
    }

    fn is_dead(&self) -> bool {
        self.borrow().is_dead()
    }

    fn location(&self) -> LocationContext {
        self.borrow().location()
    }

    fn take_damage(&mut self, amount: u32, source: EnemyId) {
        self.borrow_mut().take_damage(amount, source);
    }
}

/// Everything the reward collaborators were told.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    /// Brine Tokens received in total
    pub currency: u32,
    /// Continuity grants with their reason tags
    pub progress: Vec<(u32, String)>,
    pub kills: Vec<ArchetypeId>,
    pub choices: Vec<ResolveChoice>,
    /// Placed pickups with position and expiry
    pub items: Vec<(ItemId, Vec2, f32)>,
}

/// Shared [`Ledger`] acting as economy, progression, quest log, and item
/// placement at once.
#[derive(Debug, Clone, Default)]
pub struct LedgerHandle(Rc<RefCell<Ledger>>);

impl LedgerHandle {
    pub fn snapshot(&self) -> Ledger {
        self.0.borrow().clone()
    }
}

impl EconomyPort for LedgerHandle {
    fn add_currency(&mut self, amount: u32) {
        let mut ledger = self.0.borrow_mut();
        ledger.currency = ledger.currency.saturating_add(amount);
    }
}

impl ProgressionPort for LedgerHandle {
    fn add_progress(&mut self, amount: u32, reason: &str) {
        self.0.borrow_mut().progress.push((amount, reason.to_string()));
    }
}

impl QuestLogPort for LedgerHandle {
    fn on_kill(&mut self, archetype: &ArchetypeId) {
        self.0.borrow_mut().kills.push(archetype.clone());
    }

    fn on_choice_made(&mut self, choice: ResolveChoice) {
        self.0.borrow_mut().choices.push(choice);
    }
}

impl WorldItemPort for LedgerHandle {
    fn place_item(&mut self, item: &ItemId, position: Vec2, expiry_secs: f32) {
        self.0
            .borrow_mut()
            .items
            .push((item.clone(), position, expiry_secs));
    }
}

/// A complete set of stand-in collaborators.
///
/// # Examples
///
/// ```
/// use drift_encounter::sandbox::Sandbox;
/// use drift_encounter::{ArchetypeCatalog, EncounterConfig, EncounterEngine};
///
/// let sandbox = Sandbox::new();
/// let mut engine = EncounterEngine::new(
///     ArchetypeCatalog::standard(),
///     EncounterConfig::for_testing(),
///     sandbox.collaborators(),
/// )
/// .unwrap();
/// engine.update(1.0 / 60.0);
/// assert!(engine.live_enemy_count() <= engine.config().max_enemies);
/// ```
#[derive(Debug, Clone)]
pub struct Sandbox {
    pub world: OpenField,
    pub player: PlayerHandle,
    pub ledger: LedgerHandle,
    pub store: MemoryStore,
    /// Viewport size of the follow camera
    pub view_size: Vec2,
}

impl Sandbox {
    /// Open land with the player centered on the origin.
    pub fn new() -> Self {
        Self::with_world(OpenField::new())
    }

    pub fn with_world(world: OpenField) -> Self {
        Self {
            world,
            player: PlayerHandle::new(ScriptedPlayer::centered_at(Vec2::ZERO)),
            ledger: LedgerHandle::default(),
            store: MemoryStore::new(),
            view_size: Vec2::new(320.0, 240.0),
        }
    }

    /// Boxes clones of every stand-in for the engine.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            world: Box::new(self.world.clone()),
            camera: Box::new(FollowCamera::new(
                self.player.clone(),
                self.view_size.x,
                self.view_size.y,
            )),
            player: Box::new(self.player.clone()),
            economy: Box::new(self.ledger.clone()),
            progression: Box::new(self.ledger.clone()),
            quest_log: Box::new(self.ledger.clone()),
            items: Box::new(self.ledger.clone()),
            stats: Box::new(self.store.clone()),
        }
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
