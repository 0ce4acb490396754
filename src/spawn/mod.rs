//! # Spawn Module
//!
//! Population management: when to spawn, what to spawn, where to put it, and
//! when a creature has strayed far enough to be culled.

use crate::{
    Archetype, ArchetypeCatalog, CameraPort, EncounterConfig, Enemy, EnemyId, IslandId,
    LocationContext, PlayerPort, TileKind, Vec2, WorldPort,
};
use log::{debug, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Jitter tries per follower before it is stacked on the anchor.
const MEMBER_PLACEMENT_ATTEMPTS: u32 = 8;

/// Everything the director reads while placing a group.
pub struct SpawnContext<'a> {
    pub catalog: &'a ArchetypeCatalog,
    pub config: &'a EncounterConfig,
    pub player: &'a dyn PlayerPort,
    pub world: &'a dyn WorldPort,
    pub camera: &'a dyn CameraPort,
}

/// Paces spawning and proposes new groups.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnDirector {
    /// Seconds accumulated toward the next spawn attempt
    timer: f32,
    /// Seconds left of the grace period after entering the world
    grace_remaining: f32,
    /// Seconds left of the breathing period after a player death
    protection_remaining: f32,
}

impl SpawnDirector {
    pub fn new(config: &EncounterConfig) -> Self {
        Self {
            timer: 0.0,
            grace_remaining: config.grace_period,
            protection_remaining: 0.0,
        }
    }

    /// Suppresses spawning for `seconds` and restarts the interval.
    pub fn start_protection(&mut self, seconds: f32) {
        self.protection_remaining = seconds;
        self.timer = 0.0;
    }

    pub fn grace_remaining(&self) -> f32 {
        self.grace_remaining
    }

    pub fn protection_remaining(&self) -> f32 {
        self.protection_remaining
    }

    /// Whether spawning is currently allowed at all.
    pub fn is_open(&self, location: LocationContext) -> bool {
        location.is_outdoor() && self.grace_remaining <= 0.0 && self.protection_remaining <= 0.0
    }

    /// Advances the gates and the interval timer.
    ///
    /// Returns true when a spawn attempt is due this frame. The interval only
    /// accumulates while spawning is open.
    pub fn update(&mut self, dt: f32, location: LocationContext, config: &EncounterConfig) -> bool {
        self.grace_remaining = (self.grace_remaining - dt).max(0.0);
        self.protection_remaining = (self.protection_remaining - dt).max(0.0);

        if !self.is_open(location) {
            return false;
        }

        self.timer += dt;
        if self.timer >= config.spawn_interval {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }

    /// Proposes one group of new enemies.
    ///
    /// `population` is the current size of the live collection and `next_id`
    /// supplies fresh ids. At most `max_enemies - population` enemies are
    /// returned; an empty group means no valid anchor was found.
    pub fn spawn_group<R: Rng + ?Sized>(
        &self,
        ctx: &SpawnContext<'_>,
        population: usize,
        next_id: &mut u64,
        rng: &mut R,
    ) -> Vec<Enemy> {
        let capacity = ctx.config.max_enemies.saturating_sub(population);
        if capacity == 0 {
            return Vec::new();
        }

        let player_center = ctx.player.center();
        let island = ctx.world.nearest_island(player_center);
        let Some(archetype) = pick_archetype(ctx.catalog, island, rng) else {
            return Vec::new();
        };

        let group_size = rng
            .gen_range(archetype.group_size.min..=archetype.group_size.max)
            .min(capacity as u32) as usize;

        let Some(anchor) = find_anchor(ctx, archetype, player_center, rng) else {
            debug!("No spawn point found for {} near {:?}", archetype.id, player_center);
            return Vec::new();
        };

        let jitter = ctx.config.group_jitter;
        let mut group = Vec::with_capacity(group_size);
        for member in 0..group_size {
            let center = if member == 0 {
                anchor
            } else {
                place_member(ctx.world, archetype, anchor, jitter, rng)
            };

            let half = archetype.size / 2.0;
            let id = EnemyId(*next_id);
            *next_id += 1;
            group.push(Enemy::spawn(id, archetype, center - Vec2::new(half, half), rng));
        }

        debug!(
            "Spawning {} x{} at {:?} (island {:?})",
            archetype.id,
            group.len(),
            anchor,
            island
        );
        group
    }

    /// Removes live enemies farther than the despawn distance from the
    /// player. Dying and dissolved enemies are never culled here.
    pub fn despawn_distant(
        &self,
        enemies: &mut Vec<Enemy>,
        player_center: Vec2,
        config: &EncounterConfig,
    ) -> Vec<EnemyId> {
        let mut removed = Vec::new();
        enemies.retain(|enemy| {
            let keep =
                !enemy.is_alive() || enemy.center().distance(player_center) <= config.despawn_distance;
            if !keep {
                removed.push(enemy.id());
            }
            keep
        });
        removed
    }
}

/// Draws an archetype from the island's spawn table by weight.
fn pick_archetype<'c, R: Rng + ?Sized>(
    catalog: &'c ArchetypeCatalog,
    island: Option<IslandId>,
    rng: &mut R,
) -> Option<&'c Archetype> {
    let table = catalog.spawn_tables().table_for(island);
    let weights = match WeightedIndex::new(table.iter().map(|entry| entry.weight)) {
        Ok(weights) => weights,
        Err(e) => {
            warn!("Unusable spawn table for island {:?}: {}", island, e);
            return None;
        }
    };

    let entry = &table[weights.sample(rng)];
    match catalog.require(&entry.archetype) {
        Ok(archetype) => Some(archetype),
        Err(e) => {
            warn!("Skipping spawn: {}", e);
            None
        }
    }
}

/// Searches for a group anchor on land around the player.
///
/// Early attempts also require the point to be off-screen; once
/// `offscreen_attempts` tries have failed, any land point is accepted.
fn find_anchor<R: Rng + ?Sized>(
    ctx: &SpawnContext<'_>,
    archetype: &Archetype,
    player_center: Vec2,
    rng: &mut R,
) -> Option<Vec2> {
    let config = ctx.config;
    let viewport = ctx.camera.viewport();

    for attempt in 0..config.placement_attempts {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = rng.gen_range(config.spawn_min_distance..=config.spawn_max_distance);
        let candidate = player_center + Vec2::from_angle(angle) * distance;

        if !is_valid_ground(ctx.world, archetype, candidate) {
            continue;
        }
        if attempt >= config.offscreen_attempts || !viewport.contains(candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Tries to place a follower within `jitter` of the anchor, falling back to
/// the anchor itself when every try lands on invalid ground.
fn place_member<R: Rng + ?Sized>(
    world: &dyn WorldPort,
    archetype: &Archetype,
    anchor: Vec2,
    jitter: f32,
    rng: &mut R,
) -> Vec2 {
    for _ in 0..MEMBER_PLACEMENT_ATTEMPTS {
        let candidate = anchor
            + Vec2::new(
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
            );
        if is_valid_ground(world, archetype, candidate) {
            return candidate;
        }
    }
    anchor
}

/// Land tile under the center and room for the whole box.
fn is_valid_ground(world: &dyn WorldPort, archetype: &Archetype, center: Vec2) -> bool {
    let half = archetype.size / 2.0;
    world.tile_kind(center.x, center.y) == TileKind::Land
        && world.is_walkable(center.x - half, center.y - half, archetype.size, archetype.size)
}
