//! # Enemy Module
//!
//! The per-creature state machine.
//!
//! ```text
//! Wandering ⇄ Chasing ⇄ Attacking
//!     └─────────┴──────────┴──▶ Hurt ──▶ Chasing | Dying ──▶ Dissolved
//! ```
//!
//! An [`Enemy`] owns only its runtime fields; everything shared by its type
//! lives in the [`Archetype`] it points at. Once [`EnemyState::Dissolved`] is
//! reached only the particle list keeps changing, and the enemy becomes
//! removable when the last particle fades.

pub mod behavior;

pub use behavior::*;

use crate::config::{
    ATTACK_DURATION, ATTACK_REACH_FACTOR, ATTACK_STRIKE_AT, ATTACK_STRIKE_WINDOW,
    DISSOLVE_PARTICLE_CHANCE, DYING_DURATION, DYING_FLASH_DURATION, HIT_PARTICLE_COUNT,
    HURT_DURATION, PARTICLE_LIFT,
};
use crate::effects::{burst, update_particles, Particle};
use crate::{
    Archetype, ArchetypeCatalog, ArchetypeId, EncounterError, EncounterResult, PlayerPort, Rect,
    Vec2, WorldPort,
};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a live enemy, unique for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub u64);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavioral state of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Idle or wandering, unaware of the player
    Wandering,
    Chasing,
    Attacking,
    /// Brief flash after being struck; further hits are ignored
    Hurt,
    /// Death sequence: flashing, then fading
    Dying,
    /// Terminal; waiting for particles to fade before removal
    Dissolved,
}

impl EnemyState {
    /// Whether damage is refused in this state.
    pub fn is_invulnerable(self) -> bool {
        matches!(self, EnemyState::Hurt | EnemyState::Dying | EnemyState::Dissolved)
    }
}

/// A live Drift Fauna creature.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EnemyId,
    archetype: ArchetypeId,
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    integrity: u32,
    state: EnemyState,
    /// Seconds since the current state was entered
    state_elapsed: f32,
    /// Seconds until the next attack may start
    attack_cooldown: f32,
    /// Whether the current attack has already bitten
    strike_landed: bool,
    /// Seconds alive, offset at birth so a pack does not pulse in unison
    age: f32,
    behavior: Behavior,
    particles: Vec<Particle>,
}

impl Enemy {
    /// Creates a fresh, wandering enemy of the given archetype.
    pub fn spawn<R: Rng + ?Sized>(
        id: EnemyId,
        archetype: &Archetype,
        position: Vec2,
        rng: &mut R,
    ) -> Self {
        Self {
            id,
            archetype: archetype.id.clone(),
            position,
            velocity: Vec2::ZERO,
            size: Vec2::new(archetype.size, archetype.size),
            integrity: archetype.max_integrity,
            state: EnemyState::Wandering,
            state_elapsed: 0.0,
            attack_cooldown: 0.0,
            strike_landed: false,
            age: rng.gen_range(0.0..1.0),
            behavior: Behavior::new(archetype.behavior, rng),
            particles: Vec::new(),
        }
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn archetype_id(&self) -> &ArchetypeId {
        &self.archetype
    }

    /// Top-left corner of the bounding box.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn integrity(&self) -> u32 {
        self.integrity
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn state_elapsed(&self) -> f32 {
        self.state_elapsed
    }

    /// Seconds until the next attack may begin.
    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Seconds into the death sequence, if dying.
    pub fn dying_elapsed(&self) -> Option<f32> {
        (self.state == EnemyState::Dying).then_some(self.state_elapsed)
    }

    /// Not yet dying or dissolved.
    pub fn is_alive(&self) -> bool {
        !matches!(self.state, EnemyState::Dying | EnemyState::Dissolved)
    }

    /// Dissolved with every particle faded.
    pub fn is_removable(&self) -> bool {
        self.state == EnemyState::Dissolved && self.particles.is_empty()
    }

    /// Render opacity: solid until the fade phase of the death sequence.
    pub fn opacity(&self) -> f32 {
        match self.state {
            EnemyState::Dissolved => 0.0,
            EnemyState::Dying if self.state_elapsed >= DYING_FLASH_DURATION => {
                let fade = (self.state_elapsed - DYING_FLASH_DURATION)
                    / (DYING_DURATION - DYING_FLASH_DURATION);
                (1.0 - fade).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Center-to-center distance to the player.
    pub fn distance_to(&self, player: &dyn PlayerPort) -> f32 {
        self.center().distance(player.center())
    }

    /// Advances the enemy by one frame.
    ///
    /// Errors are entity faults: the caller is expected to drop this enemy
    /// and carry on with the rest of the population.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        catalog: &ArchetypeCatalog,
        player: &mut dyn PlayerPort,
        world: &dyn WorldPort,
        rng: &mut R,
    ) -> EncounterResult<()> {
        update_particles(&mut self.particles, dt);
        if self.state == EnemyState::Dissolved {
            return Ok(());
        }

        let archetype = catalog.require(&self.archetype)?;

        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.age += dt;
        let previous_elapsed = self.state_elapsed;
        self.state_elapsed += dt;

        match self.state {
            EnemyState::Wandering => self.update_wandering(dt, archetype, &*player, world, rng),
            EnemyState::Chasing => self.update_chasing(dt, archetype, &*player, world),
            EnemyState::Attacking => self.update_attacking(previous_elapsed, archetype, player),
            EnemyState::Hurt => self.update_hurt(),
            EnemyState::Dying => self.update_dying(rng),
            EnemyState::Dissolved => {}
        }

        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(EncounterError::EntityFault {
                enemy: self.id,
                reason: format!(
                    "non-finite motion (position {:?}, velocity {:?})",
                    self.position, self.velocity
                ),
            });
        }
        Ok(())
    }

    /// Applies a player hit.
    ///
    /// Returns false, changing nothing, while hurt, dying, or dissolved.
    /// Otherwise integrity drops (never below zero), the enemy enters
    /// [`EnemyState::Hurt`], and it is shoved along `knockback` by the
    /// archetype's knockback magnitude one axis at a time, never into solid
    /// terrain.
    pub fn apply_damage<R: Rng + ?Sized>(
        &mut self,
        amount: u32,
        knockback: Vec2,
        archetype: &Archetype,
        world: &dyn WorldPort,
        rng: &mut R,
    ) -> bool {
        if self.state.is_invulnerable() {
            return false;
        }

        self.integrity = self.integrity.saturating_sub(amount);
        self.enter(EnemyState::Hurt);
        self.velocity = Vec2::ZERO;
        self.behavior.cancel_charge();

        let shove = knockback * archetype.knockback;
        let target_x = self.position.x + shove.x;
        if world.is_walkable(target_x, self.position.y, self.size.x, self.size.y) {
            self.position.x = target_x;
        }
        let target_y = self.position.y + shove.y;
        if world.is_walkable(self.position.x, target_y, self.size.x, self.size.y) {
            self.position.y = target_y;
        }

        let mut sparks = burst(rng, self.center(), HIT_PARTICLE_COUNT, 0.0, (0.0, 42.0), (0.2, 0.4));
        for spark in &mut sparks {
            spark.lift = PARTICLE_LIFT;
        }
        self.particles.extend(sparks);
        true
    }

    fn enter(&mut self, state: EnemyState) {
        self.state = state;
        self.state_elapsed = 0.0;
    }

    fn update_wandering<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        archetype: &Archetype,
        player: &dyn PlayerPort,
        world: &dyn WorldPort,
        rng: &mut R,
    ) {
        if self.distance_to(player) < archetype.aggro_radius {
            self.enter(EnemyState::Chasing);
            return;
        }

        if self
            .behavior
            .steer_wander(dt, archetype.speed, self.age, &mut self.velocity, rng)
        {
            self.apply_movement(dt, world);
        }
    }

    fn update_chasing(
        &mut self,
        dt: f32,
        archetype: &Archetype,
        player: &dyn PlayerPort,
        world: &dyn WorldPort,
    ) {
        let distance = self.distance_to(player);
        if distance > archetype.deaggro_radius {
            self.enter(EnemyState::Wandering);
            self.velocity = Vec2::ZERO;
            self.behavior.cancel_charge();
            return;
        }

        if distance < archetype.attack_range && self.attack_cooldown <= 0.0 {
            self.enter(EnemyState::Attacking);
            self.velocity = Vec2::ZERO;
            self.strike_landed = false;
            return;
        }

        let toward = (player.center() - self.center()).normalize_or_zero();
        if self.behavior.steer_chase(
            dt,
            archetype.speed,
            self.age,
            toward,
            distance,
            archetype.aggro_radius,
            &mut self.velocity,
        ) {
            self.apply_movement(dt, world);
        }
    }

    fn update_attacking(
        &mut self,
        previous_elapsed: f32,
        archetype: &Archetype,
        player: &mut dyn PlayerPort,
    ) {
        let strike_end = ATTACK_STRIKE_AT + ATTACK_STRIKE_WINDOW;
        let in_window = self.state_elapsed >= ATTACK_STRIKE_AT && previous_elapsed < strike_end;
        if in_window
            && !self.strike_landed
            && self.distance_to(&*player) < archetype.attack_range * ATTACK_REACH_FACTOR
        {
            self.strike_landed = true;
            player.take_damage(archetype.contact_damage, self.id);
        }

        if self.state_elapsed >= ATTACK_DURATION {
            self.attack_cooldown = archetype.attack_cooldown;
            self.enter(EnemyState::Chasing);
            self.behavior.cancel_charge();
        }
    }

    fn update_hurt(&mut self) {
        if self.state_elapsed < HURT_DURATION {
            return;
        }
        if self.integrity > 0 {
            self.enter(EnemyState::Chasing);
        } else {
            debug!("Enemy {} ({}) begins dissolving", self.id, self.archetype);
            self.enter(EnemyState::Dying);
        }
    }

    fn update_dying<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.state_elapsed >= DYING_DURATION {
            self.enter(EnemyState::Dissolved);
            self.velocity = Vec2::ZERO;
            return;
        }

        if self.state_elapsed >= DYING_FLASH_DURATION && rng.gen_bool(DISSOLVE_PARTICLE_CHANCE) {
            let max_life = 0.8;
            self.particles.push(Particle {
                position: self.position
                    + Vec2::new(
                        rng.gen_range(0.0..=self.size.x),
                        rng.gen_range(0.0..=self.size.y),
                    ),
                velocity: Vec2::new(rng.gen_range(-20.0..=20.0), -rng.gen_range(10.0..=40.0)),
                life: rng.gen_range(0.5..=max_life),
                max_life,
                decay_rate: 1.0,
                lift: PARTICLE_LIFT,
                size: rng.gen_range(1.0..=3.0),
            });
        }
    }

    /// Moves along the current velocity, sliding along blocked axes and
    /// reversing when boxed in on both.
    fn apply_movement(&mut self, dt: f32, world: &dyn WorldPort) {
        let target = self.position + self.velocity * dt;
        let (w, h) = (self.size.x, self.size.y);
        let can_move_x = world.is_walkable(target.x, self.position.y, w, h);
        let can_move_y = world.is_walkable(self.position.x, target.y, w, h);

        if can_move_x {
            self.position.x = target.x;
        }
        if can_move_y {
            self.position.y = target.y;
        }
        if !can_move_x && !can_move_y {
            self.velocity = -self.velocity;
        }
    }

    /// Rebinds the enemy to a different archetype id without touching its
    /// stats. Only used to exercise fault isolation.
    #[cfg(test)]
    pub(crate) fn corrupt_archetype(&mut self, id: &str) {
        self.archetype = ArchetypeId::new(id);
    }
}
