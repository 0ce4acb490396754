//! # Combat Module
//!
//! Melee hit resolution for the player's weapon.
//!
//! A swing is accepted only when the previous one has finished and the weapon
//! cooldown has run out. An accepted swing builds one hitbox in front of the
//! player, tests it against every live enemy in population order, and damages
//! each overlapping enemy once. Requests made while gated are dropped.

pub mod feedback;

pub use feedback::*;

use crate::effects::burst;
use crate::{
    ArchetypeCatalog, Enemy, EnemyId, Facing, PlayerPort, Rect, Vec2, WeaponDefinition, WorldPort,
};
use log::debug;
use rand::Rng;

/// Slash particles emitted per accepted swing
const SLASH_PARTICLE_COUNT: usize = 6;

/// Screen impact of an accepted hit: intensity in px, duration in seconds
const IMPACT: (f32, f32) = (2.0, 0.1);

/// Builds the hitbox of a swing.
///
/// The box extends `range` pixels beyond the attacker's box in the facing
/// direction and is widened by `sweep_width` across the facing axis, half on
/// each side.
///
/// # Examples
///
/// ```
/// use drift_encounter::{attack_hitbox, Facing, Rect};
///
/// let player = Rect::new(0.0, 0.0, 16.0, 16.0);
/// let hitbox = attack_hitbox(player, Facing::Right, 24.0, 10.0);
/// assert_eq!(hitbox, Rect::new(16.0, -5.0, 24.0, 26.0));
/// ```
pub fn attack_hitbox(attacker: Rect, facing: Facing, range: f32, sweep_width: f32) -> Rect {
    let half_sweep = sweep_width / 2.0;
    match facing {
        Facing::Right => Rect::new(
            attacker.right(),
            attacker.y - half_sweep,
            range,
            attacker.height + sweep_width,
        ),
        Facing::Left => Rect::new(
            attacker.x - range,
            attacker.y - half_sweep,
            range,
            attacker.height + sweep_width,
        ),
        Facing::Down => Rect::new(
            attacker.x - half_sweep,
            attacker.bottom(),
            attacker.width + sweep_width,
            range,
        ),
        Facing::Up => Rect::new(
            attacker.x - half_sweep,
            attacker.y - range,
            attacker.width + sweep_width,
            range,
        ),
    }
}

/// An accepted swing and what it connected with.
#[derive(Debug, Clone, PartialEq)]
pub struct Swing {
    pub hitbox: Rect,
    /// Enemies whose damage was accepted, in population order
    pub hits: Vec<EnemyId>,
}

/// Gates and resolves the player's weapon swings.
#[derive(Debug, Clone)]
pub struct AttackResolver {
    weapon: WeaponDefinition,
    sweep_width: f32,
    swing_duration: f32,
    /// Seconds until the next swing may be accepted
    cooldown: f32,
    /// Seconds left on the current swing
    swing_remaining: f32,
}

impl AttackResolver {
    pub fn new(weapon: WeaponDefinition, sweep_width: f32, swing_duration: f32) -> Self {
        Self {
            weapon,
            sweep_width,
            swing_duration,
            cooldown: 0.0,
            swing_remaining: 0.0,
        }
    }

    pub fn weapon(&self) -> &WeaponDefinition {
        &self.weapon
    }

    /// Swaps the equipped weapon. Timers are left running.
    pub fn equip(&mut self, weapon: WeaponDefinition) {
        debug!("Equipped {}", weapon.name);
        self.weapon = weapon;
    }

    /// Whether a swing animation is playing.
    pub fn is_swinging(&self) -> bool {
        self.swing_remaining > 0.0
    }

    /// Seconds until the weapon is ready again.
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown
    }

    /// Whether a swing requested now would be accepted.
    pub fn is_ready(&self) -> bool {
        !self.is_swinging() && self.cooldown <= 0.0
    }

    /// Counts the swing and cooldown timers down, saturating at zero.
    pub fn update(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.swing_remaining = (self.swing_remaining - dt).max(0.0);
    }

    /// Resolves a swing request.
    ///
    /// Returns `None` if the weapon is not ready. Otherwise every live enemy
    /// whose box overlaps the hitbox is struck once, with knockback pointing
    /// from the player's center to the enemy's center.
    pub fn try_attack<R: Rng + ?Sized>(
        &mut self,
        player: &dyn PlayerPort,
        enemies: &mut [Enemy],
        catalog: &ArchetypeCatalog,
        world: &dyn WorldPort,
        feedback: &mut CombatFeedback,
        rng: &mut R,
    ) -> Option<Swing> {
        if !self.is_ready() {
            return None;
        }

        self.cooldown = self.weapon.cooldown;
        self.swing_remaining = self.swing_duration;

        let facing = player.facing();
        let hitbox = attack_hitbox(player.bounds(), facing, self.weapon.range, self.sweep_width);
        let origin = player.center();

        feedback.emit(CombatEvent::SwingStarted { hitbox, facing });
        feedback.particles.extend(burst(
            rng,
            hitbox.center(),
            SLASH_PARTICLE_COUNT,
            4.0,
            (20.0, 60.0),
            (0.15, 0.25),
        ));

        let mut hits = Vec::new();
        for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
            if !hitbox.overlaps(&enemy.bounds()) {
                continue;
            }
            // Unknown archetypes are left for the enemy's own update to report.
            let Some(archetype) = catalog.get(enemy.archetype_id()) else {
                continue;
            };

            let knockback = (enemy.center() - origin).normalize_or_zero();
            if enemy.apply_damage(self.weapon.damage, knockback, archetype, world, rng) {
                let position = enemy.center();
                hits.push(enemy.id());
                feedback.damage_dealt(enemy.id(), self.weapon.damage, position);
            }
        }

        if !hits.is_empty() {
            let (intensity, duration) = IMPACT;
            feedback.impact(intensity, duration);
            debug!("Swing hit {} enem{}", hits.len(), if hits.len() == 1 { "y" } else { "ies" });
        }

        Some(Swing { hitbox, hits })
    }
}

impl Default for AttackResolver {
    fn default() -> Self {
        Self::new(WeaponDefinition::dock_wrench(), 10.0, 0.2)
    }
}
