//! Feedback produced by the encounter for the host to present.

use crate::effects::{update_particles, DamageNumber, Particle, ScreenShake};
use crate::{ArchetypeId, EnemyId, Facing, ItemId, Rect, Resolution, Vec2};
use rand::Rng;

/// Why the whole population was removed at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    PlayerDied,
    LeftOutdoors,
}

/// Something that happened during a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// An accepted player swing
    SwingStarted { hitbox: Rect, facing: Facing },
    DamageDealt {
        enemy: EnemyId,
        amount: u32,
        position: Vec2,
    },
    /// Brief camera impact
    Impact { intensity: f32, duration: f32 },
    EnemySpawned {
        enemy: EnemyId,
        archetype: ArchetypeId,
        position: Vec2,
    },
    /// Removed for wandering past the despawn distance
    EnemyDespawned { enemy: EnemyId },
    /// Removed after its update failed
    EnemyFaulted { enemy: EnemyId, reason: String },
    /// The Resolve prompt became visible
    PromptShown {
        enemy: EnemyId,
        archetype: ArchetypeId,
    },
    /// The prompt was closed without a choice
    PromptDismissed { enemy: EnemyId },
    ResolutionCommitted(Resolution),
    LootDropped { item: ItemId, position: Vec2 },
    /// Cosmetic plume of a released creature
    Released { position: Vec2 },
    PopulationCleared { reason: ClearReason, removed: usize },
}

/// Events and decorative state accumulated by the encounter.
///
/// Events queue up until [`CombatFeedback::drain_events`]; the decorative
/// pieces age every frame in [`CombatFeedback::update`].
#[derive(Debug, Clone, Default)]
pub struct CombatFeedback {
    events: Vec<CombatEvent>,
    pub damage_numbers: Vec<DamageNumber>,
    /// Slash and release particles not owned by any enemy
    pub particles: Vec<Particle>,
    pub shake: ScreenShake,
}

impl CombatFeedback {
    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    /// Records an accepted hit and spawns its floating number.
    pub fn damage_dealt(&mut self, enemy: EnemyId, amount: u32, position: Vec2) {
        self.damage_numbers.push(DamageNumber::new(position, amount));
        self.emit(CombatEvent::DamageDealt {
            enemy,
            amount,
            position,
        });
    }

    /// Starts a screen impact.
    pub fn impact(&mut self, intensity: f32, duration: f32) {
        self.shake.trigger(intensity, duration);
        self.emit(CombatEvent::Impact {
            intensity,
            duration,
        });
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Takes every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ages numbers, particles, and the shake.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.damage_numbers.retain_mut(|n| n.update(dt));
        update_particles(&mut self.particles, dt);
        self.shake.update(dt, rng);
    }
}
