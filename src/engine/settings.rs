//! Tunables of the encounter engine.

use crate::{AbandonPolicy, EncounterError, EncounterResult, WeaponDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the encounter engine.
///
/// Controls population pacing, spawn placement, swing geometry, the Resolve
/// prompt, and the rewards it grants. Missing fields in a JSON document take
/// their [`EncounterConfig::new`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Maximum size of the enemy population (0 disables spawning)
    pub max_enemies: usize,
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    /// Seconds after entering the world before anything spawns
    pub grace_period: f32,
    /// Seconds of no spawning after a player death
    pub spawn_protection: f32,
    /// Tries to find a group anchor per spawn attempt
    pub placement_attempts: u32,
    /// Tries that must also be off-screen before any land point is accepted
    pub offscreen_attempts: u32,
    /// Minimum spawn distance from the player
    pub spawn_min_distance: f32,
    /// Maximum spawn distance from the player
    pub spawn_max_distance: f32,
    /// Scatter of group members around the anchor, in px per axis
    pub group_jitter: f32,
    /// Distance past which a live enemy is culled
    pub despawn_distance: f32,
    /// Swing hitbox widening across the facing axis, in px
    pub sweep_width: f32,
    /// Seconds a swing animation plays
    pub swing_duration: f32,
    /// Equipped weapon
    pub weapon: WeaponDefinition,
    /// Seconds between a death and its Resolve prompt
    pub prompt_delay: f32,
    /// Seconds into Dying during which a death is picked up for resolution
    pub observe_window: f32,
    /// Continuity granted by Stabilize
    pub stabilize_progress: u32,
    /// Continuity granted by Release
    pub release_progress: u32,
    /// Scatter of Disperse drops around the creature, in px per axis
    pub loot_scatter: f32,
    /// Seconds before a dropped pickup vanishes
    pub pickup_expiry: f32,
    /// Seconds the in-combat flag lingers after the last nearby enemy
    pub combat_linger: f32,
    /// Handling of a prompt closed without a choice
    pub abandon_policy: AbandonPolicy,
    /// Random seed for reproducible encounters; entropy when absent
    pub seed: Option<u64>,
}

impl EncounterConfig {
    /// Creates the standard encounter configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use drift_encounter::EncounterConfig;
    ///
    /// let config = EncounterConfig::new();
    /// assert_eq!(config.max_enemies, 8);
    /// assert!(config.spawn_max_distance > config.spawn_min_distance);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            max_enemies: 8,
            spawn_interval: 3.0,
            grace_period: 5.0,
            spawn_protection: 10.0,
            placement_attempts: 20,
            offscreen_attempts: 12,
            spawn_min_distance: 110.0,
            spawn_max_distance: 320.0,
            group_jitter: 15.0,
            despawn_distance: 400.0,
            sweep_width: 10.0,
            swing_duration: 0.2,
            weapon: WeaponDefinition::dock_wrench(),
            prompt_delay: 0.3,
            observe_window: 0.05,
            stabilize_progress: 3,
            release_progress: 5,
            loot_scatter: 16.0,
            pickup_expiry: 60.0,
            combat_linger: 5.0,
            abandon_policy: AbandonPolicy::Forfeit,
            seed: None,
        }
    }

    /// Creates a configuration for testing: no grace period, a spawn attempt
    /// every frame, and a fixed seed.
    pub fn for_testing() -> Self {
        Self {
            spawn_interval: 0.0,
            grace_period: 0.0,
            seed: Some(12345),
            ..Self::new()
        }
    }

    /// Reads and validates a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> EncounterResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are consistent with each other.
    pub fn validate(&self) -> EncounterResult<()> {
        let fail = |reason: &str| Err(EncounterError::InvalidConfig(reason.to_string()));

        let durations = [
            self.spawn_interval,
            self.grace_period,
            self.spawn_protection,
            self.swing_duration,
            self.prompt_delay,
            self.pickup_expiry,
            self.combat_linger,
            self.weapon.cooldown,
        ];
        if durations.iter().any(|d| !(*d >= 0.0) || !d.is_finite()) {
            return fail("durations must be finite and non-negative");
        }
        if !(self.observe_window > 0.0) {
            return fail("observe window must be positive");
        }
        if !(self.spawn_min_distance >= 0.0) || self.spawn_max_distance <= self.spawn_min_distance {
            return fail("spawn distance range must satisfy 0 <= min < max");
        }
        if self.despawn_distance <= self.spawn_max_distance {
            return fail("despawn distance must exceed the maximum spawn distance");
        }
        if self.placement_attempts == 0 {
            return fail("placement attempts must be positive");
        }
        if !(self.group_jitter >= 0.0) || !(self.loot_scatter >= 0.0) || !(self.sweep_width >= 0.0) {
            return fail("jitter, scatter, and sweep width must be non-negative");
        }
        if !(self.weapon.range > 0.0) {
            return fail("weapon range must be positive");
        }
        Ok(())
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self::new()
    }
}
