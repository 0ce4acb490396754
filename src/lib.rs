//! # Drift Encounter
//!
//! The real-time encounter engine for Drift Fauna: the hostile creatures that
//! roam the outdoor islands, chase and bite the player, and dissolve into a
//! Resolve choice when their shell integrity runs out.
//!
//! ## Architecture Overview
//!
//! The engine is a frame-stepped, single-threaded simulation. Every frame the
//! [`EncounterEngine`] advances its timers, resolves at most one queued player
//! swing, steps each enemy's state machine, culls enemies that wandered too
//! far, and tops the population back up. The pieces are:
//!
//! - **Catalog**: immutable archetype, spawn-table and weapon definitions
//! - **Enemy**: one state machine per live creature
//! - **Combat**: hitbox construction and melee hit resolution
//! - **Spawn**: population management under a cap
//! - **Resolution**: the modal Disperse / Stabilize / Release prompt and the
//!   rewards it commits
//! - **Engine**: the per-frame orchestrator and its configuration
//!
//! Everything outside the encounter (terrain, the player avatar, economy,
//! quests, persistence) is reached through the narrow traits in [`ports`], so
//! the whole engine can be driven with the in-memory stand-ins from
//! [`sandbox`].

pub mod catalog;
pub mod effects;
pub mod combat;
pub mod enemy;
pub mod engine;
pub mod geometry;
pub mod ports;
pub mod resolution;
pub mod sandbox;
pub mod spawn;

// Core module re-exports
pub use catalog::*;
pub use effects::*;
pub use combat::*;
pub use enemy::*;
pub use engine::*;
pub use geometry::*;
pub use ports::*;
pub use resolution::*;
pub use spawn::*;

/// Core error type for the encounter engine.
#[derive(thiserror::Error, Debug)]
pub enum EncounterError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// An enemy or spawn table refers to an archetype the catalog lacks
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(ArchetypeId),

    /// Catalog data failed validation
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Engine configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single enemy could not be updated
    #[error("Enemy {enemy} faulted: {reason}")]
    EntityFault { enemy: EnemyId, reason: String },

    /// Engine state is inconsistent
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the encounter engine.
pub type EncounterResult<T> = Result<T, EncounterError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed timing and tuning constants of the enemy state machine.
///
/// These are not exposed through [`EncounterConfig`]: they define the feel of
/// the creatures rather than the pacing of the encounter.
pub mod config {
    /// Length of the hurt flash, in seconds
    pub const HURT_DURATION: f32 = 0.2;

    /// Total length of the death sequence, in seconds
    pub const DYING_DURATION: f32 = 0.6;

    /// Portion of the death sequence spent flashing before the fade begins
    pub const DYING_FLASH_DURATION: f32 = 0.4;

    /// Chance per frame of emitting a dissolve particle during the fade
    pub const DISSOLVE_PARTICLE_CHANCE: f64 = 0.3;

    /// Length of an enemy attack animation, in seconds
    pub const ATTACK_DURATION: f32 = 0.4;

    /// Point in the attack animation where the bite lands
    pub const ATTACK_STRIKE_AT: f32 = 0.2;

    /// Width of the window in which the bite can land
    pub const ATTACK_STRIKE_WINDOW: f32 = 0.05;

    /// Attack range multiplier applied when checking whether the bite connects
    pub const ATTACK_REACH_FACTOR: f32 = 1.5;

    /// Number of white particles burst out of an enemy on an accepted hit
    pub const HIT_PARTICLE_COUNT: usize = 4;

    /// Upward acceleration applied to enemy particles, in px/s²
    pub const PARTICLE_LIFT: f32 = 20.0;
}
