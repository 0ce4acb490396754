//! Shared helpers for the integration tests.

#![allow(dead_code)]

use drift_encounter::sandbox::Sandbox;
use drift_encounter::{
    ArchetypeCatalog, ArchetypeId, EncounterConfig, EncounterEngine, EnemyId, Facing, PlayerPort,
    Vec2,
};

pub const FRAME: f32 = 1.0 / 60.0;

/// Testing configuration with the spawn director held back, so only
/// scripted enemies appear.
pub fn quiet_config() -> EncounterConfig {
    EncounterConfig {
        grace_period: 1.0e6,
        ..EncounterConfig::for_testing()
    }
}

/// Quiet configuration whose weapon kills anything in one hit.
pub fn one_hit_config() -> EncounterConfig {
    let mut config = quiet_config();
    config.weapon.damage = 1000;
    config
}

pub fn engine_with(sandbox: &Sandbox, config: EncounterConfig) -> EncounterEngine {
    EncounterEngine::new(ArchetypeCatalog::standard(), config, sandbox.collaborators())
        .expect("engine should build")
}

pub fn run_frames(engine: &mut EncounterEngine, frames: usize) {
    for _ in 0..frames {
        engine.update(FRAME);
    }
}

pub fn run_for(engine: &mut EncounterEngine, seconds: f32) {
    run_frames(engine, (seconds / FRAME).ceil() as usize);
}

/// Steps until the Resolve prompt opens, failing after `limit` seconds.
pub fn run_until_prompt(engine: &mut EncounterEngine, limit: f32) {
    let frames = (limit / FRAME).ceil() as usize;
    for _ in 0..frames {
        if engine.is_suspended() {
            return;
        }
        engine.update(FRAME);
    }
    assert!(engine.is_suspended(), "prompt did not open within {}s", limit);
}

/// Spawns an enemy `offset` away from the player's center.
pub fn spawn_near_player(
    engine: &mut EncounterEngine,
    sandbox: &Sandbox,
    archetype: &str,
    offset: Vec2,
) -> EnemyId {
    let center = sandbox.player.center() + offset;
    engine
        .spawn_enemy(&ArchetypeId::new(archetype), center)
        .expect("scripted spawn should succeed")
}

/// Spawns an enemy right in front of a player facing right and swings once.
pub fn kill_in_front(engine: &mut EncounterEngine, sandbox: &Sandbox, archetype: &str) -> EnemyId {
    sandbox.player.borrow_mut().set_facing(Facing::Right);
    let id = spawn_near_player(engine, sandbox, archetype, Vec2::new(20.0, 0.0));
    engine.request_attack();
    engine.update(FRAME);
    id
}
