//! Statistics persistence through the engine.

mod common;

use common::*;
use drift_encounter::sandbox::Sandbox;
use drift_encounter::{
    ArchetypeCatalog, ArchetypeId, CombatStatistics, EncounterEngine, EncounterResult,
    JsonFileStore, MemoryStore, ResolveChoice,
};

fn engine_with_store(sandbox: &Sandbox, store: JsonFileStore) -> EncounterResult<EncounterEngine> {
    let mut ports = sandbox.collaborators();
    ports.stats = Box::new(store);
    EncounterEngine::new(ArchetypeCatalog::standard(), one_hit_config(), ports)
}

#[test]
fn test_statistics_survive_engine_restart() -> EncounterResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("saves").join("combat_stats.json");

    let sandbox = Sandbox::new();
    let mut engine = engine_with_store(&sandbox, JsonFileStore::new(&path))?;
    kill_in_front(&mut engine, &sandbox, "loopling");
    run_until_prompt(&mut engine, 2.0);
    engine.commit_choice(ResolveChoice::Release).unwrap();
    assert!(path.exists());

    let saved: CombatStatistics = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(&saved, engine.stats());

    let sandbox = Sandbox::new();
    let restarted = engine_with_store(&sandbox, JsonFileStore::new(&path))?;
    assert_eq!(restarted.stats().total_kills, 1);
    assert_eq!(restarted.stats().kills_of(&ArchetypeId::new("loopling")), 1);
    assert_eq!(restarted.stats().choices.release, 1);
    Ok(())
}

#[test]
fn test_unreadable_statistics_start_fresh() -> EncounterResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("combat_stats.json");
    std::fs::write(&path, "{ not json")?;

    let sandbox = Sandbox::new();
    let mut engine = engine_with_store(&sandbox, JsonFileStore::new(&path))?;
    assert_eq!(engine.stats(), &CombatStatistics::default());

    // The next commit overwrites the damaged file.
    kill_in_front(&mut engine, &sandbox, "skitter");
    run_until_prompt(&mut engine, 2.0);
    engine.commit_choice(ResolveChoice::Disperse).unwrap();
    let saved: CombatStatistics = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(saved.total_kills, 1);
    Ok(())
}

#[test]
fn test_failing_store_does_not_block_rewards() {
    let mut sandbox = Sandbox::new();
    sandbox.store = MemoryStore::failing();
    let mut engine = engine_with(&sandbox, one_hit_config());

    kill_in_front(&mut engine, &sandbox, "skitter");
    run_until_prompt(&mut engine, 2.0);
    let resolution = engine.commit_choice(ResolveChoice::Stabilize).unwrap();

    assert_eq!(engine.stats().total_kills, 1);
    assert_eq!(sandbox.ledger.snapshot().currency, resolution.currency);
    assert!(sandbox.store.saved().is_none());
}

#[test]
fn test_sandbox_store_tracks_every_commit() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());

    for choice in ResolveChoice::ALL {
        kill_in_front(&mut engine, &sandbox, "skitter");
        run_until_prompt(&mut engine, 2.0);
        engine.commit_choice(choice).unwrap();
        run_for(&mut engine, 2.0);
    }

    let saved = sandbox.store.saved().unwrap();
    assert_eq!(saved.total_kills, 3);
    assert_eq!(saved.choices.total(), 3);
    assert_eq!(saved.kills_of(&ArchetypeId::new("skitter")), 3);
    assert_eq!(&saved, engine.stats());
}
