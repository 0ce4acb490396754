//! Frame-level behavior of the engine: modal suspension, the deferred-death
//! queue, abandon policies, and population clearing.

mod common;

use common::*;
use drift_encounter::sandbox::Sandbox;
use drift_encounter::{
    AbandonPolicy, ClearReason, CombatEvent, EncounterConfig, EnemyState, Facing, LocationContext,
    PromptInput, ResolveChoice, Vec2,
};

fn swings(events: &[CombatEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CombatEvent::SwingStarted { .. }))
        .count()
}

#[test]
fn test_open_prompt_freezes_the_encounter() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());
    let bystander = spawn_near_player(&mut engine, &sandbox, "haze_drifter", Vec2::new(0.0, -40.0));
    kill_in_front(&mut engine, &sandbox, "skitter");

    run_until_prompt(&mut engine, 2.0);
    engine.drain_events();

    let snapshot: Vec<_> = engine
        .enemies()
        .iter()
        .map(|e| (e.id(), e.position(), e.state(), e.state_elapsed()))
        .collect();
    let damage_before = sandbox.player.borrow().damage_taken();

    for _ in 0..30 {
        engine.request_attack();
        engine.update(FRAME);
    }

    let after: Vec<_> = engine
        .enemies()
        .iter()
        .map(|e| (e.id(), e.position(), e.state(), e.state_elapsed()))
        .collect();
    assert_eq!(snapshot, after);
    assert_eq!(swings(&engine.drain_events()), 0);
    assert_eq!(sandbox.player.borrow().damage_taken(), damage_before);
    assert!(engine.enemies().iter().any(|e| e.id() == bystander));

    let fade = engine.prompt().map(|p| p.fade()).unwrap();
    assert!(fade > 0.0);

    engine.commit_choice(ResolveChoice::Disperse).unwrap();
    assert!(!engine.is_suspended());
}

#[test]
fn test_deaths_in_one_swing_resolve_in_order() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());
    sandbox.player.borrow_mut().set_facing(Facing::Right);
    let first = spawn_near_player(&mut engine, &sandbox, "skitter", Vec2::new(20.0, -4.0));
    let second = spawn_near_player(&mut engine, &sandbox, "skitter", Vec2::new(20.0, 4.0));
    engine.request_attack();
    engine.update(FRAME);
    assert!(engine.enemies().iter().all(|e| e.integrity() == 0));

    run_until_prompt(&mut engine, 2.0);
    assert_eq!(engine.pending_outcome().map(|p| p.enemy), Some(first));
    let resolution = engine.commit_choice(ResolveChoice::Disperse).unwrap();
    assert_eq!(resolution.enemy, first);

    // The second death was held back and gets its own prompt.
    assert_eq!(engine.pending_outcome().map(|p| p.enemy), Some(second));
    assert!(engine.enemies().iter().any(|e| e.id() == second));
    run_until_prompt(&mut engine, 2.0);
    let resolution = engine.commit_choice(ResolveChoice::Release).unwrap();
    assert_eq!(resolution.enemy, second);

    let ledger = sandbox.ledger.snapshot();
    assert_eq!(
        ledger.choices,
        vec![ResolveChoice::Disperse, ResolveChoice::Release]
    );
    assert_eq!(engine.stats().total_kills, 2);

    run_for(&mut engine, 2.0);
    assert!(engine.enemies().is_empty());
    assert!(engine.pending_outcome().is_none());
}

#[test]
fn test_commit_outside_prompt_is_ignored() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());
    kill_in_front(&mut engine, &sandbox, "skitter");

    // Dying, but the prompt has not opened yet.
    run_for(&mut engine, 0.22);
    assert!(engine.pending_outcome().is_some());
    assert!(engine.commit_choice(ResolveChoice::Release).is_none());
    assert_eq!(engine.stats().total_kills, 0);

    run_until_prompt(&mut engine, 2.0);
    assert!(engine.commit_choice(ResolveChoice::Release).is_some());
    assert!(engine.commit_choice(ResolveChoice::Release).is_none());
    assert_eq!(engine.stats().total_kills, 1);
}

#[test]
fn test_dismiss_forfeits_by_default() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());
    let victim = kill_in_front(&mut engine, &sandbox, "skitter");
    run_until_prompt(&mut engine, 2.0);
    engine.drain_events();

    assert!(engine.handle_prompt_input(PromptInput::Dismiss).is_none());
    assert!(!engine.is_suspended());
    assert!(engine
        .drain_events()
        .iter()
        .any(|e| matches!(e, CombatEvent::PromptDismissed { enemy } if *enemy == victim)));

    run_for(&mut engine, 2.0);
    assert!(engine.pending_outcome().is_none());
    assert!(engine.enemies().is_empty());
    assert_eq!(engine.stats().total_kills, 0);
    assert_eq!(sandbox.ledger.snapshot().currency, 0);
}

#[test]
fn test_dismiss_can_auto_disperse() {
    let sandbox = Sandbox::new();
    let config = EncounterConfig {
        abandon_policy: AbandonPolicy::AutoDisperse,
        ..one_hit_config()
    };
    let mut engine = engine_with(&sandbox, config);
    kill_in_front(&mut engine, &sandbox, "skitter");
    run_until_prompt(&mut engine, 2.0);

    let resolution = engine.handle_prompt_input(PromptInput::Dismiss).unwrap();
    assert_eq!(resolution.choice, ResolveChoice::Disperse);
    assert!(resolution.currency >= 1);
    assert_eq!(engine.stats().choices.disperse, 1);
    assert_eq!(sandbox.ledger.snapshot().currency, resolution.currency);
}

#[test]
fn test_prompt_navigation_wraps() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());
    kill_in_front(&mut engine, &sandbox, "skitter");
    run_until_prompt(&mut engine, 2.0);

    assert_eq!(engine.prompt().unwrap().selected(), ResolveChoice::Disperse);
    assert!(engine.handle_prompt_input(PromptInput::Previous).is_none());
    assert_eq!(engine.prompt().unwrap().selected(), ResolveChoice::Release);
    assert!(engine.handle_prompt_input(PromptInput::Next).is_none());
    assert!(engine.handle_prompt_input(PromptInput::Next).is_none());
    assert_eq!(engine.prompt().unwrap().selected(), ResolveChoice::Stabilize);

    let resolution = engine.handle_prompt_input(PromptInput::Confirm).unwrap();
    assert_eq!(resolution.choice, ResolveChoice::Stabilize);
    assert!(resolution.lore.is_some());
}

#[test]
fn test_leaving_outdoors_clears_and_pauses_spawning() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, EncounterConfig::for_testing());
    for _ in 0..30 {
        engine.update(FRAME);
        if !engine.enemies().is_empty() {
            break;
        }
    }
    let spawned = engine.enemies().len();
    assert!(spawned > 0);
    engine.drain_events();

    sandbox
        .player
        .borrow_mut()
        .set_location(LocationContext::Indoor);
    engine.update(FRAME);
    assert!(engine.enemies().is_empty());
    assert_eq!(engine.location(), LocationContext::Indoor);
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        CombatEvent::PopulationCleared { reason: ClearReason::LeftOutdoors, removed } if *removed == spawned
    )));

    for _ in 0..60 {
        engine.request_attack();
        engine.update(FRAME);
    }
    assert!(engine.enemies().is_empty());
    assert_eq!(swings(&engine.drain_events()), 0);

    sandbox
        .player
        .borrow_mut()
        .set_location(LocationContext::Outdoor);
    run_frames(&mut engine, 60);
    assert!(!engine.enemies().is_empty());
}

#[test]
fn test_player_death_clears_and_protects() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, EncounterConfig::for_testing());
    for _ in 0..30 {
        engine.update(FRAME);
        if !engine.enemies().is_empty() {
            break;
        }
    }
    assert!(!engine.enemies().is_empty());
    engine.drain_events();

    sandbox.player.borrow_mut().set_dead(true);
    engine.update(FRAME);
    assert!(engine.enemies().is_empty());
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        CombatEvent::PopulationCleared { reason: ClearReason::PlayerDied, .. }
    )));

    sandbox.player.borrow_mut().set_dead(false);
    run_for(&mut engine, 9.0);
    assert!(engine.enemies().is_empty());

    run_for(&mut engine, 2.0);
    assert!(!engine.enemies().is_empty());
}

#[test]
fn test_population_stays_under_cap() {
    let sandbox = Sandbox::new();
    let config = EncounterConfig {
        max_enemies: 5,
        ..EncounterConfig::for_testing()
    };
    let mut engine = engine_with(&sandbox, config);

    for frame in 0..900 {
        if engine.is_suspended() {
            engine.commit_choice(ResolveChoice::Disperse);
        }
        if frame % 15 == 0 {
            engine.request_attack();
        }
        engine.update(FRAME);
        assert!(engine.enemies().len() <= 5);
    }
}

#[test]
fn test_dying_enemies_leave_after_resolution() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, one_hit_config());
    let victim = kill_in_front(&mut engine, &sandbox, "skitter");
    run_until_prompt(&mut engine, 2.0);
    engine.commit_choice(ResolveChoice::Disperse).unwrap();

    let enemy = engine.enemies().iter().find(|e| e.id() == victim).unwrap();
    assert_eq!(enemy.state(), EnemyState::Dying);

    run_for(&mut engine, 3.0);
    assert!(engine.enemies().iter().all(|e| e.id() != victim));
}

#[test]
fn test_non_finite_delta_is_skipped() {
    let sandbox = Sandbox::new();
    let mut engine = engine_with(&sandbox, quiet_config());
    engine.update(f32::NAN);
    engine.update(f32::INFINITY);
    assert_eq!(engine.frame(), 0);
    engine.update(FRAME);
    assert_eq!(engine.frame(), 1);
}
