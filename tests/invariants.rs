//! Property tests for the enemy lifecycle and the population cap.

mod common;

use common::*;
use drift_encounter::sandbox::{OpenField, Sandbox, ScriptedPlayer};
use drift_encounter::{
    standard, ArchetypeCatalog, EncounterConfig, Enemy, EnemyId, EnemyState, ResolveChoice, Vec2,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
enum Op {
    Hit(u32, f32),
    Step(f32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..40, -1.0f32..1.0).prop_map(|(amount, dir)| Op::Hit(amount, dir)),
        (0.0f32..0.1).prop_map(Op::Step),
    ]
}

proptest! {
    #[test]
    fn prop_enemy_lifecycle_holds(
        which in 0usize..3,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let archetype = vec![standard::skitter(), standard::haze_drifter(), standard::loopling()]
            .swap_remove(which);
        let catalog = ArchetypeCatalog::standard();
        let world = OpenField::new();
        let mut player = ScriptedPlayer::centered_at(Vec2::new(30.0, 0.0));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut enemy = Enemy::spawn(EnemyId(1), &archetype, Vec2::ZERO, &mut rng);
        let mut was_dying = false;
        let mut was_dissolved = false;

        for op in ops {
            let before_state = enemy.state();
            let before_integrity = enemy.integrity();
            match op {
                Op::Hit(amount, dir) => {
                    let applied = enemy.apply_damage(
                        amount,
                        Vec2::new(dir, 1.0 - dir.abs()),
                        &archetype,
                        &world,
                        &mut rng,
                    );
                    if before_state.is_invulnerable() {
                        prop_assert!(!applied);
                        prop_assert_eq!(enemy.integrity(), before_integrity);
                        prop_assert_eq!(enemy.state(), before_state);
                    } else {
                        prop_assert!(applied);
                        prop_assert_eq!(enemy.integrity(), before_integrity.saturating_sub(amount));
                        prop_assert_eq!(enemy.state(), EnemyState::Hurt);
                    }
                }
                Op::Step(dt) => {
                    enemy.update(dt, &catalog, &mut player, &world, &mut rng).unwrap();
                }
            }

            prop_assert!(enemy.integrity() <= archetype.max_integrity);
            prop_assert!(enemy.position().is_finite());

            let state = enemy.state();
            if was_dying {
                prop_assert!(matches!(state, EnemyState::Dying | EnemyState::Dissolved));
            }
            if was_dissolved {
                prop_assert_eq!(state, EnemyState::Dissolved);
            }
            if matches!(state, EnemyState::Dying | EnemyState::Dissolved) {
                prop_assert_eq!(enemy.integrity(), 0);
                was_dying = true;
            }
            was_dissolved |= state == EnemyState::Dissolved;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_population_never_exceeds_cap(
        cap in 1usize..7,
        seed in any::<u64>(),
        swing_every in 5usize..40,
    ) {
        let sandbox = Sandbox::new();
        let config = EncounterConfig {
            max_enemies: cap,
            seed: Some(seed),
            ..EncounterConfig::for_testing()
        };
        let mut engine = engine_with(&sandbox, config);

        for frame in 0..400 {
            if engine.is_suspended() {
                engine.commit_choice(ResolveChoice::ALL[frame % 3]);
            }
            if frame % swing_every == 0 {
                engine.request_attack();
            }
            engine.update(FRAME);
            prop_assert!(engine.enemies().len() <= cap);
        }
    }
}
