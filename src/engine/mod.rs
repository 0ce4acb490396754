//! # Engine Module
//!
//! The per-frame orchestrator of the encounter.
//!
//! Every frame runs the same fixed sequence:
//!
//! 1. sync the location context and detect player death
//! 2. if the Resolve prompt is open, advance only the prompt and stop
//! 3. advance the weapon timers
//! 4. resolve the latched attack request, if any
//! 5. update every enemy in population order, isolating faults
//! 6. remove dissolved enemies nobody is waiting on
//! 7. pick up new deaths and advance the Resolve protocol
//! 8. cull enemies past the despawn distance
//! 9. run the spawn interval
//! 10. age decorative effects and the in-combat flag
//!
//! Resolving the swing before enemies move means a killing blow lands before
//! the victim can act in the same frame.

pub mod settings;

pub use settings::*;

use crate::{
    ArchetypeCatalog, ArchetypeId, AttackResolver, ClearReason, Collaborators, CombatEvent,
    CombatFeedback, CombatStatistics, EncounterError, EncounterResolver, EncounterResult, Enemy,
    EnemyId, LocationContext, PendingOutcome, PromptInput, Resolution, ResolveChoice,
    ResolvePrompt, SpawnContext, SpawnDirector, Vec2,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Drives enemies, combat, spawning, and resolution frame by frame.
pub struct EncounterEngine {
    catalog: ArchetypeCatalog,
    config: EncounterConfig,
    ports: Collaborators,
    rng: StdRng,
    enemies: Vec<Enemy>,
    next_enemy_id: u64,
    attack: AttackResolver,
    attack_requested: bool,
    director: SpawnDirector,
    resolver: EncounterResolver,
    feedback: CombatFeedback,
    location: LocationContext,
    /// Location last reported by the player port
    reported_location: LocationContext,
    player_was_dead: bool,
    /// Seconds left on the in-combat flag
    combat_remaining: f32,
    frame: u64,
}

impl EncounterEngine {
    /// Builds an engine around validated data and its collaborators.
    ///
    /// Statistics are loaded from the store right away; a failed load starts
    /// from zero.
    pub fn new(
        catalog: ArchetypeCatalog,
        config: EncounterConfig,
        mut ports: Collaborators,
    ) -> EncounterResult<Self> {
        config.validate()?;
        catalog.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let resolver = EncounterResolver::load(ports.stats.as_mut());
        let location = ports.player.location();
        let player_was_dead = ports.player.is_dead();
        let attack = AttackResolver::new(
            config.weapon.clone(),
            config.sweep_width,
            config.swing_duration,
        );
        let director = SpawnDirector::new(&config);

        info!(
            "Encounter engine ready: {} archetypes, cap {}, seed {:?}",
            catalog.archetypes().count(),
            config.max_enemies,
            config.seed
        );

        Ok(Self {
            catalog,
            config,
            ports,
            rng,
            enemies: Vec::new(),
            next_enemy_id: 1,
            attack,
            attack_requested: false,
            director,
            resolver,
            feedback: CombatFeedback::default(),
            location,
            reported_location: location,
            player_was_dead,
            combat_remaining: 0.0,
            frame: 0,
        })
    }

    /// Advances the encounter by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if !dt.is_finite() {
            warn!("Ignoring frame with non-finite delta {}", dt);
            return;
        }
        let dt = dt.max(0.0);
        self.frame += 1;

        self.sync_player();

        if self.resolver.is_prompt_visible() {
            self.attack_requested = false;
            self.resolver.update_prompt(dt);
            return;
        }

        self.attack.update(dt);

        if std::mem::take(&mut self.attack_requested) && self.location.is_outdoor() {
            self.attack.try_attack(
                self.ports.player.as_ref(),
                &mut self.enemies,
                &self.catalog,
                self.ports.world.as_ref(),
                &mut self.feedback,
                &mut self.rng,
            );
        }

        self.update_enemies(dt);

        let resolver = &self.resolver;
        self.enemies
            .retain(|enemy| !enemy.is_removable() || resolver.is_tracked(enemy.id()));

        self.resolver.observe(&self.enemies, dt, &self.config);
        self.resolver
            .update(dt, &self.enemies, &self.config, &mut self.feedback);

        let player_center = self.ports.player.center();
        for enemy in self
            .director
            .despawn_distant(&mut self.enemies, player_center, &self.config)
        {
            debug!("Despawned {} (too far from player)", enemy);
            self.feedback.emit(CombatEvent::EnemyDespawned { enemy });
        }

        if self.director.update(dt, self.location, &self.config) {
            self.spawn();
        }

        self.feedback.update(dt, &mut self.rng);
        self.update_combat_flag(dt, player_center);
    }

    /// Latches a swing request for the next frame.
    ///
    /// Ignored while the Resolve prompt is open or away from the outdoors.
    /// Requests inside the weapon cooldown are dropped when the frame runs.
    pub fn request_attack(&mut self) {
        if self.resolver.is_prompt_visible() || !self.location.is_outdoor() {
            return;
        }
        self.attack_requested = true;
    }

    /// Clears the population and any pending outcome, and suppresses
    /// spawning for the protection window.
    ///
    /// A death reported here is not detected again from the player port.
    pub fn notify_player_died(&mut self) {
        self.player_was_dead = self.ports.player.is_dead();
        let removed = self.clear_population();
        self.director.start_protection(self.config.spawn_protection);
        info!(
            "Player died: cleared {} enemies, spawning paused for {:.1}s",
            removed, self.config.spawn_protection
        );
        self.feedback.emit(CombatEvent::PopulationCleared {
            reason: ClearReason::PlayerDied,
            removed,
        });
    }

    /// Tells the engine where the player is. Leaving the outdoors clears the
    /// population.
    pub fn set_location_context(&mut self, location: LocationContext) {
        if location == self.location {
            return;
        }
        self.location = location;
        if !location.is_outdoor() {
            let removed = self.clear_population();
            info!("Left the outdoors: cleared {} enemies", removed);
            self.feedback.emit(CombatEvent::PopulationCleared {
                reason: ClearReason::LeftOutdoors,
                removed,
            });
        }
    }

    /// Places one enemy with its box centered on `center`, bypassing the
    /// spawn director's pacing and placement rules. The population cap and
    /// the outdoor requirement still apply.
    pub fn spawn_enemy(
        &mut self,
        archetype: &ArchetypeId,
        center: Vec2,
    ) -> EncounterResult<EnemyId> {
        if !self.location.is_outdoor() {
            return Err(EncounterError::InvalidState(
                "enemies only spawn outdoors".to_string(),
            ));
        }
        if self.enemies.len() >= self.config.max_enemies {
            return Err(EncounterError::InvalidState(format!(
                "population cap of {} reached",
                self.config.max_enemies
            )));
        }
        let archetype = self.catalog.require(archetype)?;
        let half = archetype.size / 2.0;
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;

        let enemy = Enemy::spawn(id, archetype, center - Vec2::new(half, half), &mut self.rng);
        debug!("Scripted spawn of {} as {}", archetype.id, id);
        self.feedback.emit(CombatEvent::EnemySpawned {
            enemy: id,
            archetype: archetype.id.clone(),
            position: enemy.position(),
        });
        self.enemies.push(enemy);
        Ok(id)
    }

    /// Number of enemies that are not dying or dissolved.
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn pending_outcome(&self) -> Option<&PendingOutcome> {
        self.resolver.pending()
    }

    /// Commits a Resolve choice for the open prompt.
    pub fn commit_choice(&mut self, choice: ResolveChoice) -> Option<Resolution> {
        let mut sinks = self.ports.reward_sinks();
        self.resolver.commit(
            choice,
            &self.catalog,
            &self.config,
            &mut sinks,
            &mut self.feedback,
            &mut self.rng,
        )
    }

    /// Routes navigation, confirm, or dismiss input to the open prompt.
    pub fn handle_prompt_input(&mut self, input: PromptInput) -> Option<Resolution> {
        let mut sinks = self.ports.reward_sinks();
        self.resolver.handle_input(
            input,
            &self.catalog,
            &self.config,
            &mut sinks,
            &mut self.feedback,
            &mut self.rng,
        )
    }

    /// Whether the encounter is suspended behind the Resolve prompt.
    pub fn is_suspended(&self) -> bool {
        self.resolver.is_prompt_visible()
    }

    pub fn prompt(&self) -> Option<&ResolvePrompt> {
        self.resolver.prompt()
    }

    /// Whether an enemy was recently close enough to notice the player.
    pub fn in_combat(&self) -> bool {
        self.combat_remaining > 0.0
    }

    /// Takes every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.feedback.drain_events()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn stats(&self) -> &CombatStatistics {
        self.resolver.stats()
    }

    pub fn catalog(&self) -> &ArchetypeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn feedback(&self) -> &CombatFeedback {
        &self.feedback
    }

    pub fn attack_resolver(&self) -> &AttackResolver {
        &self.attack
    }

    pub fn location(&self) -> LocationContext {
        self.location
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn sync_player(&mut self) {
        let reported = self.ports.player.location();
        if reported != self.reported_location {
            self.reported_location = reported;
            self.set_location_context(reported);
        }

        let dead = self.ports.player.is_dead();
        if dead && !self.player_was_dead {
            self.notify_player_died();
        }
        self.player_was_dead = dead;
    }

    fn update_enemies(&mut self, dt: f32) {
        let mut faulted = Vec::new();
        for enemy in &mut self.enemies {
            if let Err(e) = enemy.update(
                dt,
                &self.catalog,
                self.ports.player.as_mut(),
                self.ports.world.as_ref(),
                &mut self.rng,
            ) {
                faulted.push((enemy.id(), e.to_string()));
            }
        }

        for (enemy, reason) in faulted {
            warn!("Removing enemy {} after fault: {}", enemy, reason);
            self.enemies.retain(|e| e.id() != enemy);
            self.resolver.forget(enemy, &self.config);
            self.feedback
                .emit(CombatEvent::EnemyFaulted { enemy, reason });
        }
    }

    fn spawn(&mut self) {
        let ctx = SpawnContext {
            catalog: &self.catalog,
            config: &self.config,
            player: self.ports.player.as_ref(),
            world: self.ports.world.as_ref(),
            camera: self.ports.camera.as_ref(),
        };
        let group = self.director.spawn_group(
            &ctx,
            self.enemies.len(),
            &mut self.next_enemy_id,
            &mut self.rng,
        );

        for enemy in &group {
            self.feedback.emit(CombatEvent::EnemySpawned {
                enemy: enemy.id(),
                archetype: enemy.archetype_id().clone(),
                position: enemy.position(),
            });
        }
        self.enemies.extend(group);
    }

    fn update_combat_flag(&mut self, dt: f32, player_center: Vec2) {
        let catalog = &self.catalog;
        let threatened = self.enemies.iter().filter(|e| e.is_alive()).any(|e| {
            catalog
                .get(e.archetype_id())
                .is_some_and(|a| e.center().distance(player_center) < a.aggro_radius)
        });

        if threatened {
            self.combat_remaining = self.config.combat_linger;
        } else {
            self.combat_remaining = (self.combat_remaining - dt).max(0.0);
        }
    }

    fn clear_population(&mut self) -> usize {
        let removed = self.enemies.len();
        self.enemies.clear();
        self.resolver.reset();
        self.attack_requested = false;
        self.combat_remaining = 0.0;
        removed
    }

    /// Inserts an enemy directly, bypassing the spawn director.
    #[cfg(test)]
    pub(crate) fn insert_enemy(&mut self, enemy: Enemy) {
        self.next_enemy_id = self.next_enemy_id.max(enemy.id().0 + 1);
        self.enemies.push(enemy);
    }

    #[cfg(test)]
    pub(crate) fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use crate::{standard, EnemyState, PlayerPort};

    const FRAME: f32 = 1.0 / 60.0;

    fn quiet_config() -> EncounterConfig {
        EncounterConfig {
            max_enemies: 0,
            ..EncounterConfig::for_testing()
        }
    }

    fn engine(sandbox: &Sandbox, config: EncounterConfig) -> EncounterEngine {
        EncounterEngine::new(ArchetypeCatalog::standard(), config, sandbox.collaborators()).unwrap()
    }

    fn enemy_near_player(sandbox: &Sandbox, id: u64, offset: Vec2) -> Enemy {
        let archetype = standard::haze_drifter();
        let center = sandbox.player.center() + offset;
        let half = archetype.size / 2.0;
        let mut rng = StdRng::seed_from_u64(id);
        Enemy::spawn(EnemyId(id), &archetype, center - Vec2::new(half, half), &mut rng)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let sandbox = Sandbox::new();
        let mut config = EncounterConfig::new();
        config.despawn_distance = 10.0;
        let result = EncounterEngine::new(
            ArchetypeCatalog::standard(),
            config,
            sandbox.collaborators(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_faulted_enemy_removed_others_continue() {
        let sandbox = Sandbox::new();
        let mut engine = engine(&sandbox, quiet_config());
        engine.insert_enemy(enemy_near_player(&sandbox, 1, Vec2::new(100.0, 0.0)));
        engine.insert_enemy(enemy_near_player(&sandbox, 2, Vec2::new(-100.0, 0.0)));
        engine.enemies_mut()[0].corrupt_archetype("kraken");

        engine.update(FRAME);
        let ids: Vec<_> = engine.enemies().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![EnemyId(2)]);
        assert!(engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, CombatEvent::EnemyFaulted { enemy: EnemyId(1), .. })));
    }

    #[test]
    fn test_killing_blow_lands_before_enemy_acts() {
        let sandbox = Sandbox::new();
        let mut engine = engine(&sandbox, quiet_config());
        let mut victim = enemy_near_player(&sandbox, 1, Vec2::new(0.0, 20.0));
        let archetype = standard::haze_drifter();
        // Leave exactly one wrench hit of integrity.
        let mut rng = StdRng::seed_from_u64(0);
        let world = crate::sandbox::OpenField::new();
        victim.apply_damage(15, Vec2::ZERO, &archetype, &world, &mut rng);
        engine.insert_enemy(victim);
        for _ in 0..15 {
            engine.update(FRAME);
        }
        assert_eq!(engine.enemies()[0].integrity(), 10);

        engine.request_attack();
        engine.update(FRAME);
        let victim = &engine.enemies()[0];
        assert_eq!(victim.integrity(), 0);
        assert_eq!(victim.state(), EnemyState::Hurt);
    }

    #[test]
    fn test_scripted_spawn_respects_cap() {
        let sandbox = Sandbox::new();
        let mut config = quiet_config();
        config.max_enemies = 1;
        config.grace_period = 1000.0;
        let mut engine = engine(&sandbox, config);

        let skitter = ArchetypeId::new("skitter");
        let id = engine.spawn_enemy(&skitter, Vec2::new(50.0, 0.0)).unwrap();
        assert_eq!(engine.enemies()[0].id(), id);
        assert_eq!(engine.enemies()[0].center(), Vec2::new(50.0, 0.0));
        assert!(matches!(
            engine.spawn_enemy(&skitter, Vec2::ZERO),
            Err(EncounterError::InvalidState(_))
        ));

        engine.enemies_mut().clear();
        engine.set_location_context(LocationContext::Indoor);
        assert!(matches!(
            engine.spawn_enemy(&skitter, Vec2::ZERO),
            Err(EncounterError::InvalidState(_))
        ));
        assert!(engine.enemies().is_empty());
    }

    #[test]
    fn test_scripted_spawn_unknown_archetype() {
        let sandbox = Sandbox::new();
        let mut config = quiet_config();
        config.max_enemies = 4;
        config.grace_period = 1000.0;
        let mut engine = engine(&sandbox, config);
        assert!(matches!(
            engine.spawn_enemy(&ArchetypeId::new("kraken"), Vec2::ZERO),
            Err(EncounterError::UnknownArchetype(_))
        ));
    }

    #[test]
    fn test_request_attack_ignored_indoors() {
        let sandbox = Sandbox::new();
        let mut engine = engine(&sandbox, quiet_config());
        engine.set_location_context(LocationContext::Indoor);
        engine.request_attack();
        assert!(!engine.attack_requested);
    }

    #[test]
    fn test_player_death_edge_clears_once() {
        let sandbox = Sandbox::new();
        let mut engine = engine(&sandbox, quiet_config());
        engine.insert_enemy(enemy_near_player(&sandbox, 1, Vec2::new(100.0, 0.0)));

        sandbox.player.borrow_mut().set_dead(true);
        engine.update(FRAME);
        engine.update(FRAME);
        assert!(engine.enemies().is_empty());

        let clears = engine
            .drain_events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    CombatEvent::PopulationCleared {
                        reason: ClearReason::PlayerDied,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(clears, 1);
    }

    #[test]
    fn test_notified_death_is_not_detected_again() {
        let sandbox = Sandbox::new();
        let mut engine = engine(&sandbox, quiet_config());
        engine.insert_enemy(enemy_near_player(&sandbox, 1, Vec2::new(100.0, 0.0)));

        sandbox.player.borrow_mut().set_dead(true);
        engine.notify_player_died();
        let protection = engine.director.protection_remaining();
        engine.update(FRAME);
        engine.update(FRAME);

        let clears = engine
            .drain_events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    CombatEvent::PopulationCleared {
                        reason: ClearReason::PlayerDied,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(clears, 1);
        assert!(engine.director.protection_remaining() < protection);

        // A later death is still picked up from the port.
        sandbox.player.borrow_mut().set_dead(false);
        engine.update(FRAME);
        sandbox.player.borrow_mut().set_dead(true);
        engine.update(FRAME);
        let clears = engine
            .drain_events()
            .iter()
            .filter(|e| matches!(e, CombatEvent::PopulationCleared { .. }))
            .count();
        assert_eq!(clears, 1);
    }

    #[test]
    fn test_in_combat_lingers() {
        let sandbox = Sandbox::new();
        let mut engine = engine(&sandbox, quiet_config());
        engine.insert_enemy(enemy_near_player(&sandbox, 1, Vec2::new(40.0, 0.0)));
        engine.update(FRAME);
        assert!(engine.in_combat());

        engine.enemies_mut().clear();
        engine.update(1.0);
        assert!(engine.in_combat());
        for _ in 0..5 {
            engine.update(1.0);
        }
        assert!(!engine.in_combat());
    }
}
