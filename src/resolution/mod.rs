//! # Resolution Module
//!
//! The Resolve protocol that turns a kill into a player choice.
//!
//! When an enemy starts dying it becomes the pending outcome, unless another
//! one is already pending, in which case it waits in line. After a short
//! delay the prompt opens and the encounter goes modal until the player picks
//! Disperse, Stabilize, or Release. Committing a choice awards tokens,
//! notifies the quest log, updates the statistics, and frees the slot for the
//! next death in line.

pub mod stats;

pub use stats::*;

use crate::effects::release_plume;
use crate::{
    ArchetypeCatalog, ArchetypeId, CombatEvent, CombatFeedback, EncounterConfig, EncounterError,
    Enemy, EnemyId, EnemyState, ItemId, RewardSinks, StatsStore, Vec2,
};
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Progression reason tag of a Stabilize reward
pub const STABILIZE_REASON: &str = "stabilize_fauna";

/// Progression reason tag of a Release reward
pub const RELEASE_REASON: &str = "release_fauna";

/// Prompt fade-in progress per second
const PROMPT_FADE_RATE: f32 = 4.0;

const STABILIZE_LORE: &[&str] = &[
    "The shell stops trembling. Somewhere below, the drift loosens its grip.",
    "It settles into the sand like it always belonged there.",
    "A low hum fades into the surf, and the water goes still.",
    "For a moment you can hear the tide counting backwards.",
];

/// The three ways to resolve a kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveChoice {
    /// Break the creature apart for loot
    Disperse,
    /// Calm it; small Continuity reward
    Stabilize,
    /// Let it go; larger Continuity reward
    Release,
}

impl ResolveChoice {
    /// Prompt order.
    pub const ALL: [ResolveChoice; 3] = [
        ResolveChoice::Disperse,
        ResolveChoice::Stabilize,
        ResolveChoice::Release,
    ];

    /// Share of the archetype's base tokens awarded for this choice.
    pub fn currency_multiplier(self) -> f32 {
        match self {
            ResolveChoice::Disperse => 1.0,
            ResolveChoice::Stabilize => 0.5,
            ResolveChoice::Release => 0.25,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResolveChoice::Disperse => "disperse",
            ResolveChoice::Stabilize => "stabilize",
            ResolveChoice::Release => "release",
        }
    }

    fn index(self) -> usize {
        match self {
            ResolveChoice::Disperse => 0,
            ResolveChoice::Stabilize => 1,
            ResolveChoice::Release => 2,
        }
    }
}

impl fmt::Display for ResolveChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveChoice {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disperse" => Ok(ResolveChoice::Disperse),
            "stabilize" => Ok(ResolveChoice::Stabilize),
            "release" => Ok(ResolveChoice::Release),
            other => Err(EncounterError::InvalidConfig(format!(
                "unknown resolve choice '{}'",
                other
            ))),
        }
    }
}

/// What happens when the prompt is closed without a choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonPolicy {
    /// Close the prompt and give nothing; the slot frees once the creature
    /// has dissolved
    #[default]
    Forfeit,
    /// Treat dismissal as choosing Disperse
    AutoDisperse,
}

/// A dying enemy awaiting its Resolve choice.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOutcome {
    pub enemy: EnemyId,
    pub archetype: ArchetypeId,
    /// Center of the enemy when it started dying
    pub position: Vec2,
}

impl PendingOutcome {
    fn of(enemy: &Enemy) -> Self {
        Self {
            enemy: enemy.id(),
            archetype: enemy.archetype_id().clone(),
            position: enemy.center(),
        }
    }
}

/// Player input routed to an open prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptInput {
    Previous,
    Next,
    /// Commit the highlighted option
    Confirm,
    /// Commit a specific option directly
    Choose(ResolveChoice),
    Dismiss,
}

/// Presentation state of the open prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvePrompt {
    pub outcome: PendingOutcome,
    selected: usize,
    /// Fade-in progress, 0.0 to 1.0
    fade: f32,
}

impl ResolvePrompt {
    fn new(outcome: PendingOutcome) -> Self {
        Self {
            outcome,
            selected: 0,
            fade: 0.0,
        }
    }

    pub fn selected(&self) -> ResolveChoice {
        ResolveChoice::ALL[self.selected]
    }

    pub fn fade(&self) -> f32 {
        self.fade
    }
}

/// The committed result of one Resolve choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub enemy: EnemyId,
    pub archetype: ArchetypeId,
    pub choice: ResolveChoice,
    /// Brine Tokens awarded
    pub currency: u32,
    /// Continuity awarded
    pub progress: u32,
    /// Items placed in the world
    pub drops: Vec<ItemId>,
    /// Flavor text of a Stabilize
    pub lore: Option<&'static str>,
}

/// Brine Tokens for a base amount: scaled by the choice, rounded, at least 1.
///
/// # Examples
///
/// ```
/// use drift_encounter::{currency_award, ResolveChoice};
///
/// assert_eq!(currency_award(8, ResolveChoice::Disperse), 8);
/// assert_eq!(currency_award(8, ResolveChoice::Stabilize), 4);
/// assert_eq!(currency_award(2, ResolveChoice::Release), 1);
/// ```
pub fn currency_award(base: u32, choice: ResolveChoice) -> u32 {
    let scaled = (base as f32 * choice.currency_multiplier()).round() as u32;
    scaled.max(1)
}

/// Owns the pending slot, the line of deaths behind it, the prompt, and the
/// statistics.
#[derive(Debug, Clone)]
pub struct EncounterResolver {
    pending: Option<PendingOutcome>,
    waiting: VecDeque<PendingOutcome>,
    /// Seconds until the pending outcome's prompt opens
    prompt_delay: Option<f32>,
    prompt: Option<ResolvePrompt>,
    /// The pending outcome's prompt was closed without a choice
    abandoned: bool,
    stats: CombatStatistics,
}

impl EncounterResolver {
    pub fn new(stats: CombatStatistics) -> Self {
        Self {
            pending: None,
            waiting: VecDeque::new(),
            prompt_delay: None,
            prompt: None,
            abandoned: false,
            stats,
        }
    }

    /// Starts from whatever the store holds, or zeroed statistics if it
    /// cannot be read.
    pub fn load(store: &mut dyn StatsStore) -> Self {
        let stats = store.load().unwrap_or_else(|e| {
            warn!("Failed to load combat statistics, starting from zero: {}", e);
            CombatStatistics::default()
        });
        Self::new(stats)
    }

    pub fn stats(&self) -> &CombatStatistics {
        &self.stats
    }

    pub fn pending(&self) -> Option<&PendingOutcome> {
        self.pending.as_ref()
    }

    /// Deaths waiting for the pending slot, oldest first.
    pub fn waiting(&self) -> impl Iterator<Item = &PendingOutcome> {
        self.waiting.iter()
    }

    pub fn prompt(&self) -> Option<&ResolvePrompt> {
        self.prompt.as_ref()
    }

    /// Whether the encounter is modal right now.
    pub fn is_prompt_visible(&self) -> bool {
        self.prompt.is_some()
    }

    /// Whether the enemy is pending or waiting; such enemies must stay in
    /// the population.
    pub fn is_tracked(&self, enemy: EnemyId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.enemy == enemy)
            || self.waiting.iter().any(|p| p.enemy == enemy)
    }

    /// Looks for enemies that have just started dying.
    ///
    /// An enemy counts when its time in Dying is still inside the
    /// observation window (or this frame's step, if larger). The first one
    /// takes the pending slot; later ones queue behind it.
    pub fn observe(&mut self, enemies: &[Enemy], dt: f32, config: &EncounterConfig) {
        let window = config.observe_window.max(dt);
        for enemy in enemies {
            let Some(elapsed) = enemy.dying_elapsed() else {
                continue;
            };
            if elapsed > window || self.is_tracked(enemy.id()) {
                continue;
            }

            let outcome = PendingOutcome::of(enemy);
            if self.pending.is_none() {
                debug!("Enemy {} ({}) is pending resolution", outcome.enemy, outcome.archetype);
                self.set_pending(outcome, config);
            } else {
                debug!("Enemy {} queued behind pending outcome", outcome.enemy);
                self.waiting.push_back(outcome);
            }
        }
    }

    /// Advances the presentation delay and clears outcomes that can no
    /// longer be resolved.
    pub fn update(
        &mut self,
        dt: f32,
        enemies: &[Enemy],
        config: &EncounterConfig,
        feedback: &mut CombatFeedback,
    ) {
        self.waiting
            .retain(|outcome| enemies.iter().any(|e| e.id() == outcome.enemy));

        if let Some(pending) = &self.pending {
            let enemy = enemies.iter().find(|e| e.id() == pending.enemy);
            let gone = enemy.is_none();
            let dissolved = enemy.is_some_and(|e| e.state() == EnemyState::Dissolved);
            if gone || (self.abandoned && dissolved) {
                debug!("Pending outcome for {} cleared without a choice", pending.enemy);
                self.clear_pending(config);
            }
        }

        if let Some(remaining) = self.prompt_delay.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.prompt_delay = None;
                self.open_prompt(feedback);
            }
        }
    }

    /// Fades the open prompt in.
    pub fn update_prompt(&mut self, dt: f32) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.fade = (prompt.fade + PROMPT_FADE_RATE * dt).min(1.0);
        }
    }

    /// Routes one input to the open prompt. Returns the resolution if the
    /// input committed a choice.
    pub fn handle_input<R: Rng + ?Sized>(
        &mut self,
        input: PromptInput,
        catalog: &ArchetypeCatalog,
        config: &EncounterConfig,
        sinks: &mut RewardSinks<'_>,
        feedback: &mut CombatFeedback,
        rng: &mut R,
    ) -> Option<Resolution> {
        let prompt = self.prompt.as_mut()?;
        let count = ResolveChoice::ALL.len();
        match input {
            PromptInput::Previous => {
                prompt.selected = (prompt.selected + count - 1) % count;
                None
            }
            PromptInput::Next => {
                prompt.selected = (prompt.selected + 1) % count;
                None
            }
            PromptInput::Confirm => {
                let choice = prompt.selected();
                self.commit(choice, catalog, config, sinks, feedback, rng)
            }
            PromptInput::Choose(choice) => {
                prompt.selected = choice.index();
                self.commit(choice, catalog, config, sinks, feedback, rng)
            }
            PromptInput::Dismiss => match config.abandon_policy {
                AbandonPolicy::AutoDisperse => {
                    self.commit(ResolveChoice::Disperse, catalog, config, sinks, feedback, rng)
                }
                AbandonPolicy::Forfeit => {
                    self.prompt = None;
                    self.abandoned = true;
                    if let Some(pending) = &self.pending {
                        info!("Resolve prompt for {} dismissed", pending.enemy);
                        feedback.emit(CombatEvent::PromptDismissed {
                            enemy: pending.enemy,
                        });
                    }
                    None
                }
            },
        }
    }

    /// Commits a choice for the pending outcome.
    ///
    /// Only valid while the prompt is open; otherwise nothing happens and
    /// `None` is returned. Each pending outcome can be committed once.
    pub fn commit<R: Rng + ?Sized>(
        &mut self,
        choice: ResolveChoice,
        catalog: &ArchetypeCatalog,
        config: &EncounterConfig,
        sinks: &mut RewardSinks<'_>,
        feedback: &mut CombatFeedback,
        rng: &mut R,
    ) -> Option<Resolution> {
        if self.prompt.is_none() {
            return None;
        }
        let outcome = self.pending.take()?;
        self.prompt = None;

        self.stats.record(&outcome.archetype, choice);
        sinks.quest_log.on_kill(&outcome.archetype);
        sinks.quest_log.on_choice_made(choice);

        let archetype = catalog.get(&outcome.archetype);
        let base = archetype
            .map(|a| rng.gen_range(a.currency.min..=a.currency.max))
            .unwrap_or(0);
        let currency = currency_award(base, choice);
        sinks.economy.add_currency(currency);

        let mut resolution = Resolution {
            enemy: outcome.enemy,
            archetype: outcome.archetype.clone(),
            choice,
            currency,
            progress: 0,
            drops: Vec::new(),
            lore: None,
        };

        match choice {
            ResolveChoice::Disperse => {
                let loot = archetype.map(|a| a.loot.as_slice()).unwrap_or_default();
                let scatter = config.loot_scatter;
                for entry in loot {
                    if !rng.gen_bool(entry.chance) {
                        continue;
                    }
                    let position = outcome.position
                        + Vec2::new(
                            rng.gen_range(-scatter..=scatter),
                            rng.gen_range(-scatter..=scatter),
                        );
                    sinks.items.place_item(&entry.item, position, config.pickup_expiry);
                    feedback.emit(CombatEvent::LootDropped {
                        item: entry.item.clone(),
                        position,
                    });
                    resolution.drops.push(entry.item.clone());
                }
            }
            ResolveChoice::Stabilize => {
                resolution.progress = config.stabilize_progress;
                sinks
                    .progression
                    .add_progress(config.stabilize_progress, STABILIZE_REASON);
                resolution.lore = STABILIZE_LORE.choose(rng).copied();
            }
            ResolveChoice::Release => {
                resolution.progress = config.release_progress;
                sinks
                    .progression
                    .add_progress(config.release_progress, RELEASE_REASON);
                feedback.particles.extend(release_plume(rng, outcome.position));
                feedback.emit(CombatEvent::Released {
                    position: outcome.position,
                });
            }
        }

        if let Err(e) = sinks.stats.save(&self.stats) {
            warn!("Failed to save combat statistics: {}", e);
        }

        info!(
            "Resolved {} ({}) with {}: {} tokens, {} continuity, {} drops",
            outcome.enemy,
            outcome.archetype,
            choice,
            currency,
            resolution.progress,
            resolution.drops.len()
        );
        feedback.emit(CombatEvent::ResolutionCommitted(resolution.clone()));

        self.clear_pending(config);
        Some(resolution)
    }

    /// Drops any outcome referring to `enemy`.
    pub fn forget(&mut self, enemy: EnemyId, config: &EncounterConfig) {
        self.waiting.retain(|outcome| outcome.enemy != enemy);
        if self.pending.as_ref().is_some_and(|p| p.enemy == enemy) {
            self.clear_pending(config);
        }
    }

    /// Drops every outcome and closes the prompt. Statistics are kept.
    pub fn reset(&mut self) {
        self.pending = None;
        self.waiting.clear();
        self.prompt_delay = None;
        self.prompt = None;
        self.abandoned = false;
    }

    fn set_pending(&mut self, outcome: PendingOutcome, config: &EncounterConfig) {
        self.pending = Some(outcome);
        self.prompt_delay = Some(config.prompt_delay);
        self.prompt = None;
        self.abandoned = false;
    }

    /// Frees the slot and promotes the next waiting death, if any.
    fn clear_pending(&mut self, config: &EncounterConfig) {
        self.pending = None;
        self.prompt_delay = None;
        self.prompt = None;
        self.abandoned = false;
        if let Some(next) = self.waiting.pop_front() {
            debug!("Enemy {} promoted to pending resolution", next.enemy);
            self.set_pending(next, config);
        }
    }

    fn open_prompt(&mut self, feedback: &mut CombatFeedback) {
        if let Some(pending) = &self.pending {
            debug!("Showing resolve prompt for {} ({})", pending.enemy, pending.archetype);
            feedback.emit(CombatEvent::PromptShown {
                enemy: pending.enemy,
                archetype: pending.archetype.clone(),
            });
            self.prompt = Some(ResolvePrompt::new(pending.clone()));
        }
    }
}

impl Default for EncounterResolver {
    fn default() -> Self {
        Self::new(CombatStatistics::default())
    }
}
