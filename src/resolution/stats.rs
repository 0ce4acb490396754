//! Combat statistics and their persistence.

use crate::{ArchetypeId, EncounterResult, ResolveChoice, StatsStore};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// How often each Resolve option was chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceTally {
    pub disperse: u32,
    pub stabilize: u32,
    pub release: u32,
}

impl ChoiceTally {
    pub fn get(&self, choice: ResolveChoice) -> u32 {
        match choice {
            ResolveChoice::Disperse => self.disperse,
            ResolveChoice::Stabilize => self.stabilize,
            ResolveChoice::Release => self.release,
        }
    }

    fn slot(&mut self, choice: ResolveChoice) -> &mut u32 {
        match choice {
            ResolveChoice::Disperse => &mut self.disperse,
            ResolveChoice::Stabilize => &mut self.stabilize,
            ResolveChoice::Release => &mut self.release,
        }
    }

    pub fn total(&self) -> u32 {
        self.disperse + self.stabilize + self.release
    }

    /// The player's most frequent choice, or `None` before any choice.
    /// Ties go to the earlier option in [`ResolveChoice::ALL`].
    pub fn dominant(&self) -> Option<ResolveChoice> {
        if self.total() == 0 {
            return None;
        }
        ResolveChoice::ALL
            .into_iter()
            .rev()
            .max_by_key(|choice| self.get(*choice))
    }
}

/// Cumulative kill record, persisted across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStatistics {
    pub total_kills: u32,
    /// Kills keyed by archetype id
    pub kills_by_archetype: BTreeMap<String, u32>,
    pub choices: ChoiceTally,
}

impl CombatStatistics {
    /// Records one resolved kill.
    pub fn record(&mut self, archetype: &ArchetypeId, choice: ResolveChoice) {
        self.total_kills = self.total_kills.saturating_add(1);
        let kills = self
            .kills_by_archetype
            .entry(archetype.as_str().to_string())
            .or_insert(0);
        *kills = kills.saturating_add(1);
        let tally = self.choices.slot(choice);
        *tally = tally.saturating_add(1);
    }

    pub fn kills_of(&self, archetype: &ArchetypeId) -> u32 {
        self.kills_by_archetype
            .get(archetype.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// Statistics kept as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsStore for JsonFileStore {
    /// A missing file is a first run and yields zeroed statistics.
    fn load(&mut self) -> EncounterResult<CombatStatistics> {
        if !self.path.exists() {
            debug!("No statistics at {}, starting fresh", self.path.display());
            return Ok(CombatStatistics::default());
        }
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, stats: &CombatStatistics) -> EncounterResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(stats)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store. Clones share the same slot, so a test can keep one
/// handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<CombatStatistics>>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `stats`.
    pub fn with_stats(stats: CombatStatistics) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(stats))),
            failing: false,
        }
    }

    /// A store whose every load and save fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// The last saved statistics, if any.
    pub fn saved(&self) -> Option<CombatStatistics> {
        self.slot.borrow().clone()
    }

    fn check(&self) -> EncounterResult<()> {
        if self.failing {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "statistics store unavailable").into())
        } else {
            Ok(())
        }
    }
}

impl StatsStore for MemoryStore {
    fn load(&mut self) -> EncounterResult<CombatStatistics> {
        self.check()?;
        Ok(self.slot.borrow().clone().unwrap_or_default())
    }

    fn save(&mut self, stats: &CombatStatistics) -> EncounterResult<()> {
        self.check()?;
        *self.slot.borrow_mut() = Some(stats.clone());
        Ok(())
    }
}
