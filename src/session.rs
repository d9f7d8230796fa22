//! The simulation session: single owner of everything a front end mutates.
//!
//! Manual attempts and autoplay steps both go through [`Session::apply`], so
//! level, ledger and history always have exactly one writer.

use crate::data::{CostTables, EnhancementInfo, WeaponFamily};
use crate::enhancement::autoplay::{plan_step, Autoplay, AutoplayState, StepOutcome, StepPlan};
use crate::enhancement::history::{History, HistoryEntry};
use crate::enhancement::ledger::Ledger;
use crate::enhancement::logic::attempt_enhancement;
use crate::enhancement::persistence::{load_ledger, save_ledger, KeyValueStore};
use crate::enhancement::resolver::effective_options;
use crate::enhancement::strategy::AutoplayStrategy;
use crate::enhancement::types::{AttemptKind, EnhancementResult, ProtectionOptions};
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const RESET_LOGS_PROMPT: &str = "Reset all enhancement records? Spent materials and consumed weapons will be cleared.";
pub const RESET_ENHANCEMENT_PROMPT: &str =
    "Reset the current weapon to +0? Accumulated records are kept.";

/// Messages the front end should surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No record of the requested kind exists for the next level.
    CannotEnhanceFurther { next_level: u32 },
    /// Autoplay found no usable path and stopped.
    AutoplayStopped { next_level: u32 },
    NoWeaponSelected,
    /// A manual attempt was refused while autoplay is running.
    AutoplayActive,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CannotEnhanceFurther { next_level } => {
                write!(f, "Cannot enhance further: no cost data for +{next_level}.")
            }
            Notice::AutoplayStopped { next_level } => write!(
                f,
                "Cannot enhance further (no cost data for +{next_level}), autoplay stopped."
            ),
            Notice::NoWeaponSelected => f.write_str("Select a weapon first."),
            Notice::AutoplayActive => f.write_str("Autoplay is running; pause or stop it first."),
        }
    }
}

/// Read-only copy of session state, handed to front ends and other tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub weapon: Option<String>,
    pub level: u32,
    pub max_level: u32,
    pub ledger: Ledger,
    pub history: Vec<HistoryEntry>,
    pub notices: Vec<Notice>,
    pub autoplay: AutoplayState,
}

pub struct Session {
    tables: Arc<CostTables>,
    weapon: Option<WeaponFamily>,
    level: u32,
    ledger: Ledger,
    history: History,
    notices: Vec<Notice>,
    autoplay: Autoplay,
    store: Option<Box<dyn KeyValueStore>>,
}

impl Session {
    /// Session whose ledger is restored from and persisted to `store`.
    pub fn new(tables: Arc<CostTables>, mut store: Box<dyn KeyValueStore>) -> Self {
        let ledger = load_ledger(store.as_mut());
        Self {
            tables,
            weapon: None,
            level: 0,
            ledger,
            history: History::new(),
            notices: Vec::new(),
            autoplay: Autoplay::default(),
            store: Some(store),
        }
    }

    /// Session that persists nothing.
    pub fn detached(tables: Arc<CostTables>) -> Self {
        Self {
            tables,
            weapon: None,
            level: 0,
            ledger: Ledger::new(),
            history: History::new(),
            notices: Vec::new(),
            autoplay: Autoplay::default(),
            store: None,
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.autoplay = Autoplay::new(delay);
        self
    }

    pub fn tables(&self) -> &CostTables {
        &self.tables
    }

    pub fn weapon(&self) -> Option<&WeaponFamily> {
        self.weapon.as_ref()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn autoplay(&self) -> &Autoplay {
        &self.autoplay
    }

    pub fn store(&self) -> Option<&dyn KeyValueStore> {
        self.store.as_deref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Highest level reachable for the selected weapon's grade.
    pub fn max_level(&self) -> u32 {
        self.weapon
            .as_ref()
            .map(|w| self.tables.max_level(w.grade()))
            .unwrap_or(0)
    }

    /// Records for the step from the current level to the next.
    pub fn enhancement_info(&self) -> EnhancementInfo<'_> {
        match &self.weapon {
            Some(w) => self.tables.lookup(w.grade(), self.level + 1),
            None => EnhancementInfo::default(),
        }
    }

    /// `requested` with any flag the next record cannot honour cleared.
    pub fn effective_options(&self, requested: ProtectionOptions) -> ProtectionOptions {
        match self.enhancement_info().probabilistic {
            Some(record) => effective_options(record, requested),
            None => ProtectionOptions::NONE,
        }
    }

    /// Switch weapons. Level and history start over; autoplay stops.
    pub fn select_weapon(&mut self, family: WeaponFamily) {
        tracing::debug!(weapon = family.name(), grade = family.grade(), "weapon selected");
        self.autoplay.stop();
        self.weapon = Some(family);
        self.level = 0;
        self.history = History::new();
    }

    /// Manual attempt. Returns the applied result, or `None` with a notice raised.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        kind: AttemptKind,
        requested: ProtectionOptions,
        rng: &mut R,
    ) -> Option<EnhancementResult> {
        if self.autoplay.is_running() {
            self.notices.push(Notice::AutoplayActive);
            return None;
        }
        let options = self.effective_options(requested);
        match self.run_attempt(kind, options, rng) {
            Ok(result) => Some(result),
            Err(notice) => {
                tracing::warn!("{}", notice);
                self.notices.push(notice);
                None
            }
        }
    }

    fn run_attempt<R: Rng + ?Sized>(
        &mut self,
        kind: AttemptKind,
        options: ProtectionOptions,
        rng: &mut R,
    ) -> Result<EnhancementResult, Notice> {
        let family = self.weapon.as_ref().ok_or(Notice::NoWeaponSelected)?;
        let next_level = self.level + 1;
        let info = self.tables.lookup(family.grade(), next_level);
        let result = attempt_enhancement(kind, &info, options, self.level, family, rng)
            .ok_or(Notice::CannotEnhanceFurther { next_level })?;
        self.apply(&result);
        Ok(result)
    }

    /// Book a result: new level, ledger (persisted) and history.
    pub fn apply(&mut self, result: &EnhancementResult) {
        tracing::debug!(
            kind = %result.kind,
            from = result.from_level,
            to = result.new_level,
            outcome = %result.outcome,
            gold = result.costs.gold,
            "enhancement attempt"
        );
        self.level = result.new_level;
        self.ledger = self.ledger.apply(result);
        self.persist_ledger();
        self.history = self.history.record(HistoryEntry::from_result(result));
    }

    fn persist_ledger(&mut self) {
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(e) = save_ledger(store, &self.ledger) {
                tracing::warn!("failed to persist ledger: {}", e);
            }
        }
    }

    /// Back to +0 with an empty history; the ledger is kept.
    pub fn reset_enhancement(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(RESET_ENHANCEMENT_PROMPT) {
            return false;
        }
        tracing::info!("enhancement reset");
        self.level = 0;
        self.history = History::new();
        self.autoplay.stop();
        true
    }

    /// Clear ledger and history. The level is kept.
    pub fn reset_logs(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(RESET_LOGS_PROMPT) {
            return false;
        }
        tracing::info!("enhancement records reset");
        self.ledger = Ledger::new();
        self.persist_ledger();
        self.history = History::new();
        self.autoplay.stop();
        true
    }

    /// Begin autoplay. Refused (with a notice) when no weapon is selected.
    pub fn start_autoplay(&mut self, strategy: AutoplayStrategy, now: Instant) -> bool {
        if self.weapon.is_none() {
            self.notices.push(Notice::NoWeaponSelected);
            return false;
        }
        tracing::info!(
            target_level = strategy.target_level,
            from = self.level,
            "autoplay started"
        );
        self.autoplay.start(strategy, now);
        true
    }

    pub fn pause_autoplay(&mut self) {
        self.autoplay.pause();
    }

    pub fn resume_autoplay(&mut self, now: Instant) {
        self.autoplay.resume(now);
    }

    pub fn toggle_autoplay_pause(&mut self, now: Instant) -> AutoplayState {
        self.autoplay.toggle_pause(now);
        self.autoplay.state()
    }

    pub fn stop_autoplay(&mut self) {
        if self.autoplay.state() != AutoplayState::Idle {
            tracing::info!(level = self.level, "autoplay stopped");
        }
        self.autoplay.stop();
    }

    /// Run the pending autoplay step if its deadline has passed, then
    /// schedule the next one. Returns `None` when nothing was due.
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> Option<StepOutcome> {
        if !self.autoplay.take_due(now) {
            return None;
        }
        let outcome = self.autoplay_step(rng);
        if outcome.continues() {
            self.autoplay.schedule_next(now);
        }
        Some(outcome)
    }

    /// One autoplay step, ignoring timing. Does nothing unless running.
    pub fn autoplay_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StepOutcome {
        if !self.autoplay.is_running() {
            return StepOutcome::Inactive;
        }
        let (Some(strategy), Some(family)) = (self.autoplay.strategy(), self.weapon.as_ref()) else {
            return StepOutcome::Inactive;
        };

        match plan_step(strategy, &self.tables, family.grade(), self.level) {
            StepPlan::TargetReached => {
                tracing::debug!(level = self.level, "autoplay reached target");
                self.autoplay.stop();
                StepOutcome::TargetReached
            }
            StepPlan::NoPath { next_level } => {
                self.stop_with_notice(next_level);
                StepOutcome::NoPath { next_level }
            }
            StepPlan::Attempt {
                kind,
                next_level,
                options,
            } => match self.run_attempt(kind, options, rng) {
                Ok(result) => StepOutcome::Attempted(result),
                Err(_) => {
                    self.stop_with_notice(next_level);
                    StepOutcome::NoPath { next_level }
                }
            },
        }
    }

    fn stop_with_notice(&mut self, next_level: u32) {
        let notice = Notice::AutoplayStopped { next_level };
        tracing::warn!("{}", notice);
        self.notices.push(notice);
        self.autoplay.stop();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            weapon: self.weapon.as_ref().map(|w| w.name().to_string()),
            level: self.level,
            max_level: self.max_level(),
            ledger: self.ledger.clone(),
            history: self.history.iter().cloned().collect(),
            notices: self.notices.clone(),
            autoplay: self.autoplay.state(),
        }
    }

    /// Snapshot that hands the pending notices over to the caller.
    pub fn take_snapshot(&mut self) -> SessionSnapshot {
        let snapshot = self.snapshot();
        self.notices.clear();
        snapshot
    }
}
