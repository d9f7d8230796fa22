//! Autoplay loop scheduling.
//!
//! The loop keeps at most one pending deadline. An owner polls it; when the
//! deadline has passed the deadline is consumed, one step runs, and the next
//! deadline is set only if the step made an attempt. Stopping or pausing
//! clears the deadline synchronously, so no step can fire afterwards.

use super::logic::choose_attempt_kind;
use super::strategy::AutoplayStrategy;
use super::types::{AttemptKind, EnhancementResult, ProtectionOptions, AUTOPLAY_STEP_DELAY_MS};
use crate::data::CostTables;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone)]
pub struct Autoplay {
    strategy: Option<AutoplayStrategy>,
    paused: bool,
    next_step_at: Option<Instant>,
    step_delay: Duration,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(Duration::from_millis(AUTOPLAY_STEP_DELAY_MS))
    }
}

impl Autoplay {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            strategy: None,
            paused: false,
            next_step_at: None,
            step_delay,
        }
    }

    pub fn state(&self) -> AutoplayState {
        match (&self.strategy, self.paused) {
            (None, _) => AutoplayState::Idle,
            (Some(_), true) => AutoplayState::Paused,
            (Some(_), false) => AutoplayState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == AutoplayState::Running
    }

    pub fn strategy(&self) -> Option<&AutoplayStrategy> {
        self.strategy.as_ref()
    }

    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    pub fn next_step_at(&self) -> Option<Instant> {
        self.next_step_at
    }

    /// Begin a run. Any previous run is replaced.
    pub fn start(&mut self, strategy: AutoplayStrategy, now: Instant) {
        self.strategy = Some(strategy);
        self.paused = false;
        self.next_step_at = Some(now + self.step_delay);
    }

    /// Suspend scheduling, keeping the strategy.
    pub fn pause(&mut self) {
        if self.strategy.is_some() {
            self.paused = true;
            self.next_step_at = None;
        }
    }

    /// Continue a paused run with its preserved strategy.
    pub fn resume(&mut self, now: Instant) {
        if self.strategy.is_some() && self.paused {
            self.paused = false;
            self.next_step_at = Some(now + self.step_delay);
        }
    }

    pub fn toggle_pause(&mut self, now: Instant) {
        if self.paused {
            self.resume(now);
        } else {
            self.pause();
        }
    }

    /// End the run. Takes effect before any pending step.
    pub fn stop(&mut self) {
        self.strategy = None;
        self.paused = false;
        self.next_step_at = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_step_at.is_some_and(|at| now >= at)
    }

    /// Consume the pending deadline if it has passed. At most one caller
    /// gets `true` per scheduled step.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_running() && self.is_due(now) {
            self.next_step_at = None;
            true
        } else {
            false
        }
    }

    /// Schedule the step after this one. No-op unless running with nothing pending.
    pub fn schedule_next(&mut self, now: Instant) {
        if self.is_running() && self.next_step_at.is_none() {
            self.next_step_at = Some(now + self.step_delay);
        }
    }
}

/// What the loop should do from `current_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPlan {
    TargetReached,
    NoPath { next_level: u32 },
    Attempt {
        kind: AttemptKind,
        next_level: u32,
        options: ProtectionOptions,
    },
}

pub fn plan_step(
    strategy: &AutoplayStrategy,
    tables: &CostTables,
    grade: &str,
    current_level: u32,
) -> StepPlan {
    if current_level >= strategy.target_level {
        return StepPlan::TargetReached;
    }
    let next_level = current_level + 1;
    let info = tables.lookup(grade, next_level);
    let Some(kind) = choose_attempt_kind(&info, strategy.prefers_guaranteed(next_level)) else {
        return StepPlan::NoPath { next_level };
    };
    let options = match (kind, info.probabilistic) {
        (AttemptKind::Probabilistic, Some(record)) => strategy.protections_for(next_level, record),
        _ => ProtectionOptions::NONE,
    };
    StepPlan::Attempt {
        kind,
        next_level,
        options,
    }
}

/// Result of running one autoplay step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Stopped, paused or never started; nothing happened.
    Inactive,
    /// The target level was already reached; the loop has stopped.
    TargetReached,
    /// No record for the next level; the loop has stopped and a notice was raised.
    NoPath { next_level: u32 },
    Attempted(EnhancementResult),
}

impl StepOutcome {
    /// Whether the loop keeps going after this step.
    pub fn continues(&self) -> bool {
        matches!(self, StepOutcome::Attempted(_))
    }
}
