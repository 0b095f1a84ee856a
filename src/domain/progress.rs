//! Phase status tracking and item-level progress counters (C5).

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::data::types::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Completed,
    Warning,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    pub status: PhaseStatus,
    pub current: usize,
    pub total: usize,
    pub item_type: String,
}

/// Tracks the status of each of the three phases plus item-level progress
/// within whichever phase is currently in progress. Exactly one phase is
/// `InProgress` at a time (enforced by `start_phase`/`end_phase`).
#[derive(Debug)]
pub struct ProgressTracker {
    statuses: [PhaseStatus; 3],
    current_phase: Option<Phase>,
    current: usize,
    total: usize,
    item_type: String,
    started_at: Option<Instant>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            statuses: [PhaseStatus::Pending; 3],
            current_phase: None,
            current: 0,
            total: 0,
            item_type: String::new(),
            started_at: None,
        }
    }

    fn index(phase: Phase) -> usize {
        match phase {
            Phase::Extract => 0,
            Phase::Transform => 1,
            Phase::Load => 2,
        }
    }

    pub fn status(&self, phase: Phase) -> PhaseStatus {
        self.statuses[Self::index(phase)]
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current_phase
    }

    /// Panics if another phase is already in progress — the context never
    /// calls this concurrently, so this is a logic-bug assertion.
    pub fn start_phase(&mut self, phase: Phase, total: usize, item_type: impl Into<String>) {
        assert!(
            self.current_phase.is_none(),
            "cannot start {:?} while {:?} is in progress",
            phase,
            self.current_phase
        );
        self.statuses[Self::index(phase)] = PhaseStatus::InProgress;
        self.current_phase = Some(phase);
        self.current = 0;
        self.total = total;
        self.item_type = item_type.into();
        self.started_at = Some(Instant::now());
        tracing::debug!(?phase, total, "phase started");
    }

    pub fn update(&mut self, current: usize) {
        self.current = current;
        tracing::debug!(
            phase = ?self.current_phase,
            current,
            total = self.total,
            item_type = %self.item_type,
            "progress"
        );
    }

    pub fn end_phase(&mut self, status: PhaseStatus) {
        let phase = self
            .current_phase
            .take()
            .expect("end_phase called with no phase in progress");
        self.statuses[Self::index(phase)] = status;
        let elapsed = self.started_at.take().map(|t| t.elapsed());
        tracing::debug!(?phase, ?status, elapsed_ms = elapsed.map(|d| d.as_millis()), "phase ended");
    }

    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.current_phase.map(|phase| ProgressSnapshot {
            phase,
            status: self.status(phase),
            current: self.current,
            total: self.total,
            item_type: self.item_type.clone(),
        })
    }

    /// Marks `phase` completed directly, bypassing `start_phase`/`end_phase`.
    /// Used when restoring state from a checkpoint descriptor.
    pub fn mark_completed(&mut self, phase: Phase) {
        self.statuses[Self::index(phase)] = PhaseStatus::Completed;
    }

    pub fn all_completed_before(&self, phase: Phase) -> bool {
        let target = Self::index(phase);
        self.statuses[..target]
            .iter()
            .all(|s| matches!(s, PhaseStatus::Completed))
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_pending() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.status(Phase::Extract), PhaseStatus::Pending);
    }

    #[test]
    fn start_and_end_phase_transitions_status() {
        let mut tracker = ProgressTracker::new();
        tracker.start_phase(Phase::Extract, 3, "conversations");
        assert_eq!(tracker.status(Phase::Extract), PhaseStatus::InProgress);
        tracker.update(2);
        tracker.end_phase(PhaseStatus::Completed);
        assert_eq!(tracker.status(Phase::Extract), PhaseStatus::Completed);
        assert!(tracker.current_phase().is_none());
    }

    #[test]
    #[should_panic]
    fn cannot_start_two_phases_at_once() {
        let mut tracker = ProgressTracker::new();
        tracker.start_phase(Phase::Extract, 1, "x");
        tracker.start_phase(Phase::Transform, 1, "x");
    }

    #[test]
    fn all_completed_before_checks_predecessors() {
        let mut tracker = ProgressTracker::new();
        assert!(tracker.all_completed_before(Phase::Extract));
        assert!(!tracker.all_completed_before(Phase::Load));

        tracker.start_phase(Phase::Extract, 1, "x");
        tracker.end_phase(PhaseStatus::Completed);
        tracker.start_phase(Phase::Transform, 1, "x");
        tracker.end_phase(PhaseStatus::Completed);
        assert!(tracker.all_completed_before(Phase::Load));
    }
}
