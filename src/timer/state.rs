use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::db::Sticker;

use super::SessionDuration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

/// Session state. Only `TimerController` mutates it; everything else sees
/// clones.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub selected_duration: Option<SessionDuration>,
    pub phase: SessionPhase,
    pub remaining_ms: u64,
    pub earned_sticker: Option<Sticker>,
    pub session_id: Option<String>,
    /// Last failed attempt to persist the reward for an expired countdown.
    pub last_error: Option<String>,
    /// Absolute end of the running countdown.
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Remaining time at `now` for a running countdown, otherwise the stored
    /// value.
    pub fn remaining_at(&self, now: Instant) -> u64 {
        match (self.phase, self.deadline) {
            (SessionPhase::Running, Some(deadline)) => {
                deadline.saturating_duration_since(now).as_millis() as u64
            }
            _ => self.remaining_ms,
        }
    }

    /// Returns `false` and leaves the state alone while running.
    pub fn select_duration(&mut self, duration: SessionDuration) -> bool {
        if self.is_running() {
            return false;
        }
        *self = Self {
            selected_duration: Some(duration),
            remaining_ms: duration.total_ms(),
            ..Self::default()
        };
        true
    }

    /// Enters `Running` with a deadline `total` after `now`. Returns `false`
    /// when no duration has been selected.
    pub fn begin(&mut self, session_id: String, now: Instant) -> bool {
        let Some(duration) = self.selected_duration else {
            return false;
        };
        *self = Self {
            selected_duration: Some(duration),
            phase: SessionPhase::Running,
            remaining_ms: duration.total_ms(),
            earned_sticker: None,
            session_id: Some(session_id),
            last_error: None,
            deadline: Some(now + duration.total()),
        };
        true
    }

    /// Records countdown progress. Remaining time never goes back up.
    pub fn tick(&mut self, remaining_ms: u64) {
        if self.is_running() {
            self.remaining_ms = self.remaining_ms.min(remaining_ms);
        }
    }

    pub fn record_issue_failure(&mut self, message: String) {
        if self.is_running() {
            self.remaining_ms = 0;
            self.last_error = Some(message);
        }
    }

    /// Moves a running session to `Completed` with its persisted sticker.
    pub fn complete(&mut self, sticker: Sticker) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = SessionPhase::Completed;
        self.remaining_ms = 0;
        self.earned_sticker = Some(sticker);
        self.last_error = None;
        self.deadline = None;
        true
    }

    pub fn fail(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = SessionPhase::Failed;
        self.earned_sticker = None;
        self.last_error = None;
        self.deadline = None;
        true
    }

    pub fn reset(&mut self) {
        let selected_duration = self.selected_duration;
        *self = Self {
            selected_duration,
            remaining_ms: selected_duration.map(|d| d.total_ms()).unwrap_or(0),
            ..Self::default()
        };
    }
}
