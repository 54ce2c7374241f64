//! Focus and break countdowns.
//!
//! [TimerEngine] is the state machine and knows nothing about time passing, [runner::TimerRunner]
//! feeds it one tick per second.

pub mod notify;
pub mod runner;

use std::fmt::Display;

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Focus,
    Break,
}

impl Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerKind::Focus => write!(f, "focus"),
            TimerKind::Break => write!(f, "break"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub task_id: String,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Paused,
    Running(u32),
    /// Reported on the tick that reaches zero and never again for the same run.
    Completed(Completion),
}

/// Holds the one active timer. Starting a timer for another task replaces the current one, so
/// there is never more than one countdown in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEngine {
    task_id: Option<String>,
    kind: TimerKind,
    duration: u32,
    remaining: u32,
    status: TimerStatus,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self {
            task_id: None,
            kind: TimerKind::Focus,
            duration: 0,
            remaining: 0,
            status: TimerStatus::Idle,
        }
    }
}

impl TimerEngine {
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    /// Seconds left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Full length of the current countdown in seconds.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Starts counting down `minutes` for `task_id`. Returns the task whose timer got replaced,
    /// if another one was running or paused. Durations that don't fit in seconds are rejected and
    /// leave the engine untouched.
    pub fn start(
        &mut self,
        task_id: impl Into<String>,
        minutes: u32,
        kind: TimerKind,
    ) -> Result<Option<String>> {
        let duration = minutes
            .checked_mul(60)
            .with_context(|| format!("{minutes} minutes is too long for a timer"))?;
        let task_id = task_id.into();
        let replaced = match self.status {
            TimerStatus::Idle => None,
            TimerStatus::Running | TimerStatus::Paused => {
                self.task_id.take().filter(|v| *v != task_id)
            }
        };

        self.task_id = Some(task_id);
        self.kind = kind;
        self.duration = duration;
        self.remaining = self.duration;
        self.status = TimerStatus::Running;
        Ok(replaced)
    }

    pub fn pause(&mut self) -> bool {
        if self.status != TimerStatus::Running {
            return false;
        }
        self.status = TimerStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != TimerStatus::Paused {
            return false;
        }
        self.status = TimerStatus::Running;
        true
    }

    pub fn stop(&mut self) {
        self.status = TimerStatus::Idle;
        self.remaining = self.duration;
        self.task_id = None;
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.status {
            TimerStatus::Idle => TickOutcome::Idle,
            TimerStatus::Paused => TickOutcome::Paused,
            TimerStatus::Running => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining > 0 {
                    return TickOutcome::Running(self.remaining);
                }

                self.status = TimerStatus::Idle;
                match self.task_id.take() {
                    Some(task_id) => TickOutcome::Completed(Completion {
                        task_id,
                        kind: self.kind,
                    }),
                    None => TickOutcome::Idle,
                }
            }
        }
    }
}

/// Formats seconds as `mm:ss`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::{format_remaining, TickOutcome, TimerEngine, TimerKind, TimerStatus};

    #[test]
    fn test_full_run_completes_once() {
        let mut engine = TimerEngine::default();
        engine.start("1", 1, TimerKind::Focus).unwrap();
        assert_eq!(engine.remaining(), 60);

        let outcomes = (0..60).map(|_| engine.tick()).collect::<Vec<_>>();
        let completions = outcomes
            .iter()
            .filter(|v| matches!(v, TickOutcome::Completed(_)))
            .count();

        assert_eq!(completions, 1);
        assert!(matches!(outcomes.last(), Some(TickOutcome::Completed(c)) if c.task_id == "1"));
        assert_eq!(engine.remaining(), 0);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_pause_freezes_remaining() {
        let mut engine = TimerEngine::default();
        engine.start("1", 1, TimerKind::Focus).unwrap();
        for _ in 0..30 {
            engine.tick();
        }
        assert!(engine.pause());
        assert_eq!(engine.tick(), TickOutcome::Paused);
        assert_eq!(engine.tick(), TickOutcome::Paused);
        assert!(engine.resume());
        assert_eq!(engine.tick(), TickOutcome::Running(29));
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut engine = TimerEngine::default();
        assert!(!engine.pause());
        assert!(!engine.resume());

        engine.start("1", 1, TimerKind::Break).unwrap();
        assert!(!engine.resume());
        assert!(engine.pause());
        assert!(!engine.pause());
    }

    #[test]
    fn test_stop_resets_to_full_duration() {
        let mut engine = TimerEngine::default();
        engine.start("1", 2, TimerKind::Focus).unwrap();
        engine.tick();
        engine.pause();
        engine.stop();

        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining(), 120);
        assert_eq!(engine.task_id(), None);
        assert_eq!(engine.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_starting_another_task_replaces_active_one() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.start("1", 1, TimerKind::Focus).unwrap(), None);
        assert_eq!(
            engine.start("2", 5, TimerKind::Break).unwrap(),
            Some("1".to_string())
        );

        assert_eq!(engine.task_id(), Some("2"));
        assert_eq!(engine.remaining(), 300);
        assert_eq!(engine.kind(), TimerKind::Break);

        // Restarting the same task is not a replacement.
        assert_eq!(engine.start("2", 1, TimerKind::Focus).unwrap(), None);
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        let mut engine = TimerEngine::default();
        engine.start("1", 1, TimerKind::Focus).unwrap();

        assert!(engine.start("2", 80_000_000, TimerKind::Focus).is_err());
        assert_eq!(engine.task_id(), Some("1"));
        assert_eq!(engine.remaining(), 60);

        let longest = u32::MAX / 60;
        assert!(engine.start("2", longest, TimerKind::Focus).is_ok());
        assert_eq!(engine.duration(), longest * 60);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(3305), "55:05");
    }
}
