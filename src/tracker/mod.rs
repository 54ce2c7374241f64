//! Daily completion tracking.
//!
//! The catalog is materialized into a fresh per-day shape every time a day is viewed and merged
//! with whatever was saved for that day before, so completion survives catalog edits. Sessions
//! (subtasks) are never stored on their own, they're regenerated from `sessions` and
//! `focus_minutes` on every read.

pub mod summary;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Activity, Catalog, Category},
    utils::percentage::Percentage,
};

use summary::DaySummary;

/// A timed focus block of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub name: String,
    /// Focus length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub completed: bool,
}

/// Completion state of one activity on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub hours: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub has_timer: bool,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
}

pub fn subtask_id(activity_id: &str, session: u32) -> String {
    format!("{activity_id}-s{session}")
}

impl DailyActivity {
    pub fn from_activity(activity: &Activity) -> Self {
        let subtasks = if activity.has_sessions() {
            (1..=activity.sessions)
                .map(|session| Subtask {
                    id: subtask_id(&activity.id, session),
                    name: format!(
                        "Session {session} - Focus ({} min)",
                        activity.focus_minutes
                    ),
                    duration: activity.focus_minutes,
                    completed: false,
                })
                .collect()
        } else {
            vec![]
        };

        DailyActivity {
            id: activity.id.clone(),
            name: activity.name.clone(),
            category: activity.category,
            hours: activity.total_hours,
            completed: false,
            icon: activity.icon.clone(),
            color: activity.category.color().into(),
            has_timer: activity.has_sessions(),
            break_minutes: activity.break_minutes,
            subtasks,
        }
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    pub fn subtask(&self, id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|v| v.id == id)
    }

    /// Session by its 1-based number.
    pub fn session(&self, number: usize) -> Option<&Subtask> {
        number.checked_sub(1).and_then(|v| self.subtasks.get(v))
    }

    /// An activity with sessions is done exactly when all of its sessions are.
    fn derive_completed(&mut self) {
        if self.has_subtasks() {
            self.completed = self.subtasks.iter().all(|v| v.completed);
        }
    }
}

/// Fresh per-day shape of the catalog, nothing completed.
pub fn materialize(catalog: &Catalog) -> Vec<DailyActivity> {
    catalog
        .activities()
        .iter()
        .map(DailyActivity::from_activity)
        .collect()
}

/// Carries completion from a saved day over to a freshly materialized one. Activities are matched
/// by id and sessions by position; sessions that didn't exist before start as not completed, saved
/// activities missing from `fresh` are dropped.
pub fn merge(fresh: Vec<DailyActivity>, saved: &[DailyActivity]) -> Vec<DailyActivity> {
    fresh
        .into_iter()
        .map(|mut activity| {
            if let Some(previous) = saved.iter().find(|v| v.id == activity.id) {
                activity.completed = previous.completed;
                for (index, subtask) in activity.subtasks.iter_mut().enumerate() {
                    subtask.completed = previous.subtasks.get(index).is_some_and(|v| v.completed);
                }
                activity.derive_completed();
            }
            activity
        })
        .collect()
}

/// What the user sees for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayState {
    date: NaiveDate,
    activities: Vec<DailyActivity>,
}

impl DayState {
    /// Reconciles the catalog with a previously saved record for `date`. Reading never writes.
    pub fn for_date(date: NaiveDate, catalog: &Catalog, saved: Option<&[DailyActivity]>) -> Self {
        let fresh = materialize(catalog);
        let activities = match saved {
            Some(saved) => merge(fresh, saved),
            None => fresh,
        };
        Self { date, activities }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn activities(&self) -> &[DailyActivity] {
        &self.activities
    }

    pub fn get(&self, activity_id: &str) -> Option<&DailyActivity> {
        self.activities.iter().find(|v| v.id == activity_id)
    }

    pub fn completed_count(&self) -> usize {
        self.activities.iter().filter(|v| v.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.activities.len()
    }

    pub fn completion(&self) -> Percentage {
        Percentage::of_counts(self.completed_count(), self.total_count())
    }

    /// Flips a session when `subtask_id` is given, otherwise the activity itself. The latter is
    /// only allowed for activities without sessions.
    pub fn toggle(&self, activity_id: &str, subtask_id: Option<&str>) -> Result<DayState> {
        self.update(activity_id, |activity| match subtask_id {
            Some(subtask_id) => {
                let subtask = activity
                    .subtasks
                    .iter_mut()
                    .find(|v| v.id == subtask_id)
                    .with_context(|| {
                        format!("Activity {activity_id} has no session {subtask_id}")
                    })?;
                subtask.completed = !subtask.completed;
                activity.derive_completed();
                Ok(())
            }
            None if activity.has_subtasks() => {
                bail!("Activity {activity_id} is tracked through its sessions, toggle one of them")
            }
            None => {
                activity.completed = !activity.completed;
                Ok(())
            }
        })
    }

    /// Marks a session as done. Unlike [DayState::toggle] this never undoes anything.
    pub fn complete_subtask(&self, activity_id: &str, subtask_id: &str) -> Result<DayState> {
        self.update(activity_id, |activity| {
            let subtask = activity
                .subtasks
                .iter_mut()
                .find(|v| v.id == subtask_id)
                .with_context(|| format!("Activity {activity_id} has no session {subtask_id}"))?;
            subtask.completed = true;
            activity.derive_completed();
            Ok(())
        })
    }

    fn update(
        &self,
        activity_id: &str,
        change: impl FnOnce(&mut DailyActivity) -> Result<()>,
    ) -> Result<DayState> {
        let mut next = self.clone();
        let activity = next
            .activities
            .iter_mut()
            .find(|v| v.id == activity_id)
            .with_context(|| format!("No activity with id {activity_id} on {}", self.date))?;
        change(activity)?;
        Ok(next)
    }

    /// Snapshot written by "done for day".
    pub fn summarize(&self) -> DaySummary {
        DaySummary {
            date: self.date,
            completion: self.completion(),
            activities_count: self.total_count(),
            completed_count: self.completed_count(),
            activities: self.activities.clone(),
        }
    }
}
