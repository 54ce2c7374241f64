use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{catalog::Category, utils::percentage::Percentage};

use super::DailyActivity;

/// Finalized snapshot of a day. Statistics only ever read these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub completion: Percentage,
    pub activities_count: usize,
    pub completed_count: usize,
    pub activities: Vec<DailyActivity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryHours {
    pub scheduled: f64,
    pub completed: f64,
}

impl CategoryHours {
    pub fn rate(&self) -> Percentage {
        Percentage::from_ratio(self.completed, self.scheduled)
    }
}

impl std::ops::AddAssign for CategoryHours {
    fn add_assign(&mut self, rhs: Self) {
        self.scheduled += rhs.scheduled;
        self.completed += rhs.completed;
    }
}

impl DaySummary {
    pub fn completed_hours(&self) -> f64 {
        self.activities
            .iter()
            .filter(|v| v.completed)
            .map(|v| v.hours)
            .sum()
    }

    /// Scheduled and completed hours per category, as recorded in the snapshot.
    pub fn category_hours(&self) -> BTreeMap<Category, CategoryHours> {
        let mut result = BTreeMap::<Category, CategoryHours>::new();
        for activity in &self.activities {
            *result.entry(activity.category).or_default() += CategoryHours {
                scheduled: activity.hours,
                completed: if activity.completed { activity.hours } else { 0. },
            };
        }
        result
    }
}

/// Remembers which days were already celebrated, so closing out the same perfect day twice
/// only celebrates once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CelebrationGate {
    celebrated: BTreeSet<NaiveDate>,
}

impl CelebrationGate {
    pub fn has_celebrated(&self, date: NaiveDate) -> bool {
        self.celebrated.contains(&date)
    }

    /// Returns the updated gate when `summary` earns a celebration that didn't happen yet.
    pub fn admit(&self, summary: &DaySummary) -> Option<CelebrationGate> {
        if !summary.completion.is_full() || self.has_celebrated(summary.date) {
            return None;
        }
        let mut next = self.clone();
        next.celebrated.insert(summary.date);
        Some(next)
    }
}
