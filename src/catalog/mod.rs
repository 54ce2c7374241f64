//! The activity catalog is the long-lived configuration of the tracker: which activities exist,
//! how they're grouped and how they're split into focus sessions.
//!
//! Every operation on [Catalog] returns a new catalog and leaves the original untouched, so
//! callers can hold on to the previous value for rollback. `priority_order` is kept contiguous
//! per category (`0..n`) after every operation.

pub mod defaults;

use std::fmt::Display;

use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Learning,
    Health,
    Leisure,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Learning,
        Category::Health,
        Category::Leisure,
    ];

    pub fn color(&self) -> &'static str {
        match self {
            Category::Work => "blue",
            Category::Learning => "purple",
            Category::Health => "green",
            Category::Leisure => "orange",
        }
    }

    pub fn default_icon(&self) -> &'static str {
        match self {
            Category::Work => "💼",
            Category::Learning => "📚",
            Category::Health => "💪",
            Category::Leisure => "🎮",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Work => write!(f, "work"),
            Category::Learning => write!(f, "learning"),
            Category::Health => write!(f, "health"),
            Category::Leisure => write!(f, "leisure"),
        }
    }
}

/// Catalog entry. Field names follow the stored JSON documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub total_hours: f64,
    /// Number of focus sessions the activity is split into.
    #[serde(default)]
    pub sessions: u32,
    #[serde(default)]
    pub focus_minutes: u32,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub priority_order: u32,
}

impl Activity {
    /// Activities only get timed sessions when both a count and a length are configured.
    pub fn has_sessions(&self) -> bool {
        self.sessions > 0 && self.focus_minutes > 0
    }
}

/// Everything needed to create an activity. Id and ordering are assigned by the catalog.
#[derive(Debug, Clone)]
pub struct ActivityDraft {
    pub name: String,
    pub category: Category,
    pub total_hours: f64,
    pub sessions: u32,
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl ActivityDraft {
    fn into_activity(self, id: String, priority_order: u32) -> Activity {
        Activity {
            id,
            icon: self
                .icon
                .unwrap_or_else(|| self.category.default_icon().into()),
            color: self.color.unwrap_or_else(|| self.category.color().into()),
            name: self.name,
            category: self.category,
            total_hours: self.total_hours,
            sessions: self.sessions,
            focus_minutes: self.focus_minutes,
            break_minutes: self.break_minutes,
            priority_order,
        }
    }
}

/// Partial update of an activity. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub total_hours: Option<f64>,
    pub sessions: Option<u32>,
    pub focus_minutes: Option<u32>,
    pub break_minutes: Option<u32>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl ActivityPatch {
    fn apply_to(self, activity: &Activity) -> Activity {
        let activity = activity.clone();
        Activity {
            name: self.name.unwrap_or(activity.name),
            category: self.category.unwrap_or(activity.category),
            total_hours: self.total_hours.unwrap_or(activity.total_hours),
            sessions: self.sessions.unwrap_or(activity.sessions),
            focus_minutes: self.focus_minutes.unwrap_or(activity.focus_minutes),
            break_minutes: self.break_minutes.unwrap_or(activity.break_minutes),
            icon: self.icon.unwrap_or(activity.icon),
            color: self.color.unwrap_or(activity.color),
            ..activity
        }
    }
}

fn validate(name: &str, total_hours: f64) -> Result<()> {
    ensure!(!name.trim().is_empty(), "Activity name can't be empty");
    ensure!(
        total_hours.is_finite() && total_hours > 0.,
        "Total hours must be positive, got {total_hours}"
    );
    Ok(())
}

/// Ordered list of activities: category-major, `priority_order`-minor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Activity>", into = "Vec<Activity>")]
pub struct Catalog {
    activities: Vec<Activity>,
}

impl From<Vec<Activity>> for Catalog {
    fn from(value: Vec<Activity>) -> Self {
        Catalog::new(value)
    }
}

impl From<Catalog> for Vec<Activity> {
    fn from(value: Catalog) -> Self {
        value.activities
    }
}

impl Catalog {
    /// Builds a catalog from stored activities. Orders are renumbered per category, keeping the
    /// stored order where `priority_order` is missing or duplicated.
    pub fn new(mut activities: Vec<Activity>) -> Self {
        sort_for_display(&mut activities);
        let mut current = None;
        let mut next = 0;
        for activity in activities.iter_mut() {
            if current != Some(activity.category) {
                current = Some(activity.category);
                next = 0;
            }
            activity.priority_order = next;
            next += 1;
        }
        Self { activities }
    }

    pub fn defaults() -> Self {
        Catalog::new(defaults::default_activities())
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|v| v.id == id)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(move |v| v.category == category)
    }

    pub fn total_hours(&self) -> f64 {
        self.activities.iter().map(|v| v.total_hours).sum()
    }

    pub fn category_hours(&self, category: Category) -> f64 {
        self.in_category(category).map(|v| v.total_hours).sum()
    }

    /// Scheduled hours don't fit into a day. Only ever a warning.
    pub fn exceeds_day(&self) -> bool {
        self.total_hours() > 24.
    }

    /// Generates a fresh id: creation time in milliseconds plus a random suffix. Ids are never
    /// reused, saved days are matched by id and a recycled one would inherit old completion.
    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        loop {
            let candidate = format!("{}-{}", now.timestamp_millis(), Uuid::new_v4().simple());
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Appends an activity at the end of its category.
    pub fn add(&self, draft: ActivityDraft, id: String) -> Result<Catalog> {
        validate(&draft.name, draft.total_hours)?;
        ensure!(self.get(&id).is_none(), "Activity {id} already exists");

        let priority_order = self
            .in_category(draft.category)
            .map(|v| v.priority_order + 1)
            .max()
            .unwrap_or(0);

        let mut activities = self.activities.clone();
        activities.push(draft.into_activity(id, priority_order));
        sort_for_display(&mut activities);
        Ok(Catalog { activities })
    }

    /// Replaces fields of an activity. Id and position stay the same unless the category changes,
    /// in which case the activity moves to the end of its new category.
    pub fn edit(&self, id: &str, patch: ActivityPatch) -> Result<Catalog> {
        let current = self.get(id).with_context(|| format!("No activity with id {id}"))?;
        let updated = patch.apply_to(current);
        validate(&updated.name, updated.total_hours)?;

        if updated.category == current.category {
            let activities = self
                .activities
                .iter()
                .map(|v| if v.id == id { updated.clone() } else { v.clone() })
                .collect();
            return Ok(Catalog { activities });
        }

        debug!(
            "Moving activity {id} from {} to {}",
            current.category, updated.category
        );
        let mut moved = self.delete(id)?;
        let priority_order = moved.in_category(updated.category).count() as u32;
        moved.activities.push(Activity {
            priority_order,
            ..updated
        });
        sort_for_display(&mut moved.activities);
        Ok(moved)
    }

    /// Removes an activity and closes the gap it leaves in its category.
    pub fn delete(&self, id: &str) -> Result<Catalog> {
        let removed = self.get(id).with_context(|| format!("No activity with id {id}"))?;

        let activities = self
            .activities
            .iter()
            .filter(|v| v.id != id)
            .cloned()
            .map(|mut v| {
                if v.category == removed.category && v.priority_order > removed.priority_order {
                    v.priority_order -= 1;
                }
                v
            })
            .collect();
        Ok(Catalog { activities })
    }

    /// Moves an activity to `target_index` within its category. Indices past the end move it to
    /// the last position.
    pub fn reorder(&self, id: &str, target_index: usize) -> Result<Catalog> {
        let moving = self.get(id).with_context(|| format!("No activity with id {id}"))?;
        let category = moving.category;

        let mut ordered = self.in_category(category).cloned().collect::<Vec<_>>();
        let Some(from) = ordered.iter().position(|v| v.id == id) else {
            bail!("Activity {id} is missing from its own category");
        };
        let item = ordered.remove(from);
        ordered.insert(target_index.min(ordered.len()), item);
        for (index, activity) in ordered.iter_mut().enumerate() {
            activity.priority_order = index as u32;
        }

        let mut activities = self
            .activities
            .iter()
            .filter(|v| v.category != category)
            .cloned()
            .chain(ordered)
            .collect::<Vec<_>>();
        sort_for_display(&mut activities);
        Ok(Catalog { activities })
    }

    /// Drag-and-drop style reorder: `id` takes the place of `over_id`. Returns `None` when the two
    /// activities belong to different categories, nothing changes in that case.
    pub fn reorder_onto(&self, id: &str, over_id: &str) -> Result<Option<Catalog>> {
        let moving = self.get(id).with_context(|| format!("No activity with id {id}"))?;
        let over = self
            .get(over_id)
            .with_context(|| format!("No activity with id {over_id}"))?;

        if moving.category != over.category {
            debug!("Ignoring reorder of {id} onto {over_id}: categories differ");
            return Ok(None);
        }
        self.reorder(id, over.priority_order as usize).map(Some)
    }
}

fn sort_for_display(activities: &mut [Activity]) {
    // Stable, so equal orders keep their stored sequence.
    activities.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(a.priority_order.cmp(&b.priority_order))
    });
}
