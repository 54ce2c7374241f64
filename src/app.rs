//! Application services. Every user action is a pure transition on catalog or day state, followed
//! by a write through the store and, where a remote exists for it, an optimistic sync.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures::StreamExt;
use tracing::{debug, info, instrument};

use crate::{
    catalog::{Activity, ActivityDraft, ActivityPatch, Catalog},
    preferences::{ColorThemeId, ColorThemePreference, Theme},
    stats::{
        aggregate, aggregate_year,
        range::{summaries_between, DateRange},
        RangeStats, YearStats,
    },
    storage::{load, save, KeyValueStore, StorageKey},
    sync::{
        optimistic_update, CompletionPayload, DeletePayload, PreferencePayload, RemoteSync,
        ReorderEntry, SyncOutcome,
    },
    timer::notify::{deliver, Notifier},
    tracker::{
        summary::{CelebrationGate, DaySummary},
        DailyActivity, DayState,
    },
    utils::clock::Clock,
};

/// Result of a change that was synced optimistically. `value` is whatever stands locally
/// afterwards, the previous state when the remote rejected the change.
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayClosed {
    pub summary: DaySummary,
    /// Whether this call triggered the celebration for a fully completed day.
    pub celebrated: bool,
}

pub struct App<S> {
    store: S,
    remote: Box<dyn RemoteSync>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(
        store: S,
        remote: Box<dyn RemoteSync>,
        notifier: Box<dyn Notifier>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            store,
            remote,
            notifier,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The stored catalog. The first read of a fresh store persists the built-in defaults.
    pub async fn catalog(&self) -> Result<Catalog> {
        if let Some(catalog) = load::<Catalog>(&self.store, &StorageKey::Catalog).await? {
            return Ok(catalog);
        }

        info!("No catalog stored, starting from defaults");
        let catalog = Catalog::defaults();
        save(&self.store, &StorageKey::Catalog, &catalog).await?;
        Ok(catalog)
    }

    async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        save(&self.store, &StorageKey::Catalog, catalog).await
    }

    /// Commits `next` in place of `previous`, rolling back when `attempt` fails.
    async fn sync_catalog<F>(
        &self,
        previous: Catalog,
        next: Catalog,
        attempt: impl FnOnce() -> F,
    ) -> Result<Synced<Catalog>>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        let outcome = optimistic_update(
            || self.save_catalog(&next),
            attempt,
            || self.save_catalog(&previous),
        )
        .await?;

        let value = match outcome {
            SyncOutcome::Synced => next,
            SyncOutcome::RolledBack => previous,
        };
        Ok(Synced { value, outcome })
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_activity(&self, draft: ActivityDraft) -> Result<Activity> {
        let catalog = self.catalog().await?;
        let id = catalog.next_id(self.clock.time());
        let next = catalog.add(draft, id.clone())?;
        self.save_catalog(&next).await?;

        if next.exceeds_day() {
            info!(
                "Scheduled hours add up to {:.1}, more than a day has",
                next.total_hours()
            );
        }

        next.get(&id)
            .cloned()
            .with_context(|| format!("Activity {id} vanished right after being added"))
    }

    #[instrument(skip(self, patch))]
    pub async fn edit_activity(&self, id: &str, patch: ActivityPatch) -> Result<Catalog> {
        let next = self.catalog().await?.edit(id, patch)?;
        self.save_catalog(&next).await?;
        Ok(next)
    }

    #[instrument(skip(self))]
    pub async fn delete_activity(&self, id: &str) -> Result<Synced<Catalog>> {
        let previous = self.catalog().await?;
        let next = previous.delete(id)?;
        let payload = DeletePayload {
            task_id: id.to_string(),
        };
        self.sync_catalog(previous, next, || self.remote.delete_task(payload))
            .await
    }

    /// Moves `id` to `target_index` within its category.
    #[instrument(skip(self))]
    pub async fn reorder_activity(&self, id: &str, target_index: usize) -> Result<Synced<Catalog>> {
        let previous = self.catalog().await?;
        let next = previous.reorder(id, target_index)?;
        self.commit_reorder(previous, next, id).await
    }

    /// Moves `id` to the place of `over_id`. `None` when they are in different categories, in
    /// which case nothing is written.
    #[instrument(skip(self))]
    pub async fn reorder_onto(&self, id: &str, over_id: &str) -> Result<Option<Synced<Catalog>>> {
        let previous = self.catalog().await?;
        let Some(next) = previous.reorder_onto(id, over_id)? else {
            return Ok(None);
        };
        self.commit_reorder(previous, next, id).await.map(Some)
    }

    async fn commit_reorder(
        &self,
        previous: Catalog,
        next: Catalog,
        id: &str,
    ) -> Result<Synced<Catalog>> {
        let category = next
            .get(id)
            .map(|v| v.category)
            .with_context(|| format!("No activity with id {id}"))?;
        let payload = next
            .in_category(category)
            .map(|v| ReorderEntry {
                task_id: v.id.clone(),
                new_priority_order: v.priority_order,
            })
            .collect::<Vec<_>>();
        self.sync_catalog(previous, next, || self.remote.reorder_tasks(payload))
            .await
    }

    pub async fn reset_catalog(&self) -> Result<Catalog> {
        let catalog = Catalog::defaults();
        self.save_catalog(&catalog).await?;
        info!("Catalog reset to defaults");
        Ok(catalog)
    }

    /// Completion state for `date`, reconciled with the current catalog.
    pub async fn day(&self, date: NaiveDate) -> Result<DayState> {
        let catalog = self.catalog().await?;
        let saved =
            load::<Vec<DailyActivity>>(&self.store, &StorageKey::DailyActivities(date)).await?;
        Ok(DayState::for_date(date, &catalog, saved.as_deref()))
    }

    async fn save_day(&self, day: &DayState) -> Result<()> {
        save(
            &self.store,
            &StorageKey::DailyActivities(day.date()),
            day.activities(),
        )
        .await
    }

    async fn sync_day(
        &self,
        previous: DayState,
        next: DayState,
        payload: CompletionPayload,
    ) -> Result<Synced<DayState>> {
        let outcome = optimistic_update(
            || self.save_day(&next),
            || self.remote.set_completion(payload),
            || self.save_day(&previous),
        )
        .await?;

        let value = match outcome {
            SyncOutcome::Synced => next,
            SyncOutcome::RolledBack => previous,
        };
        Ok(Synced { value, outcome })
    }

    /// Flips an activity, or one of its sessions when `session` (1-based) is given.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        date: NaiveDate,
        activity_id: &str,
        session: Option<usize>,
    ) -> Result<Synced<DayState>> {
        let previous = self.day(date).await?;
        let subtask_id = session_id(&previous, activity_id, session)?;
        let next = previous.toggle(activity_id, subtask_id.as_deref())?;

        let payload = completion_payload(&next, activity_id, subtask_id)?;
        self.sync_day(previous, next, payload).await
    }

    /// Marks a session as done, as when its focus timer runs out.
    #[instrument(skip(self))]
    pub async fn complete_session(
        &self,
        date: NaiveDate,
        activity_id: &str,
        session: usize,
    ) -> Result<Synced<DayState>> {
        let previous = self.day(date).await?;
        let subtask_id = session_id(&previous, activity_id, Some(session))?
            .with_context(|| format!("Activity {activity_id} has no sessions"))?;
        let next = previous.complete_subtask(activity_id, &subtask_id)?;

        let payload = completion_payload(&next, activity_id, Some(subtask_id))?;
        self.sync_day(previous, next, payload).await
    }

    /// Writes the summary for `date`. Celebrates the first time a date is closed at 100%.
    #[instrument(skip(self))]
    pub async fn done_for_day(&self, date: NaiveDate) -> Result<DayClosed> {
        let summary = self.day(date).await?.summarize();
        save(&self.store, &StorageKey::DaySummary(date), &summary).await?;
        info!("Closed {date} at {}", summary.completion);

        deliver(
            self.notifier.as_ref(),
            "Day closed",
            &format!(
                "{} completed ({} of {})",
                summary.completion, summary.completed_count, summary.activities_count
            ),
        );

        let gate = load::<CelebrationGate>(&self.store, &StorageKey::Celebrations)
            .await?
            .unwrap_or_default();
        let celebrated = match gate.admit(&summary) {
            Some(next) => {
                save(&self.store, &StorageKey::Celebrations, &next).await?;
                deliver(
                    self.notifier.as_ref(),
                    "Perfect day!",
                    "Every activity is done. Well earned.",
                );
                true
            }
            None => {
                debug!("No celebration for {date}");
                false
            }
        };

        Ok(DayClosed {
            summary,
            celebrated,
        })
    }

    async fn summaries(&self, range: DateRange) -> Vec<(NaiveDate, Option<DaySummary>)> {
        summaries_between(&self.store, range).collect().await
    }

    pub async fn stats(&self, range: DateRange) -> Result<RangeStats> {
        let catalog = self.catalog().await?;
        let days = self.summaries(range).await;
        Ok(aggregate(range, &catalog, &days))
    }

    pub async fn year_stats(&self, range: DateRange) -> Result<YearStats> {
        let catalog = self.catalog().await?;
        let days = self.summaries(range).await;
        Ok(aggregate_year(range, &catalog, &days))
    }

    pub async fn theme(&self) -> Result<Theme> {
        Ok(load::<Theme>(&self.store, &StorageKey::Theme)
            .await?
            .unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Synced<Theme>> {
        let previous = self.theme().await?;
        let outcome = optimistic_update(
            || save(&self.store, &StorageKey::Theme, &theme),
            || {
                self.remote
                    .set_preference(PreferencePayload::Theme { theme })
            },
            || save(&self.store, &StorageKey::Theme, &previous),
        )
        .await?;

        let value = match outcome {
            SyncOutcome::Synced => theme,
            SyncOutcome::RolledBack => previous,
        };
        Ok(Synced { value, outcome })
    }

    /// Switches to the opposite of what is currently shown.
    pub async fn toggle_theme(&self, system_is_dark: bool) -> Result<Synced<Theme>> {
        let current = self.theme().await?;
        self.set_theme(current.toggled(system_is_dark)).await
    }

    pub async fn color_theme(&self) -> Result<ColorThemePreference> {
        Ok(
            load::<ColorThemePreference>(&self.store, &StorageKey::ColorTheme)
                .await?
                .unwrap_or_default(),
        )
    }

    pub async fn set_color_theme(&self, id: ColorThemeId) -> Result<Synced<ColorThemePreference>> {
        let previous = self.color_theme().await?;
        let next = previous.select(id)?;
        let outcome = optimistic_update(
            || save(&self.store, &StorageKey::ColorTheme, &next),
            || {
                self.remote
                    .set_preference(PreferencePayload::ColorTheme { color_theme: id })
            },
            || save(&self.store, &StorageKey::ColorTheme, &previous),
        )
        .await?;

        let value = match outcome {
            SyncOutcome::Synced => next,
            SyncOutcome::RolledBack => previous,
        };
        Ok(Synced { value, outcome })
    }
}

fn session_id(day: &DayState, activity_id: &str, session: Option<usize>) -> Result<Option<String>> {
    let Some(number) = session else {
        return Ok(None);
    };
    let activity = day
        .get(activity_id)
        .with_context(|| format!("No activity with id {activity_id} on {}", day.date()))?;
    let subtask = activity
        .session(number)
        .with_context(|| format!("{} has no session {number}", activity.name))?;
    Ok(Some(subtask.id.clone()))
}

/// Remote view of a toggle: the session's flag when one was touched, else the activity's.
fn completion_payload(
    day: &DayState,
    activity_id: &str,
    subtask_id: Option<String>,
) -> Result<CompletionPayload> {
    let activity = day
        .get(activity_id)
        .with_context(|| format!("No activity with id {activity_id} on {}", day.date()))?;
    let payload = match subtask_id {
        Some(subtask_id) => CompletionPayload {
            completed: activity
                .subtask(&subtask_id)
                .map(|v| v.completed)
                .unwrap_or(activity.completed),
            task_id: subtask_id,
        },
        None => CompletionPayload {
            task_id: activity.id.clone(),
            completed: activity.completed,
        },
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;

    use crate::{
        catalog::{ActivityDraft, Catalog, Category},
        preferences::{ColorThemeId, Theme},
        stats::range::{DateRange, Horizon},
        storage::{load, memory_store::MemoryStore, save, StorageKey},
        sync::{MockRemoteSync, StubRemote, SyncOutcome},
        timer::notify::MockNotifier,
        tracker::DailyActivity,
        utils::{clock::test_clock::FixedClock, logging::TEST_LOGGING},
    };

    use super::App;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn quiet() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().returning(|_, _| Ok(()));
        notifier
    }

    fn app(remote: impl crate::sync::RemoteSync + 'static, notifier: MockNotifier) -> App<MemoryStore> {
        App::new(
            MemoryStore::default(),
            Box::new(remote),
            Box::new(notifier),
            Box::new(FixedClock::on(TEST_DATE)),
        )
    }

    fn draft(name: &str, category: Category, sessions: u32, focus_minutes: u32) -> ActivityDraft {
        ActivityDraft {
            name: name.into(),
            category,
            total_hours: 1.,
            sessions,
            focus_minutes,
            break_minutes: 5,
            icon: None,
            color: None,
        }
    }

    /// Catalog with activity A (no sessions) and B (two sessions).
    async fn two_activity_app(notifier: MockNotifier) -> Result<(App<MemoryStore>, String, String)> {
        let app = app(StubRemote, notifier);
        save(&app.store, &StorageKey::Catalog, &Catalog::default()).await?;
        let a = app.add_activity(draft("A", Category::Work, 0, 0)).await?;
        let b = app.add_activity(draft("B", Category::Work, 2, 25)).await?;
        Ok((app, a.id, b.id))
    }

    #[tokio::test]
    async fn test_fresh_store_persists_defaults() -> Result<()> {
        *TEST_LOGGING;
        let app = app(StubRemote, quiet());
        assert!(app.store.is_empty());

        let catalog = app.catalog().await?;
        assert_eq!(catalog, Catalog::defaults());
        assert_eq!(
            load::<Catalog>(&app.store, &StorageKey::Catalog).await?,
            Some(Catalog::defaults())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_catalog_falls_back_to_defaults() -> Result<()> {
        *TEST_LOGGING;
        let app = app(StubRemote, quiet());
        crate::storage::KeyValueStore::set(&app.store, &StorageKey::Catalog, "{oops".into()).await?;

        assert_eq!(app.catalog().await?, Catalog::defaults());
        Ok(())
    }

    #[tokio::test]
    async fn test_perfect_day_celebrates_once() -> Result<()> {
        *TEST_LOGGING;
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|title, _| title == "Perfect day!")
            .times(1)
            .returning(|_, _| Ok(()));
        notifier
            .expect_notify()
            .withf(|title, _| title == "Day closed")
            .times(2)
            .returning(|_, _| Ok(()));
        let (app, a, b) = two_activity_app(notifier).await?;

        let day = app.toggle(TEST_DATE, &a, None).await?.value;
        assert!(day.get(&a).unwrap().completed);

        let day = app.toggle(TEST_DATE, &b, Some(1)).await?.value;
        assert!(!day.get(&b).unwrap().completed);

        let day = app.toggle(TEST_DATE, &b, Some(2)).await?.value;
        assert!(day.get(&b).unwrap().completed);

        let first = app.done_for_day(TEST_DATE).await?;
        assert!(first.summary.completion.is_full());
        assert!(first.celebrated);

        let second = app.done_for_day(TEST_DATE).await?;
        assert!(!second.celebrated);
        assert_eq!(second.summary, first.summary);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggles_survive_catalog_edits() -> Result<()> {
        *TEST_LOGGING;
        let (app, a, b) = two_activity_app(quiet()).await?;
        app.toggle(TEST_DATE, &b, Some(1)).await?;
        app.toggle(TEST_DATE, &a, None).await?;

        app.delete_activity(&a).await?;
        app.add_activity(draft("C", Category::Health, 0, 0)).await?;

        let day = app.day(TEST_DATE).await?;
        assert!(day.get(&a).is_none());
        assert!(day.get(&b).unwrap().session(1).unwrap().completed);
        assert_eq!(day.total_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_readded_activity_starts_fresh() -> Result<()> {
        *TEST_LOGGING;
        let app = app(StubRemote, quiet());
        save(&app.store, &StorageKey::Catalog, &Catalog::default()).await?;

        let old = app.add_activity(draft("Old", Category::Work, 0, 0)).await?;
        app.toggle(TEST_DATE, &old.id, None).await?;
        app.delete_activity(&old.id).await?;

        // Same clock reading as the deleted activity.
        let new = app.add_activity(draft("Brand new", Category::Work, 0, 0)).await?;
        assert_ne!(new.id, old.id);

        let day = app.day(TEST_DATE).await?;
        assert!(!day.get(&new.id).unwrap().completed);
        assert_eq!(day.completed_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_completion_is_rolled_back() -> Result<()> {
        *TEST_LOGGING;
        let mut remote = MockRemoteSync::new();
        remote
            .expect_set_completion()
            .withf(|payload| payload.completed)
            .times(1)
            .returning(|_| Err(anyhow!("offline")));
        let app = app(remote, quiet());
        let id = app.catalog().await?.activities()[0].id.clone();
        let session = app.catalog().await?.activities()[0].has_sessions().then_some(1);

        let synced = app.toggle(TEST_DATE, &id, session).await?;
        assert_eq!(synced.outcome, SyncOutcome::RolledBack);
        assert_eq!(synced.value.completed_count(), 0);

        let stored =
            load::<Vec<DailyActivity>>(&app.store, &StorageKey::DailyActivities(TEST_DATE))
                .await?
                .unwrap();
        assert!(stored.iter().all(|v| !v.completed && v.subtasks.iter().all(|s| !s.completed)));
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_delete_restores_catalog() -> Result<()> {
        *TEST_LOGGING;
        let mut remote = MockRemoteSync::new();
        remote
            .expect_delete_task()
            .withf(|payload| payload.task_id == "1")
            .times(1)
            .returning(|_| Err(anyhow!("offline")));
        let app = app(remote, quiet());

        let synced = app.delete_activity("1").await?;
        assert_eq!(synced.outcome, SyncOutcome::RolledBack);
        assert_eq!(app.catalog().await?, Catalog::defaults());
        Ok(())
    }

    #[tokio::test]
    async fn test_reorder_syncs_whole_category() -> Result<()> {
        *TEST_LOGGING;
        let mut remote = MockRemoteSync::new();
        remote
            .expect_reorder_tasks()
            .withf(|entries| {
                entries.len() == 4
                    && entries[0].task_id == "3"
                    && entries
                        .iter()
                        .enumerate()
                        .all(|(i, v)| v.new_priority_order == i as u32)
            })
            .times(1)
            .returning(|_| Ok(()));
        let app = app(remote, quiet());

        let synced = app.reorder_activity("3", 0).await?;
        assert_eq!(synced.outcome, SyncOutcome::Synced);
        let ids = app
            .catalog()
            .await?
            .in_category(Category::Work)
            .map(|v| v.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["3", "1", "2", "4"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_cross_category_reorder_writes_nothing() -> Result<()> {
        *TEST_LOGGING;
        let mut remote = MockRemoteSync::new();
        remote.expect_reorder_tasks().never();
        let app = app(remote, quiet());

        assert_eq!(app.reorder_onto("1", "9").await?, None);
        assert_eq!(app.catalog().await?, Catalog::defaults());
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_over_closed_days() -> Result<()> {
        *TEST_LOGGING;
        let (app, a, _) = two_activity_app(quiet()).await?;
        let yesterday = TEST_DATE.pred_opt().unwrap();

        app.toggle(yesterday, &a, None).await?;
        app.done_for_day(yesterday).await?;
        app.done_for_day(TEST_DATE).await?;

        let stats = app
            .stats(DateRange::containing(TEST_DATE, Horizon::Week))
            .await?;
        assert_eq!(stats.tracked_days, 2);
        assert_eq!(*stats.average.unwrap(), 25.);
        assert_eq!(stats.completed_activities, 1);

        let year = app
            .year_stats(DateRange::containing(TEST_DATE, Horizon::Year))
            .await?;
        assert_eq!(year.best_month().unwrap().month, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_theme_keeps_previous_value() -> Result<()> {
        *TEST_LOGGING;
        let mut remote = MockRemoteSync::new();
        remote
            .expect_set_preference()
            .times(1)
            .returning(|_| Err(anyhow!("offline")));
        let app = app(remote, quiet());

        let synced = app.set_theme(Theme::Dark).await?;
        assert_eq!(synced.outcome, SyncOutcome::RolledBack);
        assert_eq!(app.theme().await?, Theme::System);
        Ok(())
    }

    #[tokio::test]
    async fn test_theme_and_color_preferences() -> Result<()> {
        *TEST_LOGGING;
        let app = app(StubRemote, quiet());

        assert_eq!(app.toggle_theme(true).await?.value, Theme::Light);
        assert_eq!(app.toggle_theme(true).await?.value, Theme::Dark);
        assert_eq!(app.theme().await?, Theme::Dark);

        app.set_color_theme(ColorThemeId::Sunset).await?;
        assert_eq!(app.color_theme().await?.color_theme, ColorThemeId::Sunset);
        Ok(())
    }
}
