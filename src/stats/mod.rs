//! Rollups over stored day summaries.
//!
//! Days without a summary are untracked: they count towards the size of the range but never
//! towards averages. Averages are means of the per-day percentages, so a day with few activities
//! weighs as much as a day with many.

pub mod range;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::{
    catalog::{Catalog, Category},
    tracker::summary::{CategoryHours, DaySummary},
    utils::percentage::Percentage,
};

use range::DateRange;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayCompletion {
    pub date: NaiveDate,
    pub completion: Percentage,
}

/// How often an activity was completed on the days it was scheduled. Activities are matched by
/// name so renamed ids across history still line up.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRate {
    pub name: String,
    pub category: Category,
    pub completed: usize,
    pub appeared: usize,
}

impl ActivityRate {
    pub fn rate(&self) -> Option<Percentage> {
        (self.appeared > 0).then(|| Percentage::of_counts(self.completed, self.appeared))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeStats {
    pub range: DateRange,
    /// Every day of the range with its completion, `None` for untracked days.
    pub daily: Vec<(NaiveDate, Option<Percentage>)>,
    pub tracked_days: usize,
    pub average: Option<Percentage>,
    pub max_streak: usize,
    /// Highest completion among days that got anything done, `None` when every tracked day sat
    /// at zero.
    pub best_day: Option<DayCompletion>,
    pub worst_day: Option<DayCompletion>,
    pub completed_activities: usize,
    pub activities: Vec<ActivityRate>,
    pub categories: BTreeMap<Category, CategoryHours>,
}

impl RangeStats {
    pub fn days_in_range(&self) -> usize {
        self.range.day_count()
    }

    pub fn average_completed_per_day(&self) -> Option<f64> {
        (self.tracked_days > 0).then(|| self.completed_activities as f64 / self.tracked_days as f64)
    }
}

/// Computes statistics for `range`. `days` holds what was read from storage for each date,
/// dates outside the range are ignored. `catalog` only contributes activities that have no
/// history yet.
pub fn aggregate(
    range: DateRange,
    catalog: &Catalog,
    days: &[(NaiveDate, Option<DaySummary>)],
) -> RangeStats {
    let mut days = days
        .iter()
        .filter(|(date, _)| range.contains(*date))
        .collect::<Vec<_>>();
    days.sort_by_key(|(date, _)| *date);
    let summaries = || days.iter().filter_map(|(_, summary)| summary.as_ref());

    let tracked = summaries()
        .map(|v| DayCompletion {
            date: v.date,
            completion: v.completion,
        })
        .collect::<Vec<_>>();

    let productive = tracked
        .iter()
        .filter(|v| *v.completion > 0.)
        .copied()
        .collect::<Vec<_>>();

    RangeStats {
        range,
        daily: range
            .days()
            .map(|date| {
                let completion = tracked
                    .iter()
                    .find(|v| v.date == date)
                    .map(|v| v.completion);
                (date, completion)
            })
            .collect(),
        tracked_days: tracked.len(),
        average: Percentage::mean(tracked.iter().map(|v| v.completion)),
        max_streak: max_streak(&range, &tracked),
        best_day: first_extreme(&productive, |candidate, best| candidate > best),
        worst_day: first_extreme(&tracked, |candidate, worst| candidate < worst),
        completed_activities: summaries().map(|v| v.completed_count).sum(),
        activities: activity_rates(summaries(), catalog),
        categories: summaries().fold(BTreeMap::new(), |mut acc, summary| {
            for (category, hours) in summary.category_hours() {
                *acc.entry(category).or_insert_with(CategoryHours::default) += hours;
            }
            acc
        }),
    }
}

/// Longest run of consecutive fully completed days. Untracked days break the run.
fn max_streak(range: &DateRange, tracked: &[DayCompletion]) -> usize {
    let mut current = 0;
    let mut longest = 0;
    for date in range.days() {
        match tracked.iter().find(|v| v.date == date) {
            Some(day) if day.completion.is_full() => {
                current += 1;
                longest = longest.max(current);
            }
            Some(_) | None => current = 0,
        }
    }
    longest
}

/// Ties go to the earliest day.
fn first_extreme(
    tracked: &[DayCompletion],
    replaces: impl Fn(Percentage, Percentage) -> bool,
) -> Option<DayCompletion> {
    tracked.iter().fold(None, |found, day| match found {
        Some(found) if !replaces(day.completion, found.completion) => Some(found),
        Some(_) | None => Some(*day),
    })
}

fn activity_rates<'a>(
    summaries: impl Iterator<Item = &'a DaySummary>,
    catalog: &Catalog,
) -> Vec<ActivityRate> {
    let mut rates = BTreeMap::<String, ActivityRate>::new();
    for activity in summaries.flat_map(|v| v.activities.iter()) {
        let rate = rates
            .entry(activity.name.clone())
            .or_insert_with(|| ActivityRate {
                name: activity.name.clone(),
                category: activity.category,
                completed: 0,
                appeared: 0,
            });
        rate.category = activity.category;
        rate.appeared += 1;
        if activity.completed {
            rate.completed += 1;
        }
    }

    for activity in catalog.activities() {
        rates
            .entry(activity.name.clone())
            .or_insert_with(|| ActivityRate {
                name: activity.name.clone(),
                category: activity.category,
                completed: 0,
                appeared: 0,
            });
    }

    rates.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthStats {
    /// 1 to 12.
    pub month: u32,
    pub tracked_days: usize,
    pub average: Option<Percentage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearStats {
    pub overall: RangeStats,
    pub months: Vec<MonthStats>,
}

impl YearStats {
    /// Highest monthly average above zero, earliest month on ties.
    pub fn best_month(&self) -> Option<MonthStats> {
        self.months
            .iter()
            .filter_map(|v| v.average.map(|average| (v, average)))
            .filter(|(_, average)| **average > 0.)
            .fold(None, |best: Option<(&MonthStats, Percentage)>, (month, average)| {
                match best {
                    Some((_, best_average)) if average <= best_average => best,
                    Some(_) | None => Some((month, average)),
                }
            })
            .map(|(month, _)| *month)
    }

    pub fn months_with_data(&self) -> usize {
        self.months.iter().filter(|v| v.tracked_days > 0).count()
    }
}

/// [aggregate] plus a breakdown per calendar month of the range.
pub fn aggregate_year(
    range: DateRange,
    catalog: &Catalog,
    days: &[(NaiveDate, Option<DaySummary>)],
) -> YearStats {
    let overall = aggregate(range, catalog, days);

    let mut months = Vec::<MonthStats>::new();
    for date in range.days() {
        if months.last().map_or(true, |v| v.month != date.month()) {
            let completions = overall
                .daily
                .iter()
                .filter(|(day, _)| day.month() == date.month() && day.year() == date.year())
                .filter_map(|(_, completion)| *completion)
                .collect::<Vec<_>>();
            months.push(MonthStats {
                month: date.month(),
                tracked_days: completions.len(),
                average: Percentage::mean(completions),
            });
        }
    }

    YearStats { overall, months }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use crate::{
        catalog::{Catalog, Category},
        stats::range::{DateRange, Horizon},
        tracker::{summary::DaySummary, DailyActivity},
        utils::percentage::Percentage,
    };

    use super::{aggregate, aggregate_year};

    const WEEK_START: NaiveDate = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

    fn activity(id: &str, name: &str, category: Category, hours: f64, completed: bool) -> DailyActivity {
        DailyActivity {
            id: id.into(),
            name: name.into(),
            category,
            hours,
            completed,
            icon: String::new(),
            color: String::new(),
            has_timer: false,
            break_minutes: 0,
            subtasks: vec![],
        }
    }

    fn summary(date: NaiveDate, completion: f64) -> DaySummary {
        DaySummary {
            date,
            completion: Percentage::new_opt(completion).unwrap(),
            activities_count: 0,
            completed_count: 0,
            activities: vec![],
        }
    }

    fn with_activities(date: NaiveDate, activities: Vec<DailyActivity>) -> DaySummary {
        let completed = activities.iter().filter(|v| v.completed).count();
        DaySummary {
            date,
            completion: Percentage::of_counts(completed, activities.len()),
            activities_count: activities.len(),
            completed_count: completed,
            activities,
        }
    }

    fn week(completions: [Option<f64>; 7]) -> Vec<(NaiveDate, Option<DaySummary>)> {
        WEEK_START
            .iter_days()
            .zip(completions)
            .map(|(date, completion)| (date, completion.map(|v| summary(date, v))))
            .collect()
    }

    fn week_range() -> DateRange {
        DateRange::containing(WEEK_START, Horizon::Week)
    }

    #[test]
    fn test_average_ignores_untracked_days() {
        let days = week([Some(70.), None, Some(100.), None, None, Some(40.), None]);
        let stats = aggregate(week_range(), &Catalog::default(), &days);

        assert_eq!(stats.tracked_days, 3);
        assert_eq!(stats.days_in_range(), 7);
        assert!((*stats.average.unwrap() - 70.).abs() < 1e-9);
        assert_eq!(stats.daily[1], (WEEK_START.succ_opt().unwrap(), None));
    }

    #[test]
    fn test_no_tracked_days() {
        let stats = aggregate(week_range(), &Catalog::default(), &week([None; 7]));
        assert_eq!(stats.average, None);
        assert_eq!(stats.best_day, None);
        assert_eq!(stats.max_streak, 0);
        assert_eq!(stats.average_completed_per_day(), None);
    }

    #[test]
    fn test_streak_breaks_on_gaps_and_partial_days() {
        let days = week([
            Some(100.),
            Some(100.),
            None,
            Some(100.),
            Some(100.),
            Some(100.),
            Some(50.),
        ]);
        assert_eq!(aggregate(week_range(), &Catalog::default(), &days).max_streak, 3);

        let days = week([Some(100.), Some(99.9), Some(100.), None, None, None, None]);
        assert_eq!(aggregate(week_range(), &Catalog::default(), &days).max_streak, 1);
    }

    #[test]
    fn test_best_and_worst_prefer_first_occurrence() {
        let days = week([Some(80.), Some(20.), Some(80.), Some(20.), None, None, None]);
        let stats = aggregate(week_range(), &Catalog::default(), &days);

        let best = stats.best_day.unwrap();
        assert_eq!(best.date, WEEK_START);
        assert_eq!(*best.completion, 80.);

        let worst = stats.worst_day.unwrap();
        assert_eq!(worst.date.day(), 1);
        assert_eq!(*worst.completion, 20.);
    }

    #[test]
    fn test_zero_days_are_never_best() {
        let days = week([Some(0.), None, Some(0.), None, None, None, None]);
        let stats = aggregate(week_range(), &Catalog::default(), &days);
        assert_eq!(stats.best_day, None);
        assert_eq!(stats.worst_day.unwrap().date, WEEK_START);

        let days = week([Some(0.), Some(30.), None, None, None, None, None]);
        let stats = aggregate(week_range(), &Catalog::default(), &days);
        assert_eq!(*stats.best_day.unwrap().completion, 30.);
    }

    #[test]
    fn test_year_without_progress_has_no_best_month() {
        let range = DateRange::containing(WEEK_START, Horizon::Year);
        let days = vec![(WEEK_START, Some(summary(WEEK_START, 0.)))];
        let year = aggregate_year(range, &Catalog::default(), &days);
        assert_eq!(year.months_with_data(), 1);
        assert_eq!(year.best_month(), None);
    }

    #[test]
    fn test_activity_rates_match_by_name() {
        let first = WEEK_START;
        let second = WEEK_START.succ_opt().unwrap();
        let days = vec![
            (
                first,
                Some(with_activities(
                    first,
                    vec![
                        activity("1", "Gym", Category::Health, 1., true),
                        activity("2", "Read", Category::Learning, 1., true),
                    ],
                )),
            ),
            (
                second,
                Some(with_activities(
                    second,
                    vec![activity("99", "Gym", Category::Health, 1., false)],
                )),
            ),
        ];

        let stats = aggregate(week_range(), &Catalog::defaults(), &days);
        let gym = stats.activities.iter().find(|v| v.name == "Gym").unwrap();
        assert_eq!((gym.completed, gym.appeared), (1, 2));
        assert_eq!(*gym.rate().unwrap(), 50.);

        let read = stats.activities.iter().find(|v| v.name == "Read").unwrap();
        assert_eq!(*read.rate().unwrap(), 100.);

        // Catalog activities without history are listed without a rate.
        let sleep = stats.activities.iter().find(|v| v.name == "Sleep").unwrap();
        assert_eq!(sleep.rate(), None);

        assert_eq!(stats.completed_activities, 2);
        assert_eq!(stats.average_completed_per_day(), Some(1.));
    }

    #[test]
    fn test_category_rollup() {
        let first = WEEK_START;
        let second = WEEK_START.succ_opt().unwrap();
        let day = |date, done| {
            with_activities(
                date,
                vec![
                    activity("w", "Work", Category::Work, 2., done),
                    activity("s", "Sleep", Category::Health, 7., true),
                ],
            )
        };
        let days = vec![(first, Some(day(first, true))), (second, Some(day(second, false)))];

        let stats = aggregate(week_range(), &Catalog::default(), &days);
        let work = stats.categories[&Category::Work];
        assert_eq!(work.scheduled, 4.);
        assert_eq!(work.completed, 2.);
        assert_eq!(*work.rate(), 50.);
        assert_eq!(*stats.categories[&Category::Health].rate(), 100.);
    }

    #[test]
    fn test_days_outside_range_are_ignored() {
        let outside = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let days = vec![(outside, Some(summary(outside, 100.)))];
        let stats = aggregate(week_range(), &Catalog::default(), &days);
        assert_eq!(stats.tracked_days, 0);
    }

    #[test]
    fn test_year_months() {
        let anchor = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let range = DateRange::containing(anchor, Horizon::Year);
        let feb = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let mar_a = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mar_b = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let days = range
            .days()
            .map(|date| {
                let summary = match date {
                    d if d == feb => Some(summary(d, 60.)),
                    d if d == mar_a => Some(summary(d, 100.)),
                    d if d == mar_b => Some(summary(d, 20.)),
                    _ => None,
                };
                (date, summary)
            })
            .collect::<Vec<_>>();

        let year = aggregate_year(range, &Catalog::default(), &days);
        assert_eq!(year.months.len(), 12);
        assert_eq!(year.months_with_data(), 2);
        assert_eq!(year.months[1].tracked_days, 1);
        assert_eq!(*year.months[2].average.unwrap(), 60.);
        assert_eq!(year.months[0].average, None);

        // February and March tie at 60%, the earlier month wins.
        assert_eq!(year.best_month().unwrap().month, 2);
        assert_eq!(*year.overall.average.unwrap(), 60.);
    }
}
