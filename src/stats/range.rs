use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use clap::ValueEnum;
use futures::{stream, Stream, StreamExt};
use now::DateTimeNow;
use tracing::error;

use crate::{
    storage::{load, KeyValueStore, StorageKey},
    tracker::summary::DaySummary,
};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Horizon {
    Week,
    Month,
    Year,
}

impl Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Horizon::Week => write!(f, "week"),
            Horizon::Month => write!(f, "month"),
            Horizon::Year => write!(f, "year"),
        }
    }
}

/// Contiguous range of days, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new_opt(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// The week (starting on Sunday), month or year `anchor` falls into.
    pub fn containing(anchor: NaiveDate, horizon: Horizon) -> Self {
        let moment = midnight(anchor);
        match horizon {
            Horizon::Week => {
                let start = anchor - Days::new(anchor.weekday().num_days_from_sunday() as u64);
                Self {
                    start,
                    end: start + Days::new(6),
                }
            }
            Horizon::Month => Self {
                start: moment.beginning_of_month().date_naive(),
                end: moment.end_of_month().date_naive(),
            },
            Horizon::Year => Self {
                start: moment.beginning_of_year().date_naive(),
                end: moment.end_of_year().date_naive(),
            },
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |v| *v <= end)
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Reads the summary of every day in `range`, in chronological order. A few reads are kept in
/// flight at once. A date whose summary can't be read is logged and reported as untracked.
pub fn summaries_between(
    storage: impl KeyValueStore,
    range: DateRange,
) -> impl Stream<Item = (NaiveDate, Option<DaySummary>)> {
    let storage = Arc::new(storage);

    stream::iter(range.days())
        .map(move |day| {
            let storage = storage.clone();
            async move {
                let key = StorageKey::DaySummary(day);
                (day, load::<DaySummary>(&storage, &key).await)
            }
        })
        .buffered(4)
        .map(|(day, summary)| match summary {
            Ok(v) => (day, v),
            Err(e) => {
                error!("Failed to read summary for {day} {e:?}");
                (day, None)
            }
        })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use futures::StreamExt;

    use crate::{
        storage::{memory_store::MemoryStore, save, KeyValueStore, StorageKey},
        tracker::summary::DaySummary,
        utils::percentage::Percentage,
    };

    use super::{summaries_between, DateRange, Horizon};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        let week = DateRange::containing(date(2024, 4, 5), Horizon::Week);
        assert_eq!(week.start(), date(2024, 3, 31));
        assert_eq!(week.end(), date(2024, 4, 6));
        assert_eq!(week.day_count(), 7);

        let sunday = DateRange::containing(date(2024, 3, 31), Horizon::Week);
        assert_eq!(sunday, week);
    }

    #[test]
    fn test_month_and_year() {
        let month = DateRange::containing(date(2024, 2, 14), Horizon::Month);
        assert_eq!(month.start(), date(2024, 2, 1));
        assert_eq!(month.end(), date(2024, 2, 29));

        let year = DateRange::containing(date(2024, 7, 4), Horizon::Year);
        assert_eq!(year.start(), date(2024, 1, 1));
        assert_eq!(year.end(), date(2024, 12, 31));
        assert_eq!(year.day_count(), 366);
        assert_eq!(year.days().count(), 366);
    }

    #[test]
    fn test_range_bounds() {
        assert!(DateRange::new_opt(date(2024, 1, 2), date(2024, 1, 1)).is_none());
        let range = DateRange::new_opt(date(2024, 1, 1), date(2024, 1, 3)).unwrap();
        assert!(range.contains(date(2024, 1, 3)));
        assert!(!range.contains(date(2024, 1, 4)));
    }

    #[tokio::test]
    async fn test_summaries_between() -> Result<()> {
        let store = MemoryStore::default();
        let tracked = date(2024, 1, 2);
        save(
            &store,
            &StorageKey::DaySummary(tracked),
            &DaySummary {
                date: tracked,
                completion: Percentage::new_opt(40.).unwrap(),
                activities_count: 5,
                completed_count: 2,
                activities: vec![],
            },
        )
        .await?;
        store
            .set(&StorageKey::DaySummary(date(2024, 1, 3)), "garbage".into())
            .await?;

        let range = DateRange::new_opt(date(2024, 1, 1), date(2024, 1, 4)).unwrap();
        let days = summaries_between(&store, range).collect::<Vec<_>>().await;

        assert_eq!(
            days.iter().map(|v| v.0).collect::<Vec<_>>(),
            range.days().collect::<Vec<_>>()
        );
        assert_eq!(
            days.iter().map(|v| v.1.is_some()).collect::<Vec<_>>(),
            vec![false, true, false, false]
        );
        Ok(())
    }
}
