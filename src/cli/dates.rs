use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct DateArgs {
    #[arg(
        long,
        short,
        help = "Day to work with, today by default. Examples are \"yesterday\", \"last friday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl DateArgs {
    pub fn resolve(&self, now: DateTime<Local>) -> Result<NaiveDate> {
        let Some(date) = &self.date else {
            return Ok(now.date_naive());
        };

        match parse_date_string(date, now, self.date_style.into()) {
            Ok(v) => Ok(v.date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {date:?}: {e}"),
                )
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use super::{DateArgs, DateStyle};

    fn args(date: Option<&str>, date_style: DateStyle) -> DateArgs {
        DateArgs {
            date: date.map(String::from),
            date_style,
        }
    }

    #[test]
    fn test_dates_follow_style() {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();

        assert_eq!(
            args(None, DateStyle::Uk).resolve(now).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
        );
        assert_eq!(
            args(Some("15/03/2025"), DateStyle::Uk).resolve(now).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            args(Some("03/15/2025"), DateStyle::Us).resolve(now).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            args(Some("yesterday"), DateStyle::Uk).resolve(now).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 19).unwrap()
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        assert!(args(Some("not a date"), DateStyle::Uk).resolve(now).is_err());
    }
}
