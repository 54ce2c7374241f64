use anyhow::Result;
use chrono::Local;

use crate::{
    app::App,
    stats::{
        range::{DateRange, Horizon},
        RangeStats, YearStats,
    },
    storage::KeyValueStore,
};

use super::{
    dates::DateArgs,
    format::{category_style, heading, optional_percentage, percentage},
};

#[derive(Debug, clap::Args)]
pub struct StatsCommand {
    #[arg(help = "Range to summarize, the one containing the date")]
    horizon: Horizon,
    #[command(flatten)]
    date: DateArgs,
}

pub async fn process_stats_command(
    app: &App<impl KeyValueStore>,
    StatsCommand { horizon, date }: StatsCommand,
) -> Result<()> {
    let range = DateRange::containing(date.resolve(Local::now())?, horizon);
    match horizon {
        Horizon::Week | Horizon::Month => print_range(&app.stats(range).await?),
        Horizon::Year => print_year(&app.year_stats(range).await?),
    }
    Ok(())
}

fn print_range(stats: &RangeStats) {
    println!(
        "{}",
        heading(&format!("{} to {}", stats.range.start(), stats.range.end()))
    );
    println!(
        "Tracked days\t{} of {}",
        stats.tracked_days,
        stats.days_in_range()
    );
    println!("Average\t\t{}", optional_percentage(stats.average));
    println!("Best streak\t{} days", stats.max_streak);
    if let Some(best) = stats.best_day {
        println!("Best day\t{} {}", best.date, percentage(best.completion));
    }
    if let Some(worst) = stats.worst_day {
        println!("Worst day\t{} {}", worst.date, percentage(worst.completion));
    }
    println!("Completed\t{} activities", stats.completed_activities);
    if let Some(per_day) = stats.average_completed_per_day() {
        println!("Per day\t\t{per_day:.1} activities");
    }

    if !stats.categories.is_empty() {
        println!();
        println!("{}", heading("Categories"));
        for (category, hours) in &stats.categories {
            println!(
                "{}\t{:.1}h of {:.1}h\t{}",
                category_style(*category).paint(category.to_string()),
                hours.completed,
                hours.scheduled,
                percentage(hours.rate())
            );
        }
    }

    if !stats.activities.is_empty() {
        println!();
        println!("{}", heading("Activities"));
        for activity in &stats.activities {
            println!(
                "{}\t{}/{}\t{}",
                activity.name,
                activity.completed,
                activity.appeared,
                optional_percentage(activity.rate())
            );
        }
    }
}

fn print_year(stats: &YearStats) {
    print_range(&stats.overall);

    println!();
    println!(
        "{} ({} with data)",
        heading("Months"),
        stats.months_with_data()
    );
    for month in &stats.months {
        let name = chrono::Month::try_from(month.month as u8)
            .map(|v| v.name().to_string())
            .unwrap_or_else(|_| month.month.to_string());
        println!(
            "{name:<10}\t{} days\t{}",
            month.tracked_days,
            optional_percentage(month.average)
        );
    }
    if let Some(best) = stats.best_month() {
        if let Ok(name) = chrono::Month::try_from(best.month as u8) {
            println!("Best month\t{}", name.name());
        }
    }
}
