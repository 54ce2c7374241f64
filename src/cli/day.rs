use anyhow::Result;
use chrono::Local;
use clap::Subcommand;

use crate::{app::App, storage::KeyValueStore, tracker::DayState};

use super::{
    activity::find_activity,
    dates::DateArgs,
    format::{category_style, checkbox, heading, percentage, report_sync},
};

#[derive(Subcommand, Debug)]
pub enum DayCommand {
    #[command(about = "Show activities and their completion for a day")]
    Show {
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Toggle an activity, or one of its sessions")]
    Toggle {
        #[arg(help = "Id or name of the activity")]
        activity: String,
        #[arg(long, short, help = "1-based session number. Required for activities with sessions")]
        session: Option<usize>,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Close out a day and record its summary for statistics")]
    Done {
        #[command(flatten)]
        date: DateArgs,
    },
}

pub async fn process_day_command(app: &App<impl KeyValueStore>, command: DayCommand) -> Result<()> {
    match command {
        DayCommand::Show { date } => {
            let day = app.day(date.resolve(Local::now())?).await?;
            print_day(&day);
        }
        DayCommand::Toggle {
            activity,
            session,
            date,
        } => {
            let date = date.resolve(Local::now())?;
            let id = find_activity(&app.catalog().await?, &activity)?.id.clone();
            let synced = app.toggle(date, &id, session).await?;
            report_sync(synced.outcome);
            print_day(&synced.value);
        }
        DayCommand::Done { date } => {
            let closed = app.done_for_day(date.resolve(Local::now())?).await?;
            println!(
                "Closed {} at {} ({} of {} activities)",
                closed.summary.date,
                percentage(closed.summary.completion),
                closed.summary.completed_count,
                closed.summary.activities_count
            );
            if closed.celebrated {
                println!("🎉 Every activity done, congratulations!");
            }
        }
    }
    Ok(())
}

fn print_day(day: &DayState) {
    println!(
        "{} {} ({} of {})",
        heading(&day.date().format("%A %Y-%m-%d").to_string()),
        percentage(day.completion()),
        day.completed_count(),
        day.total_count()
    );

    for activity in day.activities() {
        println!(
            "{} {} {} {} {:.1}h",
            checkbox(activity.completed),
            activity.icon,
            activity.name,
            category_style(activity.category).paint(activity.category.to_string()),
            activity.hours
        );
        for (number, subtask) in activity.subtasks.iter().enumerate() {
            println!("    {} {}. {}", checkbox(subtask.completed), number + 1, subtask.name);
        }
    }
}
