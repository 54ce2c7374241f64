use anyhow::{Context, Result};
use clap::{CommandFactory, Subcommand};
use tracing::info;

use crate::{
    app::App,
    catalog::{Activity, ActivityDraft, ActivityPatch, Catalog, Category},
    storage::KeyValueStore,
};

use super::{
    format::{category_style, heading, report_sync, warning},
    Args,
};

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    #[command(about = "List activities grouped by category")]
    List,
    #[command(about = "Add an activity at the end of its category")]
    Add {
        name: String,
        #[arg(long, short)]
        category: Category,
        #[arg(long, default_value_t = 1., help = "Hours scheduled per day")]
        hours: f64,
        #[arg(long, default_value_t = 0, help = "Number of focus sessions")]
        sessions: u32,
        #[arg(long, default_value_t = 0, help = "Minutes per focus session")]
        focus: u32,
        #[arg(long = "break", default_value_t = 0, help = "Minutes of break after a session")]
        break_minutes: u32,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long, help = "Colour token, the category colour by default")]
        color: Option<String>,
    },
    #[command(about = "Change fields of an activity")]
    Edit {
        #[arg(help = "Id or name of the activity")]
        activity: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, short)]
        category: Option<Category>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        sessions: Option<u32>,
        #[arg(long)]
        focus: Option<u32>,
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    #[command(about = "Delete an activity")]
    Delete {
        #[arg(help = "Id or name of the activity")]
        activity: String,
    },
    #[command(about = "Move an activity within its category")]
    Reorder {
        #[arg(help = "Id or name of the activity")]
        activity: String,
        #[arg(
            long,
            required_unless_present = "over",
            conflicts_with = "over",
            help = "New 1-based position within the category"
        )]
        position: Option<usize>,
        #[arg(long, help = "Take the place of this activity. Ignored across categories")]
        over: Option<String>,
    },
    #[command(about = "Replace every activity with the built-in defaults")]
    Reset,
}

/// Finds an activity by id, falling back to a case-insensitive name match.
pub fn find_activity<'a>(catalog: &'a Catalog, reference: &str) -> Result<&'a Activity> {
    catalog
        .get(reference)
        .or_else(|| {
            catalog
                .activities()
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(reference))
        })
        .with_context(|| format!("No activity with id or name {reference:?}"))
}

pub async fn process_activity_command(
    app: &App<impl KeyValueStore>,
    command: ActivityCommand,
) -> Result<()> {
    match command {
        ActivityCommand::List => print_catalog(&app.catalog().await?),
        ActivityCommand::Add {
            name,
            category,
            hours,
            sessions,
            focus,
            break_minutes,
            icon,
            color,
        } => {
            let added = app
                .add_activity(ActivityDraft {
                    name,
                    category,
                    total_hours: hours,
                    sessions,
                    focus_minutes: focus,
                    break_minutes,
                    icon,
                    color,
                })
                .await?;
            println!("Added {} with id {}", added.name, added.id);
            warn_if_overbooked(&app.catalog().await?);
        }
        ActivityCommand::Edit {
            activity,
            name,
            category,
            hours,
            sessions,
            focus,
            break_minutes,
            icon,
            color,
        } => {
            let id = find_activity(&app.catalog().await?, &activity)?.id.clone();
            let catalog = app
                .edit_activity(
                    &id,
                    ActivityPatch {
                        name,
                        category,
                        total_hours: hours,
                        sessions,
                        focus_minutes: focus,
                        break_minutes,
                        icon,
                        color,
                    },
                )
                .await?;
            info!("Edited activity {id}");
            print_catalog(&catalog);
        }
        ActivityCommand::Delete { activity } => {
            let id = find_activity(&app.catalog().await?, &activity)?.id.clone();
            let synced = app.delete_activity(&id).await?;
            report_sync(synced.outcome);
            print_catalog(&synced.value);
        }
        ActivityCommand::Reorder {
            activity,
            position,
            over,
        } => {
            let catalog = app.catalog().await?;
            let id = find_activity(&catalog, &activity)?.id.clone();
            let synced = match (position, over) {
                (Some(position), _) => {
                    Some(app.reorder_activity(&id, position.saturating_sub(1)).await?)
                }
                (None, Some(over)) => {
                    let over = find_activity(&catalog, &over)?.id.clone();
                    app.reorder_onto(&id, &over).await?
                }
                (None, None) => {
                    return Err(Args::command()
                        .error(
                            clap::error::ErrorKind::MissingRequiredArgument,
                            "Either --position or --over is required",
                        )
                        .into())
                }
            };
            match synced {
                Some(synced) => {
                    report_sync(synced.outcome);
                    print_catalog(&synced.value);
                }
                None => println!("Activities can only be reordered within their category"),
            }
        }
        ActivityCommand::Reset => {
            let catalog = app.reset_catalog().await?;
            print_catalog(&catalog);
        }
    }
    Ok(())
}

fn warn_if_overbooked(catalog: &Catalog) {
    if catalog.exceeds_day() {
        println!(
            "{}",
            warning(&format!(
                "Scheduled activities add up to {:.1}h, more than a day has",
                catalog.total_hours()
            ))
        );
    }
}

fn print_catalog(catalog: &Catalog) {
    for category in Category::ALL {
        let mut activities = catalog.in_category(category).peekable();
        if activities.peek().is_none() {
            continue;
        }

        println!(
            "{} {}",
            category_style(category).paint(category.to_string()),
            format_hours(catalog.category_hours(category))
        );
        for activity in activities {
            let sessions = if activity.has_sessions() {
                format!(
                    "  {}x{}m focus, {}m break",
                    activity.sessions, activity.focus_minutes, activity.break_minutes
                )
            } else {
                String::new()
            };
            println!(
                "  {}. {} {} [{}] {}{}",
                activity.priority_order + 1,
                activity.icon,
                activity.name,
                activity.id,
                format_hours(activity.total_hours),
                sessions
            );
        }
    }

    println!(
        "{} {}",
        heading("Total"),
        format_hours(catalog.total_hours())
    );
    warn_if_overbooked(catalog);
}

fn format_hours(hours: f64) -> String {
    format!("{hours:.1}h")
}
