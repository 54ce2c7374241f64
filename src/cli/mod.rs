pub mod activity;
pub mod dates;
pub mod day;
pub mod format;
pub mod preferences;
pub mod stats;
pub mod timer;

use std::path::PathBuf;

use activity::{process_activity_command, ActivityCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};
use day::{process_day_command, DayCommand};
use preferences::{process_color_command, process_theme_command, ColorCommand, ThemeCommand};
use stats::{process_stats_command, StatsCommand};
use timer::{process_timer_command, TimerArgs};
use tracing::level_filters::LevelFilter;

use crate::{
    app::App,
    storage::file_store::FileStore,
    sync::StubRemote,
    timer::notify::{DesktopNotifier, Notifier, NotifierSet, TerminalBell},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Daytally", version, long_about = None)]
#[command(about = "Track daily activities, focus sessions and how consistently you finish them", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Manage the activity catalog")]
    Activity {
        #[command(subcommand)]
        command: ActivityCommand,
    },
    #[command(about = "Track completion for a day")]
    Day {
        #[command(subcommand)]
        command: DayCommand,
    },
    #[command(about = "Completion statistics for a week, month or year")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
    #[command(about = "Run a focus or break timer in the foreground")]
    Timer {
        #[command(flatten)]
        command: TimerArgs,
    },
    #[command(about = "Light, dark or system theme")]
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
    #[command(about = "Color theme")]
    Color {
        #[command(subcommand)]
        command: ColorCommand,
    },
}

fn default_notifier() -> Box<dyn Notifier> {
    Box::new(NotifierSet::new(vec![
        Box::new(DesktopNotifier),
        Box::new(TerminalBell),
    ]))
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    let app = App::new(
        FileStore::new(dir.join("data"))?,
        Box::new(StubRemote),
        default_notifier(),
        Box::new(DefaultClock),
    );

    match args.commands {
        Commands::Activity { command } => process_activity_command(&app, command).await,
        Commands::Day { command } => process_day_command(&app, command).await,
        Commands::Stats { command } => process_stats_command(&app, command).await,
        Commands::Timer { command } => {
            process_timer_command(&app, default_notifier(), command).await
        }
        Commands::Theme { command } => process_theme_command(&app, command).await,
        Commands::Color { command } => process_color_command(&app, command).await,
    }
}
