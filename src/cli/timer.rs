use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tokio::{select, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    app::App,
    storage::KeyValueStore,
    timer::{
        format_remaining,
        notify::Notifier,
        runner::{RunOutcome, TimerCommand, TimerRunner},
        TimerEngine, TimerKind,
    },
    tracker::DayState,
    utils::clock::DefaultClock,
};

use super::{activity::find_activity, format::report_sync};

#[derive(Debug, clap::Args)]
pub struct TimerArgs {
    #[arg(help = "Id or name of the activity")]
    activity: String,
    #[arg(long, short, help = "1-based session the timer belongs to")]
    session: Option<usize>,
    #[arg(long = "break", help = "Run the break timer instead of the focus timer")]
    break_timer: bool,
    #[arg(long, short, help = "Override the duration in minutes")]
    minutes: Option<u32>,
    #[arg(long, help = "Mark the session done for today when a focus timer runs out")]
    mark_done: bool,
}

/// The task a timer counts for: the named session's subtask, or the activity itself.
fn timer_task_id(day: &DayState, activity_id: &str, session: Option<usize>) -> Result<String> {
    let activity = day
        .get(activity_id)
        .with_context(|| format!("No activity with id {activity_id} on {}", day.date()))?;
    let Some(number) = session else {
        return Ok(activity.id.clone());
    };
    if !activity.has_subtasks() {
        bail!("{} has no sessions, drop --session", activity.name);
    }
    let subtask = activity.session(number).with_context(|| {
        format!(
            "{} has no session {number}, pick 1 to {}",
            activity.name,
            activity.subtasks.len()
        )
    })?;
    Ok(subtask.id.clone())
}

/// Cancels `shutdown` on Ctrl-C. Returns once either happened.
async fn stop_on_ctrl_c(shutdown: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            shutdown.cancel();
        },
        _ = shutdown.cancelled() => (),
    };
}

/// Forwards `p`, `r` and `s` lines from stdin. Runs on its own thread since reading stdin blocks.
fn forward_stdin(commands: mpsc::Sender<TimerCommand>) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let command = match line.trim() {
                "p" => TimerCommand::Pause,
                "r" => TimerCommand::Resume,
                "s" => TimerCommand::Stop,
                "" => continue,
                other => {
                    warn!("Unknown timer command {other:?}");
                    continue;
                }
            };
            if commands.blocking_send(command).is_err() {
                break;
            }
        }
        debug!("Stopped reading timer commands");
    });
}

pub async fn process_timer_command(
    app: &App<impl KeyValueStore>,
    notifier: Box<dyn Notifier>,
    TimerArgs {
        activity,
        session,
        break_timer,
        minutes,
        mark_done,
    }: TimerArgs,
) -> Result<()> {
    let catalog = app.catalog().await?;
    let activity = find_activity(&catalog, &activity)?.clone();

    let kind = if break_timer {
        TimerKind::Break
    } else {
        TimerKind::Focus
    };
    let minutes = minutes.unwrap_or(match kind {
        TimerKind::Focus => activity.focus_minutes,
        TimerKind::Break => activity.break_minutes,
    });
    if minutes == 0 {
        bail!(
            "{} has no {kind} duration, pass one with --minutes",
            activity.name
        );
    }

    let day = app.day(app.today()).await?;
    let task_id = timer_task_id(&day, &activity.id, session)?;

    let mut engine = TimerEngine::default();
    engine.start(task_id, minutes, kind)?;

    let (sender, receiver) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    forward_stdin(sender);
    tokio::spawn(stop_on_ctrl_c(shutdown.clone()));

    println!(
        "{} timer for {}: {} (p pause, r resume, s stop)",
        kind,
        activity.name,
        format_remaining(engine.duration())
    );

    let mut runner = TimerRunner::new(
        engine,
        receiver,
        shutdown.clone(),
        Box::new(DefaultClock),
        notifier,
    );
    let outcome = runner
        .run(|engine| {
            print!("\r{} {}  ", engine.kind(), format_remaining(engine.remaining()));
            let _ = io::stdout().flush();
        })
        .await;
    shutdown.cancel();
    println!();

    match outcome {
        RunOutcome::Completed(completion) => {
            println!("{} finished", completion.kind);
            if mark_done && completion.kind == TimerKind::Focus {
                mark_session_done(app, &activity.id, session).await?;
            }
        }
        RunOutcome::Stopped { remaining } => {
            println!("Stopped with {} left", format_remaining(remaining));
        }
    }
    Ok(())
}

/// Completes `session`, or the first unfinished one when none was named. Activities without
/// sessions are marked done directly.
async fn mark_session_done(
    app: &App<impl KeyValueStore>,
    activity_id: &str,
    session: Option<usize>,
) -> Result<()> {
    let today = app.today();
    let day = app.day(today).await?;
    let Some(activity) = day.get(activity_id) else {
        bail!("Activity {activity_id} is no longer scheduled");
    };

    let synced = if activity.has_subtasks() {
        let Some(number) = session.or_else(|| {
            activity
                .subtasks
                .iter()
                .position(|v| !v.completed)
                .map(|v| v + 1)
        }) else {
            info!("Every session of {activity_id} is already done");
            return Ok(());
        };
        app.complete_session(today, activity_id, number).await?
    } else if activity.completed {
        return Ok(());
    } else {
        app.toggle(today, activity_id, None).await?
    };

    report_sync(synced.outcome);
    println!("Marked {} done for {today}", activity.name);
    Ok(())
}
