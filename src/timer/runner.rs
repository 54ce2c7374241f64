use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::utils::clock::Clock;

use super::{
    notify::{deliver, Notifier},
    Completion, TickOutcome, TimerEngine, TimerKind, TimerStatus,
};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Completion),
    /// Stopped by a command or by cancellation before reaching zero.
    Stopped { remaining: u32 },
}

/// Drives a started [TimerEngine] at one tick per second until it completes or gets stopped.
pub struct TimerRunner {
    engine: TimerEngine,
    commands: mpsc::Receiver<TimerCommand>,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
    notifier: Box<dyn Notifier>,
}

impl TimerRunner {
    pub fn new(
        engine: TimerEngine,
        commands: mpsc::Receiver<TimerCommand>,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            engine,
            commands,
            shutdown,
            clock,
            notifier,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    fn stopped(&mut self) -> RunOutcome {
        let remaining = self.engine.remaining();
        self.engine.stop();
        info!("Timer stopped with {remaining}s left");
        RunOutcome::Stopped { remaining }
    }

    /// Executes the countdown loop. `on_tick` sees every second that passes while running.
    ///
    /// Ticks are scheduled against deadlines rather than fixed sleeps, so slow handlers don't
    /// make the countdown drift. Once stopped or cancelled no further tick is processed.
    pub async fn run(&mut self, mut on_tick: impl FnMut(&TimerEngine)) -> RunOutcome {
        let mut next_tick = self.clock.instant() + TICK;
        let mut commands_open = true;

        loop {
            let running = self.engine.status() == TimerStatus::Running;
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    return self.stopped();
                }
                command = self.commands.recv(), if commands_open => match command {
                    Some(TimerCommand::Pause) => {
                        if self.engine.pause() {
                            debug!("Paused at {}s", self.engine.remaining());
                        }
                    }
                    Some(TimerCommand::Resume) => {
                        if self.engine.resume() {
                            debug!("Resumed at {}s", self.engine.remaining());
                            next_tick = self.clock.instant() + TICK;
                        }
                    }
                    Some(TimerCommand::Stop) => {
                        return self.stopped();
                    }
                    None => {
                        debug!("Timer command channel closed");
                        commands_open = false;
                    }
                },
                _ = self.clock.sleep_until(next_tick), if running => {
                    next_tick += TICK;
                    match self.engine.tick() {
                        TickOutcome::Running(_) => on_tick(&self.engine),
                        TickOutcome::Completed(completion) => {
                            on_tick(&self.engine);
                            info!("Timer for {} completed", completion.task_id);
                            let (title, body) = match completion.kind {
                                TimerKind::Focus => ("Focus session complete", "Time for a break."),
                                TimerKind::Break => ("Break is over", "Back to focus."),
                            };
                            deliver(self.notifier.as_ref(), title, body);
                            return RunOutcome::Completed(completion);
                        }
                        TickOutcome::Idle | TickOutcome::Paused => (),
                    }
                }
            }
        }
    }
}
