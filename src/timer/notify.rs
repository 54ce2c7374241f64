use anyhow::Result;
use notify_rust::Notification;
use tracing::{debug, warn};

/// Side channel for alerts. Nothing that happens here may influence application state.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Desktop notification through the platform notification service.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        Notification::new()
            .summary(title)
            .body(body)
            .appname("daytally")
            .show()?;
        Ok(())
    }
}

/// Rings the terminal bell and prints the message to stderr.
pub struct TerminalBell;

impl Notifier for TerminalBell {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        eprintln!("\x07{title}: {body}");
        Ok(())
    }
}

/// Delivers to every inner notifier. Fails only when all of them fail.
pub struct NotifierSet {
    inner: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new(inner: Vec<Box<dyn Notifier>>) -> Self {
        Self { inner }
    }
}

impl Notifier for NotifierSet {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut last_error = None;
        let mut delivered = false;
        for notifier in &self.inner {
            match notifier.notify(title, body) {
                Ok(()) => delivered = true,
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) if !delivered => Err(e),
            _ => Ok(()),
        }
    }
}

/// Sends a notification, logging and dropping any failure.
pub fn deliver(notifier: &dyn Notifier, title: &str, body: &str) {
    match notifier.notify(title, body) {
        Ok(()) => debug!("Delivered notification {title:?}"),
        Err(e) => warn!("Failed to deliver notification {title:?}: {e:?}"),
    }
}
