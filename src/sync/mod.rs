//! Optimistic updates against a remote backend.
//!
//! Every mutating action applies locally first, then tells the remote about it. When the remote
//! rejects the change the local mutation is compensated, and the failure is only logged.

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::preferences::{ColorThemeId, Theme};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub task_id: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub task_id: String,
    pub new_priority_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferencePayload {
    Theme { theme: Theme },
    ColorTheme { color_theme: ColorThemeId },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSync: Send + Sync {
    async fn set_completion(&self, payload: CompletionPayload) -> Result<()>;

    async fn delete_task(&self, payload: DeletePayload) -> Result<()>;

    async fn reorder_tasks(&self, payload: Vec<ReorderEntry>) -> Result<()>;

    async fn set_preference(&self, payload: PreferencePayload) -> Result<()>;
}

/// Stands in for a backend that doesn't exist yet. Accepts everything.
pub struct StubRemote;

impl StubRemote {
    fn accept(&self, call: &str, payload: &impl Serialize) -> Result<()> {
        info!("{call} {}", serde_json::to_string(payload)?);
        Ok(())
    }
}

#[async_trait]
impl RemoteSync for StubRemote {
    async fn set_completion(&self, payload: CompletionPayload) -> Result<()> {
        self.accept("set_completion", &payload)
    }

    async fn delete_task(&self, payload: DeletePayload) -> Result<()> {
        self.accept("delete_task", &payload)
    }

    async fn reorder_tasks(&self, payload: Vec<ReorderEntry>) -> Result<()> {
        self.accept("reorder_tasks", &payload)
    }

    async fn set_preference(&self, payload: PreferencePayload) -> Result<()> {
        self.accept("set_preference", &payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    RolledBack,
}

/// Runs `apply`, then `attempt`. If `attempt` fails, `compensate` undoes the local change.
///
/// Errors from `apply` and `compensate` are local failures and propagate. A failed `attempt`
/// never does, it turns into [SyncOutcome::RolledBack].
pub async fn optimistic_update<A, FA, R, FR, C, FC>(
    apply: A,
    attempt: R,
    compensate: C,
) -> Result<SyncOutcome>
where
    A: FnOnce() -> FA,
    FA: Future<Output = Result<()>>,
    R: FnOnce() -> FR,
    FR: Future<Output = Result<()>>,
    C: FnOnce() -> FC,
    FC: Future<Output = Result<()>>,
{
    apply().await?;

    match attempt().await {
        Ok(()) => {
            debug!("Remote accepted the update");
            Ok(SyncOutcome::Synced)
        }
        Err(e) => {
            warn!("Remote rejected the update, rolling back: {e:?}");
            compensate().await?;
            Ok(SyncOutcome::RolledBack)
        }
    }
}
