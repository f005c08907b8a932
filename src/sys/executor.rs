//! Window-manager effects requested by the switcher.
//!
//! The switcher never touches windows itself. It describes what should
//! happen as an [`ActionRequest`] and hands it to the host's executor.

use serde::{Deserialize, Serialize};

use crate::model::item::{AppId, ItemKey, WindowId};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceTarget {
    Existing(usize),
    /// Create a workspace at this index, shifting later ones right.
    NewAt(usize),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type")]
pub enum ActionRequest {
    /// Focus a window, raise an app, run a system action or open the app grid.
    Activate { item: ItemKey },
    /// Close a window, or quit an app.
    CloseQuit { item: ItemKey },
    Kill { item: ItemKey },
    ToggleAbove { window: WindowId },
    ToggleSticky { window: WindowId },
    MaximizeOnCurrentMonitor { window: WindowId },
    NewWindow { app: AppId },
    CreateThumbnail { window: WindowId },
    OpenPreferences,
    MoveToWorkspace { window: WindowId, target: WorkspaceTarget },
    SwitchWorkspace { workspace: usize },
    ShowOverview,
    ShowAppGrid,
}

#[derive(thiserror::Error, Debug)]
pub enum ExecutorError {
    #[error("window {0} no longer exists")]
    WindowGone(WindowId),
    #[error("app {0} is not available")]
    AppUnavailable(AppId),
    #[error("action is not supported by this host: {0}")]
    Unsupported(&'static str),
    #[error("host failed: {0}")]
    Host(String),
}

pub trait ActionExecutor {
    fn execute(&self, request: ActionRequest) -> Result<(), ExecutorError>;
}

impl ActionRequest {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ActionRequest::Activate { .. } => "activate",
            ActionRequest::CloseQuit { .. } => "close_quit",
            ActionRequest::Kill { .. } => "kill",
            ActionRequest::ToggleAbove { .. } => "toggle_above",
            ActionRequest::ToggleSticky { .. } => "toggle_sticky",
            ActionRequest::MaximizeOnCurrentMonitor { .. } => "maximize_on_current_monitor",
            ActionRequest::NewWindow { .. } => "new_window",
            ActionRequest::CreateThumbnail { .. } => "create_thumbnail",
            ActionRequest::OpenPreferences => "open_preferences",
            ActionRequest::MoveToWorkspace { .. } => "move_to_workspace",
            ActionRequest::SwitchWorkspace { .. } => "switch_workspace",
            ActionRequest::ShowOverview => "show_overview",
            ActionRequest::ShowAppGrid => "show_app_grid",
        }
    }
}
