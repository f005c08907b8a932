//! Read-only views of the host's window and application state.
//!
//! The switcher never caches what these return across rebuilds; every list
//! build takes a fresh snapshot. "Not found" is always an `Option`, never an
//! error.

use super::geometry::Point;
use crate::model::item::{AppId, AppInfo, SystemAction, WindowId, WindowInfo};

pub trait WindowSystemQuery {
    /// Windows in most-recently-used order, optionally limited to one workspace.
    fn windows(&self, workspace: Option<usize>) -> Vec<WindowInfo>;

    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.windows(None).into_iter().find(|w| w.id == id)
    }

    fn active_workspace(&self) -> usize;

    fn workspace_count(&self) -> usize;

    /// Monitor the pointer (or the focused window) is on.
    fn current_monitor(&self) -> usize;

    fn focused_window(&self) -> Option<WindowId>;

    fn pointer(&self) -> Point;
}

pub trait AppSystemQuery {
    /// Running apps in most-recently-used order.
    fn running_apps(&self) -> Vec<AppInfo>;

    fn installed_apps(&self) -> Vec<AppInfo>;

    fn app(&self, id: &AppId) -> Option<AppInfo>;

    /// Launch/usage frequency; higher means used more.
    fn usage_score(&self, id: &AppId) -> u32;

    fn system_actions(&self) -> Vec<SystemAction>;

    /// Favorite app ids in dash order.
    fn favorites(&self) -> Vec<AppId>;

    fn focused_app(&self) -> Option<AppId>;
}
