use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::collections::HashMap;
use crate::model::filter::{FilterScope, GroupPolicy, InitialSelection, SortOrder, SwitcherMode};
use crate::ui::input::ActionName;

const MAX_SEARCH_LIMIT: usize = 100;
const MIN_IDLE_TIMEOUT_MS: u64 = 20;

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rift-switcher")
        .join("config.toml")
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
    /// Single characters mapped to actions, e.g. `"q" = "close_quit"`.
    #[serde(default)]
    action_keys: HashMap<String, ActionName>,
}

/// Immutable configuration snapshot. A reload produces a new value; nothing
/// reads settings from global state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub settings: Settings,
    pub action_keys: Vec<(char, ActionName)>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub list: ListSettings,
    #[serde(default)]
    pub apps: AppSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub timing: TimingSettings,
    #[serde(default)]
    pub pointer: PointerSettings,
    #[serde(default)]
    pub keys: KeySettings,
    #[serde(default)]
    pub mouse: MouseSettings,
    /// Enable hot-reloading of the config file when it changes
    #[serde(default = "yes")]
    pub hot_reload: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            list: ListSettings::default(),
            apps: AppSettings::default(),
            search: SearchSettings::default(),
            timing: TimingSettings::default(),
            pointer: PointerSettings::default(),
            keys: KeySettings::default(),
            mouse: MouseSettings::default(),
            hot_reload: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ListSettings {
    #[serde(default)]
    pub mode: SwitcherMode,
    #[serde(default)]
    pub filter: FilterScope,
    /// Scope for the windows attached to app entries.
    #[serde(default)]
    pub app_filter: FilterScope,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub group: GroupPolicy,
    #[serde(default)]
    pub initial_selection: InitialSelection,
    #[serde(default = "no")]
    pub include_modals: bool,
    #[serde(default = "no")]
    pub minimized_last: bool,
    #[serde(default = "yes")]
    pub wraparound: bool,
    /// Reverse navigation for pointer-triggered popups so the item nearest the
    /// pointer comes first.
    #[serde(default = "no")]
    pub pointer_affinity_reverse: bool,
    /// Widen the filter when a keyboard-triggered list has a single entry.
    #[serde(default = "yes")]
    pub relax_on_single_item: bool,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            mode: SwitcherMode::Windows,
            filter: FilterScope::Workspace,
            app_filter: FilterScope::Workspace,
            sort: SortOrder::Mru,
            group: GroupPolicy::None,
            initial_selection: InitialSelection::Second,
            include_modals: false,
            minimized_last: false,
            wraparound: true,
            pointer_affinity_reverse: false,
            relax_on_single_item: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppSettings {
    #[serde(default = "no")]
    pub include_favorites: bool,
    /// Keep running apps in MRU order; when false, favorites lead in dash order.
    #[serde(default = "yes")]
    pub preserve_mru: bool,
    #[serde(default = "no")]
    pub stable_sequence: bool,
    #[serde(default = "no")]
    pub show_apps_icon: bool,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "yes")]
    pub running_boost: bool,
    #[serde(default = "yes")]
    pub system_actions: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            include_favorites: false,
            preserve_mru: true,
            stable_sequence: false,
            show_apps_icon: false,
            search_limit: default_search_limit(),
            running_boost: true,
            system_actions: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct SearchSettings {
    /// Let an active search widen the filter scope when nothing matches.
    #[serde(default = "yes")]
    pub across_scopes: bool,
    /// Fall back to searching installed apps when no window matches.
    #[serde(default = "yes")]
    pub apps_fallback: bool,
    /// Start searching on the first printable key not bound to an action.
    #[serde(default = "no")]
    pub type_to_search: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            across_scopes: true,
            apps_fallback: true,
            type_to_search: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimingSettings {
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    #[serde(default = "default_rebuild_debounce_ms")]
    pub rebuild_debounce_ms: u64,
    #[serde(default = "default_overlay_double_press_ms")]
    pub overlay_double_press_ms: u64,
    #[serde(default = "default_focus_retry_ms")]
    pub focus_retry_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            rebuild_debounce_ms: default_rebuild_debounce_ms(),
            overlay_double_press_ms: default_overlay_double_press_ms(),
            focus_retry_ms: default_focus_retry_ms(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    #[default]
    None,
    /// The selected window is raised while browsing, so leaving must commit.
    Raise,
    Thumbnail,
}

impl PreviewMode {
    pub fn requires_commit(self) -> bool { matches!(self, PreviewMode::Raise) }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PointerSettings {
    /// Commit instead of dismissing when the pointer leaves the popup.
    #[serde(default = "no")]
    pub activate_on_hide: bool,
    #[serde(default)]
    pub preview_mode: PreviewMode,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpDownAction {
    Nothing,
    Navigate,
    #[default]
    SwitchWorkspace,
    ToggleSingleApp,
    CycleFilterScope,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct KeySettings {
    /// Action keys only fire with Shift held.
    #[serde(default = "no")]
    pub require_shift: bool,
    #[serde(default)]
    pub up_down: UpDownAction,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct MouseBindings {
    #[serde(default)]
    pub primary: Option<ActionName>,
    #[serde(default)]
    pub secondary: Option<ActionName>,
    #[serde(default)]
    pub middle: Option<ActionName>,
    #[serde(default)]
    pub scroll_up: Option<ActionName>,
    #[serde(default)]
    pub scroll_down: Option<ActionName>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct MouseSettings {
    #[serde(default = "default_item_bindings")]
    pub on_item: MouseBindings,
    #[serde(default = "default_inside_bindings")]
    pub inside: MouseBindings,
    #[serde(default = "default_outside_bindings")]
    pub outside: MouseBindings,
}

impl Default for MouseSettings {
    fn default() -> Self {
        Self {
            on_item: default_item_bindings(),
            inside: default_inside_bindings(),
            outside: default_outside_bindings(),
        }
    }
}

fn default_item_bindings() -> MouseBindings {
    MouseBindings {
        primary: Some(ActionName::Activate),
        secondary: Some(ActionName::Select),
        middle: Some(ActionName::CloseQuit),
        scroll_up: Some(ActionName::SelectPrevious),
        scroll_down: Some(ActionName::SelectNext),
    }
}

fn default_inside_bindings() -> MouseBindings {
    MouseBindings {
        primary: None,
        secondary: None,
        middle: None,
        scroll_up: Some(ActionName::SelectPrevious),
        scroll_down: Some(ActionName::SelectNext),
    }
}

fn default_outside_bindings() -> MouseBindings {
    MouseBindings {
        primary: Some(ActionName::Dismiss),
        secondary: Some(ActionName::Dismiss),
        middle: None,
        scroll_up: None,
        scroll_down: None,
    }
}

fn yes() -> bool { true }

fn no() -> bool { false }

fn default_search_limit() -> usize { 10 }

fn default_idle_timeout_ms() -> u64 { 100 }

fn default_rebuild_debounce_ms() -> u64 { 150 }

fn default_overlay_double_press_ms() -> u64 { 350 }

fn default_focus_retry_ms() -> u64 { 200 }

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.apps.validate());
        issues.extend(self.timing.validate());
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        self.apps.auto_fix_values() + self.timing.auto_fix_values()
    }
}

impl AppSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.search_limit == 0 {
            issues.push("apps.search_limit must be at least 1".to_string());
        }
        if self.search_limit > MAX_SEARCH_LIMIT {
            issues.push(format!(
                "apps.search_limit should not exceed {}",
                MAX_SEARCH_LIMIT
            ));
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        if self.search_limit == 0 || self.search_limit > MAX_SEARCH_LIMIT {
            self.search_limit = default_search_limit();
            return 1;
        }
        0
    }
}

impl TimingSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.idle_timeout_ms < MIN_IDLE_TIMEOUT_MS {
            issues.push(format!(
                "timing.idle_timeout_ms must be at least {}",
                MIN_IDLE_TIMEOUT_MS
            ));
        }
        if self.overlay_double_press_ms == 0 {
            issues.push("timing.overlay_double_press_ms must be positive".to_string());
        }
        if self.focus_retry_ms == 0 {
            issues.push("timing.focus_retry_ms must be positive".to_string());
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        if self.idle_timeout_ms < MIN_IDLE_TIMEOUT_MS {
            self.idle_timeout_ms = default_idle_timeout_ms();
            fixes += 1;
        }
        if self.overlay_double_press_ms == 0 {
            self.overlay_double_press_ms = default_overlay_double_press_ms();
            fixes += 1;
        }
        if self.focus_retry_ms == 0 {
            self.focus_retry_ms = default_focus_retry_ms();
            fixes += 1;
        }
        fixes
    }
}

impl Default for Config {
    fn default() -> Config {
        Self::parse(include_str!("../../switcher.default.toml"))
            .expect("bundled default config must parse")
    }
}

impl Config {
    /// Reads and parses `path`, repairing out-of-range values.
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&buf)?;
        config.repair();
        Ok(config)
    }

    /// Reads `path`, falling back to the bundled defaults when it does not exist.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_file = ConfigFile {
            settings: self.settings.clone(),
            action_keys: self
                .action_keys
                .iter()
                .map(|(key, action)| (key.to_string(), *action))
                .collect(),
        };

        let toml_string = toml::to_string_pretty(&config_file)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.settings.validate();
        if self.settings.keys.require_shift
            && self.action_keys.iter().any(|(key, _)| !key.is_alphanumeric())
        {
            issues.push("action keys must be alphanumeric when keys.require_shift is set".to_string());
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    /// Logs every issue and resets the values that can be fixed to their
    /// defaults. Returns the number of fixes.
    pub fn repair(&mut self) -> usize {
        for issue in self.validate() {
            warn!(%issue, "config issue");
        }
        let fixes = self.auto_fix_values();
        if fixes > 0 {
            info!(fixes, "reset invalid config values to defaults");
        }
        fixes
    }

    /// Action bound to `key`, compared case-insensitively.
    pub fn action_for_key(&self, key: char) -> Option<ActionName> {
        let key = key.to_lowercase().next().unwrap_or(key);
        self.action_keys.iter().find(|(bound, _)| *bound == key).map(|(_, action)| *action)
    }

    fn parse(buf: &str) -> anyhow::Result<Config> {
        let c: ConfigFile = toml::from_str(buf)?;
        let mut action_keys = Vec::with_capacity(c.action_keys.len());
        for (key, action) in c.action_keys {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                bail!("Action key must be a single character: {key:?}");
            };
            let ch = ch.to_lowercase().next().unwrap_or(ch);
            if action_keys.iter().any(|(bound, _)| *bound == ch) {
                bail!("Action key bound twice: {key:?}");
            }
            action_keys.push((ch, action));
        }
        action_keys.sort_by_key(|(key, _)| *key);
        Ok(Config { settings: c.settings, action_keys })
    }
}
