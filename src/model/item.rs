use std::fmt;
use std::ops::Index;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub fn new(id: u64) -> WindowId { WindowId(id) }

    pub fn get(&self) -> u64 { self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Application identifier as the host knows it (desktop file id, bundle id, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> AppId { AppId(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
    pub app_id: Option<AppId>,
    pub title: String,
    pub workspace: usize,
    pub monitor: usize,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub above: bool,
    /// Visible on every workspace.
    #[serde(default)]
    pub sticky: bool,
    #[serde(default)]
    pub skip_taskbar: bool,
    /// Parent window for attached dialogs.
    #[serde(default)]
    pub transient_for: Option<WindowId>,
    /// Creation order, independent of focus history.
    pub stable_seq: u64,
}

impl WindowInfo {
    pub fn is_on_workspace(&self, workspace: usize) -> bool {
        self.sticky || self.workspace == workspace
    }

    pub fn is_attached_dialog(&self) -> bool { self.transient_for.is_some() }

    pub fn belongs_to(&self, app: &AppId) -> bool { self.app_id.as_ref() == Some(app) }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppInfo {
    pub id: AppId,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// False for apps the registry hides from launchers (NoDisplay and friends).
    #[serde(default = "yes")]
    pub should_show: bool,
}

fn yes() -> bool { true }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAction {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowItem {
    pub window: WindowInfo,
    /// Display name of the owning app, resolved when the list was built.
    pub app_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppItem {
    pub app: AppInfo,
    pub favorite: bool,
    pub running: bool,
    /// Windows of this app visible under the effective app scope, MRU first.
    pub windows: Vec<WindowId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchableItem {
    Window(WindowItem),
    App(AppItem),
    SystemAction(SystemAction),
    ShowAppsIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKey {
    Window(WindowId),
    App(AppId),
    SystemAction(String),
    ShowAppsIcon,
}

impl SwitchableItem {
    pub fn key(&self) -> ItemKey {
        match self {
            SwitchableItem::Window(item) => ItemKey::Window(item.window.id),
            SwitchableItem::App(item) => ItemKey::App(item.app.id.clone()),
            SwitchableItem::SystemAction(action) => ItemKey::SystemAction(action.id.clone()),
            SwitchableItem::ShowAppsIcon => ItemKey::ShowAppsIcon,
        }
    }

    pub fn window(&self) -> Option<&WindowInfo> {
        match self {
            SwitchableItem::Window(item) => Some(&item.window),
            _ => None,
        }
    }

    pub fn app_id(&self) -> Option<&AppId> {
        match self {
            SwitchableItem::Window(item) => item.window.app_id.as_ref(),
            SwitchableItem::App(item) => Some(&item.app.id),
            _ => None,
        }
    }

    /// The window that acting on this item would target first.
    pub fn primary_window(&self) -> Option<WindowId> {
        match self {
            SwitchableItem::Window(item) => Some(item.window.id),
            SwitchableItem::App(item) => item.windows.first().copied(),
            _ => None,
        }
    }

    pub fn contains_window(&self, id: WindowId) -> bool {
        match self {
            SwitchableItem::Window(item) => item.window.id == id,
            SwitchableItem::App(item) => item.windows.contains(&id),
            _ => false,
        }
    }
}

/// An immutable, cheaply cloned snapshot of the switcher's items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemList(Rc<[SwitchableItem]>);

impl ItemList {
    pub fn new(items: Vec<SwitchableItem>) -> Self { ItemList(items.into()) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn get(&self, index: usize) -> Option<&SwitchableItem> { self.0.get(index) }

    pub fn iter(&self) -> std::slice::Iter<'_, SwitchableItem> { self.0.iter() }

    pub fn position(&self, key: &ItemKey) -> Option<usize> {
        self.0.iter().position(|item| &item.key() == key)
    }

    pub fn keys(&self) -> Vec<ItemKey> { self.0.iter().map(SwitchableItem::key).collect() }

    /// Copy of the list without the item at `index`.
    pub fn without(&self, index: usize) -> ItemList {
        let items = self
            .0
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != index)
            .map(|(_, item)| item.clone())
            .collect();
        ItemList::new(items)
    }
}

impl Index<usize> for ItemList {
    type Output = SwitchableItem;

    fn index(&self, index: usize) -> &SwitchableItem { &self.0[index] }
}

impl<'a> IntoIterator for &'a ItemList {
    type Item = &'a SwitchableItem;
    type IntoIter = std::slice::Iter<'a, SwitchableItem>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl FromIterator<SwitchableItem> for ItemList {
    fn from_iter<I: IntoIterator<Item = SwitchableItem>>(iter: I) -> Self {
        ItemList::new(iter.into_iter().collect())
    }
}
