use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::item::AppId;

/// Spatial restriction applied to the window set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterScope {
    All,
    #[default]
    Workspace,
    Monitor,
}

impl FilterScope {
    /// The next wider scope, or `None` once everything is visible.
    pub fn relax(self) -> Option<FilterScope> {
        match self {
            FilterScope::Monitor => Some(FilterScope::Workspace),
            FilterScope::Workspace => Some(FilterScope::All),
            FilterScope::All => None,
        }
    }

    /// Number of widening steps between this scope and `All`.
    pub fn breadth(self) -> u8 {
        match self {
            FilterScope::All => 0,
            FilterScope::Workspace => 1,
            FilterScope::Monitor => 2,
        }
    }

    pub fn wider(self, other: FilterScope) -> FilterScope {
        if other.breadth() < self.breadth() { other } else { self }
    }

    /// Cycle used by the filter-switch action: All -> Workspace -> Monitor -> All.
    pub fn cycle(self) -> FilterScope {
        match self {
            FilterScope::All => FilterScope::Workspace,
            FilterScope::Workspace => FilterScope::Monitor,
            FilterScope::Monitor => FilterScope::All,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Mru,
    StableSequence,
    StableCurrentFirst,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupPolicy {
    #[default]
    None,
    CurrentMonitorFirst,
    ByApp,
    ByWorkspace,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SwitcherMode {
    #[default]
    Windows,
    Apps,
}

impl SwitcherMode {
    pub fn toggled(self) -> SwitcherMode {
        match self {
            SwitcherMode::Windows => SwitcherMode::Apps,
            SwitcherMode::Apps => SwitcherMode::Windows,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InitialSelection {
    None,
    First,
    #[default]
    Second,
    Active,
}

/// `None` means search is off; `Some("")` means search is on with no text yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery(Option<String>);

impl SearchQuery {
    pub fn inactive() -> Self { SearchQuery(None) }

    pub fn active(text: impl Into<String>) -> Self { SearchQuery(Some(text.into())) }

    pub fn is_active(&self) -> bool { self.0.is_some() }

    /// Search is on and there is text to filter by.
    pub fn is_filtering(&self) -> bool { self.0.as_deref().is_some_and(|t| !t.trim().is_empty()) }

    pub fn text(&self) -> Option<&str> { self.0.as_deref() }

    pub fn push(&mut self, ch: char) { self.0.get_or_insert_with(String::new).push(ch); }

    /// Drops the last character; returns false when there was nothing to drop.
    pub fn pop(&mut self) -> bool { self.0.as_mut().and_then(String::pop).is_some() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleApp {
    pub id: AppId,
    pub name: String,
}

/// Everything the item source needs to know about the current switcher state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParams {
    pub mode: SwitcherMode,
    pub scope: FilterScope,
    /// Scope used when attaching windows to app items.
    pub app_scope: FilterScope,
    pub sort: SortOrder,
    pub group: GroupPolicy,
    pub search: SearchQuery,
    pub single_app: Option<SingleApp>,
    pub keyboard_triggered: bool,
    pub include_favorites: bool,
    /// When false, running favorites are ordered by their dash position.
    pub preserve_mru: bool,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            mode: SwitcherMode::Windows,
            scope: FilterScope::Workspace,
            app_scope: FilterScope::Workspace,
            sort: SortOrder::Mru,
            group: GroupPolicy::None,
            search: SearchQuery::inactive(),
            single_app: None,
            keyboard_triggered: true,
            include_favorites: false,
            preserve_mru: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxation_walks_toward_all() {
        assert_eq!(FilterScope::Monitor.relax(), Some(FilterScope::Workspace));
        assert_eq!(FilterScope::Workspace.relax(), Some(FilterScope::All));
        assert_eq!(FilterScope::All.relax(), None);
        assert!(FilterScope::Monitor.breadth() > FilterScope::Workspace.breadth());
    }

    #[test]
    fn wider_scope() {
        assert_eq!(FilterScope::Monitor.wider(FilterScope::Workspace), FilterScope::Workspace);
        assert_eq!(FilterScope::All.wider(FilterScope::Monitor), FilterScope::All);
        assert_eq!(FilterScope::Monitor.wider(FilterScope::Monitor), FilterScope::Monitor);
    }

    #[test]
    fn empty_query_is_active_but_not_filtering() {
        let inactive = SearchQuery::inactive();
        assert!(!inactive.is_active());
        assert!(!inactive.is_filtering());

        let mut query = SearchQuery::active("");
        assert!(query.is_active());
        assert!(!query.is_filtering());

        query.push('f');
        assert!(query.is_filtering());
        assert!(query.pop());
        assert!(!query.pop());
        assert_eq!(query.text(), Some(""));
    }

    #[test]
    fn scope_names_round_trip_through_strum() {
        assert_eq!(FilterScope::Monitor.to_string(), "monitor");
        assert_eq!("by_workspace".parse::<GroupPolicy>().unwrap(), GroupPolicy::ByWorkspace);
    }
}
