//! Builds the ordered item list shown by the switcher.
//!
//! Every build takes one fresh snapshot of the host, filters it by scope,
//! sorts and groups it, applies the single-app constraint and search, and
//! then widens the scope step by step when the result is too short to be
//! useful. Grouping and relevance ranking are done with stable sorts so the
//! MRU order survives inside each group.

use std::cmp::Reverse;

use tracing::debug;

use super::filter::{BuildParams, FilterScope, GroupPolicy, SortOrder, SwitcherMode};
use super::item::{AppId, AppInfo, AppItem, ItemList, SwitchableItem, WindowId, WindowInfo, WindowItem};
use super::search::{AppFields, NameMatcher, SearchTerms, WindowFields, action_matches};
use crate::common::collections::{HashMap, HashSet};
use crate::common::config::Settings;
use crate::sys::query::{AppSystemQuery, WindowSystemQuery};

/// Which fallback produced the final list, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// A single running app in app mode was reopened as a window list.
    WindowsForSingleApp,
    /// No window matched the search, so installed apps were searched instead.
    AppSearch,
    /// There are no windows at all; running apps and favorites are shown.
    Dash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub list: ItemList,
    pub scope: FilterScope,
    pub mode: SwitcherMode,
    /// Scopes in the order they were tried, starting with the requested one.
    pub scopes_tried: Vec<FilterScope>,
    pub fallback: Option<Fallback>,
    /// Whether the popup should indicate that the filter was widened.
    pub filter_changed: bool,
}

struct AppMatch {
    app: AppInfo,
    usage: u32,
    relevance: u8,
    /// Fuzzy name score, breaks ties within a relevance level.
    fuzzy: u32,
}

struct Snapshot {
    /// Every window, MRU first.
    windows: Vec<WindowInfo>,
    workspace: usize,
    monitor: usize,
    focused: Option<WindowId>,
}

pub struct ItemSource<'a> {
    windows: &'a dyn WindowSystemQuery,
    apps: &'a dyn AppSystemQuery,
    settings: &'a Settings,
}

impl<'a> ItemSource<'a> {
    pub fn new(
        windows: &'a dyn WindowSystemQuery,
        apps: &'a dyn AppSystemQuery,
        settings: &'a Settings,
    ) -> Self {
        ItemSource { windows, apps, settings }
    }

    pub fn build(&self, params: &BuildParams) -> BuildOutcome {
        let snapshot = self.snapshot();
        let searching = params.search.is_active();
        let threshold = if !searching
            && params.keyboard_triggered
            && self.settings.list.relax_on_single_item
        {
            1
        } else {
            0
        };
        let may_relax = !searching || self.settings.search.across_scopes;

        // Narrowing to one app always lists that app's windows.
        let mut mode = match params.single_app {
            Some(_) => SwitcherMode::Windows,
            None => params.mode,
        };
        let mut scope = params.scope;
        let mut scopes_tried = vec![scope];
        let mut fallback = None;
        let mut list = self.build_list(&snapshot, params, mode, scope);

        if may_relax {
            while list.len() <= threshold {
                if mode == SwitcherMode::Apps && list.len() == 1 && is_running_app(&list[0]) {
                    mode = SwitcherMode::Windows;
                    fallback = Some(Fallback::WindowsForSingleApp);
                    list = self.build_list(&snapshot, params, mode, scope);
                    continue;
                }
                let Some(wider) = scope.relax() else { break };
                scope = wider;
                scopes_tried.push(scope);
                list = self.build_list(&snapshot, params, mode, scope);
            }
        }

        if list.is_empty()
            && mode == SwitcherMode::Windows
            && self.settings.search.apps_fallback
            && let Some(terms) = params.search.text().and_then(SearchTerms::parse)
        {
            mode = SwitcherMode::Apps;
            fallback = Some(Fallback::AppSearch);
            list = self.search_apps(&snapshot, params, &terms);
        }

        if list.is_empty() && !searching && snapshot.windows.is_empty() {
            mode = SwitcherMode::Apps;
            fallback = Some(Fallback::Dash);
            list = self.list_apps(&snapshot, params, FilterScope::All, true, true);
        }

        // The icon is not a candidate, so it never counts towards escalation.
        if mode == SwitcherMode::Apps
            && !params.search.is_filtering()
            && self.settings.apps.show_apps_icon
        {
            let items = list.iter().cloned().chain([SwitchableItem::ShowAppsIcon]).collect();
            list = ItemList::new(items);
        }

        let filter_changed = fallback != Some(Fallback::Dash) && scope != params.scope;
        debug!(
            len = list.len(),
            %scope,
            %mode,
            ?fallback,
            tried = scopes_tried.len(),
            "built switcher list"
        );
        BuildOutcome {
            list,
            scope,
            mode,
            scopes_tried,
            fallback,
            filter_changed,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            windows: self.windows.windows(None),
            workspace: self.windows.active_workspace(),
            monitor: self.windows.current_monitor(),
            focused: self.windows.focused_window(),
        }
    }

    fn build_list(
        &self,
        snapshot: &Snapshot,
        params: &BuildParams,
        mode: SwitcherMode,
        scope: FilterScope,
    ) -> ItemList {
        match mode {
            SwitcherMode::Windows => self.list_windows(snapshot, params, scope),
            SwitcherMode::Apps => match params.search.text().and_then(SearchTerms::parse) {
                Some(terms) => self.search_apps(snapshot, params, &terms),
                None => self.list_apps(snapshot, params, scope, params.include_favorites, false),
            },
        }
    }

    /// Dialogs are folded into their parent unless modals are listed, and
    /// skip-taskbar windows only show up as listed modals.
    fn is_listed(&self, window: &WindowInfo) -> bool {
        if window.is_attached_dialog() {
            return self.settings.list.include_modals;
        }
        !window.skip_taskbar
    }

    fn is_visible(&self, window: &WindowInfo, scope: FilterScope, snapshot: &Snapshot) -> bool {
        self.is_listed(window) && in_scope(window, scope, snapshot)
    }

    fn list_windows(&self, snapshot: &Snapshot, params: &BuildParams, scope: FilterScope) -> ItemList {
        let include_modals = self.settings.list.include_modals;
        let by_id: HashMap<WindowId, &WindowInfo> =
            snapshot.windows.iter().map(|w| (w.id, w)).collect();

        let mut seen = HashSet::default();
        let mut windows: Vec<&WindowInfo> = Vec::new();
        for window in &snapshot.windows {
            // A collapsed dialog lends its MRU position to its parent.
            let window = match window.transient_for {
                Some(parent) if !include_modals => match by_id.get(&parent) {
                    Some(parent) => *parent,
                    None => continue,
                },
                _ => window,
            };
            if !seen.insert(window.id) || !self.is_visible(window, scope, snapshot) {
                continue;
            }
            windows.push(window);
        }

        match params.sort {
            SortOrder::Mru => {}
            SortOrder::StableSequence => windows.sort_by_key(|w| w.stable_seq),
            SortOrder::StableCurrentFirst => {
                windows.sort_by_key(|w| w.stable_seq);
                if let Some(focused) = snapshot.focused
                    && let Some(pos) = windows.iter().position(|w| w.id == focused)
                {
                    let window = windows.remove(pos);
                    windows.insert(0, window);
                }
            }
        }

        if self.settings.list.minimized_last {
            windows.sort_by_key(|w| w.minimized);
        }

        match params.group {
            GroupPolicy::None => {}
            GroupPolicy::CurrentMonitorFirst => {
                windows.sort_by_key(|w| w.monitor != snapshot.monitor)
            }
            GroupPolicy::ByApp => {
                let mut rank: HashMap<Option<&AppId>, usize> = HashMap::default();
                for window in windows.iter().copied() {
                    let next = rank.len();
                    rank.entry(window.app_id.as_ref()).or_insert(next);
                }
                windows.sort_by_key(|w| rank.get(&w.app_id.as_ref()).copied().unwrap_or(usize::MAX));
            }
            GroupPolicy::ByWorkspace => windows.sort_by_key(|w| {
                if w.sticky { snapshot.workspace } else { w.workspace }
            }),
        }

        if let Some(single) = &params.single_app {
            windows.retain(|w| w.belongs_to(&single.id));
        }

        let mut app_cache: HashMap<AppId, Option<AppInfo>> = HashMap::default();
        let items: Vec<(WindowItem, Option<AppInfo>)> = windows
            .into_iter()
            .map(|window| {
                let app = window.app_id.as_ref().and_then(|id| {
                    app_cache.entry(id.clone()).or_insert_with(|| self.apps.app(id)).clone()
                });
                let item = WindowItem {
                    window: window.clone(),
                    app_name: app.as_ref().map(|a| a.name.clone()),
                };
                (item, app)
            })
            .collect();

        if let Some(terms) = params.search.text().and_then(SearchTerms::parse) {
            let mut scored: Vec<((u8, u8), WindowItem)> = items
                .into_iter()
                .filter_map(|(item, app)| {
                    let fields =
                        WindowFields::new(&item.window.title, app.as_ref(), item.app_name.as_deref());
                    fields.matches(&terms).then(|| (fields.relevance(&terms), item))
                })
                .collect();
            scored.sort_by_key(|(relevance, _)| Reverse(*relevance));
            return scored.into_iter().map(|(_, item)| SwitchableItem::Window(item)).collect();
        }

        items.into_iter().map(|(item, _)| SwitchableItem::Window(item)).collect()
    }

    /// Windows of `app` visible under `scope`, MRU first.
    fn app_windows(&self, snapshot: &Snapshot, app: &AppId, scope: FilterScope) -> Vec<WindowId> {
        snapshot
            .windows
            .iter()
            .filter(|w| w.belongs_to(app) && self.is_visible(w, scope, snapshot))
            .map(|w| w.id)
            .collect()
    }

    /// Running apps plus favorites. `unfiltered` keeps apps that have no
    /// visible window, which is what the dash fallback shows.
    fn list_apps(
        &self,
        snapshot: &Snapshot,
        params: &BuildParams,
        scope: FilterScope,
        include_favorites: bool,
        unfiltered: bool,
    ) -> ItemList {
        let favorites = if include_favorites { self.apps.favorites() } else { Vec::new() };

        let mut apps: Vec<AppItem> = self
            .apps
            .running_apps()
            .into_iter()
            .filter_map(|app| {
                let favorite = favorites.contains(&app.id);
                let visible = unfiltered
                    || favorite
                    || snapshot
                        .windows
                        .iter()
                        .any(|w| w.belongs_to(&app.id) && self.is_visible(w, scope, snapshot));
                visible.then(|| AppItem {
                    app,
                    favorite,
                    running: true,
                    windows: Vec::new(),
                })
            })
            .collect();

        if self.settings.apps.stable_sequence {
            apps.sort_by_key(|item| {
                snapshot
                    .windows
                    .iter()
                    .filter(|w| w.belongs_to(&item.app.id))
                    .map(|w| w.stable_seq)
                    .min()
                    .unwrap_or(u64::MAX)
            });
        }

        for id in &favorites {
            if apps.iter().any(|item| &item.app.id == id) {
                continue;
            }
            let Some(app) = self.apps.app(id) else {
                debug!(%id, "favorite app is not installed");
                continue;
            };
            apps.push(AppItem {
                app,
                favorite: true,
                running: false,
                windows: Vec::new(),
            });
        }

        if !params.preserve_mru {
            apps.sort_by_key(|item| match favorites.iter().position(|id| id == &item.app.id) {
                Some(pos) => (0, pos),
                None => (1, 0),
            });
        }

        // Widening the list scope widens the app scope along with it.
        let app_scope = params.app_scope.wider(scope);
        for item in &mut apps {
            item.windows = self.app_windows(snapshot, &item.app.id, app_scope);
        }
        if !unfiltered {
            apps.retain(|item| item.favorite || !item.windows.is_empty());
        }
        if let Some(single) = &params.single_app {
            apps.retain(|item| item.app.id == single.id);
        }

        ItemList::new(apps.into_iter().map(SwitchableItem::App).collect())
    }

    fn search_apps(&self, snapshot: &Snapshot, params: &BuildParams, terms: &SearchTerms) -> ItemList {
        let settings = &self.settings.apps;
        let running: HashSet<AppId> =
            self.apps.running_apps().into_iter().map(|app| app.id).collect();
        let favorites = self.apps.favorites();

        let mut fuzzy = NameMatcher::new(terms);
        let mut matches: Vec<AppMatch> = self
            .apps
            .installed_apps()
            .into_iter()
            .filter(|app| app.should_show)
            .filter(|app| params.single_app.as_ref().is_none_or(|single| single.id == app.id))
            .filter_map(|app| {
                let fields = AppFields::new(&app);
                if !fields.matches(terms, &mut fuzzy) {
                    return None;
                }
                Some(AppMatch {
                    usage: self.apps.usage_score(&app.id),
                    fuzzy: fuzzy.score(&fields.name).unwrap_or(0),
                    relevance: fields.relevance(terms),
                    app,
                })
            })
            .collect();

        // Later passes dominate earlier ones.
        matches.sort_by_key(|m| Reverse(m.usage));
        matches.sort_by_key(|m| Reverse((m.relevance, m.fuzzy)));
        if settings.running_boost {
            matches.sort_by_key(|m| !running.contains(&m.app.id));
        }
        matches.truncate(settings.search_limit);

        let mut items: Vec<SwitchableItem> = matches
            .into_iter()
            .map(|AppMatch { app, .. }| {
                let windows = self.app_windows(snapshot, &app.id, params.app_scope);
                SwitchableItem::App(AppItem {
                    favorite: favorites.contains(&app.id),
                    running: running.contains(&app.id),
                    windows,
                    app,
                })
            })
            .collect();

        if settings.system_actions && params.single_app.is_none() {
            items.extend(
                self.apps
                    .system_actions()
                    .into_iter()
                    .filter(|action| action_matches(action, terms))
                    .map(SwitchableItem::SystemAction),
            );
        }
        ItemList::new(items)
    }
}

fn in_scope(window: &WindowInfo, scope: FilterScope, snapshot: &Snapshot) -> bool {
    match scope {
        FilterScope::All => true,
        FilterScope::Workspace => window.is_on_workspace(snapshot.workspace),
        FilterScope::Monitor => {
            window.is_on_workspace(snapshot.workspace) && window.monitor == snapshot.monitor
        }
    }
}

fn is_running_app(item: &SwitchableItem) -> bool {
    matches!(item, SwitchableItem::App(app) if app.running)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::filter::{SearchQuery, SingleApp};
    use crate::model::item::ItemKey;
    use crate::testing::{FakeHost, app, window};

    fn build(host: &FakeHost, settings: &Settings, params: &BuildParams) -> BuildOutcome {
        ItemSource::new(host, host, settings).build(params)
    }

    fn window_ids(list: &ItemList) -> Vec<u64> {
        list.iter().filter_map(|item| item.window()).map(|w| w.id.get()).collect()
    }

    fn app_ids(list: &ItemList) -> Vec<String> {
        list.iter().filter_map(|item| item.app_id()).map(|id| id.to_string()).collect()
    }

    fn two_workspaces() -> FakeHost {
        let host = FakeHost::new();
        host.set_windows(vec![
            window(1, "term", 0, 0),
            window(2, "web", 1, 0),
            window(3, "term", 0, 0),
            window(4, "mail", 0, 0),
            window(5, "web", 1, 0),
            window(6, "web", 0, 0),
            window(7, "mail", 0, 0),
        ]);
        host
    }

    #[test]
    fn workspace_scope_keeps_mru_order() {
        let host = two_workspaces();
        let settings = Settings::default();
        let params = BuildParams::default();

        let outcome = build(&host, &settings, &params);
        assert_eq!(window_ids(&outcome.list), vec![1, 3, 4, 6, 7]);
        assert_eq!(outcome.scopes_tried, vec![FilterScope::Workspace]);
        assert!(!outcome.filter_changed);

        host.active_workspace.set(1);
        let outcome = build(&host, &settings, &params);
        assert_eq!(window_ids(&outcome.list), vec![2, 5]);
    }

    #[test]
    fn empty_monitor_escalates_to_workspace() {
        let host = FakeHost::new();
        host.set_windows(vec![window(1, "a", 0, 1), window(2, "b", 0, 1), window(3, "c", 0, 1)]);
        host.monitor.set(0);
        let settings = Settings::default();
        let params = BuildParams {
            scope: FilterScope::Monitor,
            ..Default::default()
        };

        let outcome = build(&host, &settings, &params);
        assert_eq!(outcome.scope, FilterScope::Workspace);
        assert_eq!(outcome.scopes_tried, vec![FilterScope::Monitor, FilterScope::Workspace]);
        assert_eq!(outcome.list.len(), 3);
        assert!(outcome.filter_changed);
    }

    #[test]
    fn escalation_is_monotonic_and_bounded() {
        let host = FakeHost::new();
        host.set_windows(vec![window(1, "a", 3, 1)]);
        let settings = Settings::default();
        let params = BuildParams {
            scope: FilterScope::Monitor,
            ..Default::default()
        };

        let outcome = build(&host, &settings, &params);
        assert_eq!(
            outcome.scopes_tried,
            vec![FilterScope::Monitor, FilterScope::Workspace, FilterScope::All]
        );
        assert!(outcome.scopes_tried.windows(2).all(|w| w[0].breadth() > w[1].breadth()));
        assert_eq!(window_ids(&outcome.list), vec![1]);
    }

    #[test]
    fn single_item_relaxes_only_for_keyboard_popups() {
        let host = FakeHost::new();
        host.set_windows(vec![window(1, "a", 0, 0), window(2, "b", 1, 0)]);
        let settings = Settings::default();

        let keyboard = build(&host, &settings, &BuildParams::default());
        assert_eq!(keyboard.scope, FilterScope::All);
        assert_eq!(window_ids(&keyboard.list), vec![1, 2]);

        let pointer = build(&host, &settings, &BuildParams {
            keyboard_triggered: false,
            ..Default::default()
        });
        assert_eq!(pointer.scope, FilterScope::Workspace);
        assert_eq!(window_ids(&pointer.list), vec![1]);
    }

    #[test]
    fn build_is_idempotent() {
        let host = two_workspaces();
        let settings = Settings::default();
        let params = BuildParams {
            group: GroupPolicy::ByApp,
            search: SearchQuery::active("e"),
            ..Default::default()
        };
        assert_eq!(build(&host, &settings, &params), build(&host, &settings, &params));
    }

    #[test]
    fn sticky_windows_follow_the_active_workspace() {
        let host = FakeHost::new();
        let mut pinned = window(9, "notes", 4, 0);
        pinned.sticky = true;
        host.set_windows(vec![window(1, "a", 0, 0), pinned, window(2, "b", 1, 0)]);
        let outcome = build(&host, &Settings::default(), &BuildParams::default());
        assert_eq!(window_ids(&outcome.list), vec![1, 9]);
    }

    #[test]
    fn dialogs_collapse_into_their_parent() {
        let host = FakeHost::new();
        let mut dialog = window(5, "editor", 0, 0);
        dialog.transient_for = Some(WindowId::new(2));
        dialog.skip_taskbar = true;
        let mut hidden = window(6, "panel", 0, 0);
        hidden.skip_taskbar = true;
        host.set_windows(vec![window(1, "term", 0, 0), dialog, hidden, window(2, "editor", 0, 0)]);

        let mut settings = Settings::default();
        let outcome = build(&host, &settings, &BuildParams::default());
        assert_eq!(window_ids(&outcome.list), vec![1, 2]);

        settings.list.include_modals = true;
        let outcome = build(&host, &settings, &BuildParams::default());
        assert_eq!(window_ids(&outcome.list), vec![1, 5, 2]);
    }

    #[test]
    fn stable_sorts_and_minimized_last() {
        let host = FakeHost::new();
        let mut minimized = window(1, "a", 0, 0);
        minimized.minimized = true;
        host.set_windows(vec![window(3, "a", 0, 0), minimized, window(2, "b", 0, 0)]);
        host.focused.set(Some(WindowId::new(2)));

        let mut settings = Settings::default();
        let stable = build(&host, &settings, &BuildParams {
            sort: SortOrder::StableSequence,
            ..Default::default()
        });
        assert_eq!(window_ids(&stable.list), vec![1, 2, 3]);

        let current_first = build(&host, &settings, &BuildParams {
            sort: SortOrder::StableCurrentFirst,
            ..Default::default()
        });
        assert_eq!(window_ids(&current_first.list), vec![2, 1, 3]);

        settings.list.minimized_last = true;
        let mru = build(&host, &settings, &BuildParams::default());
        assert_eq!(window_ids(&mru.list), vec![3, 2, 1]);
    }

    #[test]
    fn grouping_is_a_stable_partition() {
        let host = FakeHost::new();
        host.set_windows(vec![
            window(1, "web", 0, 1),
            window(2, "term", 1, 0),
            window(3, "web", 2, 0),
            window(4, "term", 0, 0),
            window(5, "mail", 1, 1),
        ]);
        host.active_workspace.set(1);
        let settings = Settings::default();
        let params = |group| BuildParams {
            scope: FilterScope::All,
            group,
            ..Default::default()
        };

        let by_app = build(&host, &settings, &params(GroupPolicy::ByApp));
        assert_eq!(window_ids(&by_app.list), vec![1, 3, 2, 4, 5]);

        let by_workspace = build(&host, &settings, &params(GroupPolicy::ByWorkspace));
        assert_eq!(window_ids(&by_workspace.list), vec![1, 4, 2, 5, 3]);

        let by_monitor = build(&host, &settings, &params(GroupPolicy::CurrentMonitorFirst));
        assert_eq!(window_ids(&by_monitor.list), vec![2, 3, 4, 1, 5]);
    }

    #[test]
    fn single_app_constraint() {
        let host = two_workspaces();
        let params = BuildParams {
            scope: FilterScope::All,
            single_app: Some(SingleApp { id: AppId::new("web"), name: "Web".into() }),
            ..Default::default()
        };
        let outcome = build(&host, &Settings::default(), &params);
        assert_eq!(window_ids(&outcome.list), vec![2, 5, 6]);
    }

    #[test]
    fn empty_query_is_the_unfiltered_list() {
        let host = two_workspaces();
        let settings = Settings::default();
        let inactive = build(&host, &settings, &BuildParams::default());
        let empty = build(&host, &settings, &BuildParams {
            search: SearchQuery::active(""),
            ..Default::default()
        });
        assert_eq!(inactive.list, empty.list);
    }

    #[test]
    fn window_search_ranks_title_prefix_first() {
        let host = FakeHost::new();
        let mut w1 = window(1, "term", 0, 0);
        w1.title = "build log".into();
        let mut w2 = window(2, "editor", 0, 0);
        w2.title = "Rebuild notes".into();
        let mut w3 = window(3, "editor", 0, 0);
        w3.title = "Café builder".into();
        let mut w4 = window(4, "editor", 0, 0);
        w4.title = "unrelated".into();
        host.set_windows(vec![w1, w2, w3, w4]);

        let outcome = build(&host, &Settings::default(), &BuildParams {
            search: SearchQuery::active("BUILD"),
            ..Default::default()
        });
        assert_eq!(window_ids(&outcome.list), vec![1, 3, 2]);

        let accented = build(&host, &Settings::default(), &BuildParams {
            search: SearchQuery::active("cafe"),
            ..Default::default()
        });
        assert_eq!(window_ids(&accented.list), vec![3]);
    }

    #[test]
    fn search_matches_app_names() {
        let host = two_workspaces();
        host.installed.borrow_mut().push(app("mail", "Mail App"));
        let outcome = build(&host, &Settings::default(), &BuildParams {
            search: SearchQuery::active("mail app"),
            ..Default::default()
        });
        assert_eq!(window_ids(&outcome.list), vec![4, 7]);
    }

    #[test]
    fn failed_window_search_falls_back_to_apps() {
        let host = two_workspaces();
        host.installed.borrow_mut().extend([
            app("firefox", "Firefox"),
            app("zeal", "Zeal"),
        ]);
        let outcome = build(&host, &Settings::default(), &BuildParams {
            search: SearchQuery::active("fire"),
            ..Default::default()
        });
        assert_eq!(outcome.fallback, Some(Fallback::AppSearch));
        assert_eq!(outcome.mode, SwitcherMode::Apps);
        assert_eq!(app_ids(&outcome.list), vec!["firefox"]);
    }

    #[test]
    fn app_search_ranking() {
        let host = FakeHost::new();
        let mut described = app("web", "Web");
        described.description = Some("Sets the world on fire".into());
        host.installed.borrow_mut().extend([
            described,
            app("moz", "Mozilla Firefox Browser"),
            app("firefox", "Firefox"),
            app("hidden-fire", "Fire Hidden"),
        ]);
        host.installed.borrow_mut()[3].should_show = false;
        host.usage.borrow_mut().insert(AppId::new("web"), 50);

        let outcome = build(&host, &Settings::default(), &BuildParams {
            mode: SwitcherMode::Apps,
            search: SearchQuery::active("fire"),
            ..Default::default()
        });
        assert_eq!(app_ids(&outcome.list), vec!["firefox", "moz", "web"]);
    }

    #[test]
    fn running_apps_are_boosted_and_limited() {
        let host = FakeHost::new();
        host.installed.borrow_mut().extend([
            app("firefox", "Firefox"),
            app("fireworks", "Fireworks"),
            app("bonfire", "Bonfire"),
        ]);
        host.running.borrow_mut().push(app("bonfire", "Bonfire"));
        host.actions.borrow_mut().push(crate::model::item::SystemAction {
            id: "suspend".into(),
            name: "Suspend".into(),
            keywords: vec!["fire".into()],
        });

        let mut settings = Settings::default();
        settings.apps.search_limit = 2;
        let params = BuildParams {
            mode: SwitcherMode::Apps,
            search: SearchQuery::active("fire"),
            ..Default::default()
        };
        let outcome = build(&host, &settings, &params);
        assert_eq!(outcome.list.keys(), vec![
            ItemKey::App(AppId::new("bonfire")),
            ItemKey::App(AppId::new("firefox")),
            ItemKey::SystemAction("suspend".into()),
        ]);

        settings.apps.running_boost = false;
        settings.apps.system_actions = false;
        let outcome = build(&host, &settings, &params);
        assert_eq!(app_ids(&outcome.list), vec!["firefox", "fireworks"]);
    }

    #[test]
    fn app_list_uses_list_and_app_scopes() {
        let host = two_workspaces();
        host.running.borrow_mut().extend([
            app("mail", "Mail"),
            app("web", "Web"),
            app("chat", "Chat"),
            app("term", "Term"),
        ]);
        let params = BuildParams {
            mode: SwitcherMode::Apps,
            app_scope: FilterScope::All,
            ..Default::default()
        };
        let outcome = build(&host, &Settings::default(), &params);
        assert_eq!(app_ids(&outcome.list), vec!["mail", "web", "term"]);
        let SwitchableItem::App(web) = &outcome.list[1] else { panic!("expected an app") };
        assert_eq!(web.windows, vec![WindowId::new(2), WindowId::new(5), WindowId::new(6)]);
    }

    #[test]
    fn favorites_and_dash_order() {
        let host = two_workspaces();
        host.running.borrow_mut().extend([app("term", "Term"), app("mail", "Mail")]);
        host.installed.borrow_mut().push(app("files", "Files"));
        host.favorites.borrow_mut().extend([AppId::new("files"), AppId::new("mail")]);

        let mut settings = Settings::default();
        settings.apps.show_apps_icon = true;
        let mut params = BuildParams {
            mode: SwitcherMode::Apps,
            include_favorites: true,
            ..Default::default()
        };
        let outcome = build(&host, &settings, &params);
        assert_eq!(outcome.list.keys(), vec![
            ItemKey::App(AppId::new("term")),
            ItemKey::App(AppId::new("mail")),
            ItemKey::App(AppId::new("files")),
            ItemKey::ShowAppsIcon,
        ]);

        params.preserve_mru = false;
        let outcome = build(&host, &settings, &params);
        assert_eq!(app_ids(&outcome.list), vec!["files", "mail", "term"]);
    }

    #[test]
    fn single_running_app_reopens_as_windows() {
        let host = FakeHost::new();
        host.set_windows(vec![window(1, "term", 0, 0), window(2, "term", 0, 0), window(3, "web", 1, 0)]);
        host.running.borrow_mut().push(app("term", "Term"));

        let outcome = build(&host, &Settings::default(), &BuildParams {
            mode: SwitcherMode::Apps,
            ..Default::default()
        });
        assert_eq!(outcome.fallback, Some(Fallback::WindowsForSingleApp));
        assert_eq!(outcome.mode, SwitcherMode::Windows);
        assert_eq!(outcome.scope, FilterScope::Workspace);
        assert_eq!(window_ids(&outcome.list), vec![1, 2]);
    }

    #[test]
    fn app_lists_escalate_when_the_workspace_is_empty() {
        let host = FakeHost::new();
        host.set_windows(vec![window(1, "term", 1, 0), window(2, "web", 1, 0), window(3, "term", 1, 0)]);
        host.running.borrow_mut().extend([app("term", "Term"), app("web", "Web")]);
        let mut settings = Settings::default();
        let params = BuildParams {
            mode: SwitcherMode::Apps,
            ..Default::default()
        };

        let outcome = build(&host, &settings, &params);
        assert_eq!(outcome.scopes_tried, vec![FilterScope::Workspace, FilterScope::All]);
        assert_eq!(outcome.mode, SwitcherMode::Apps);
        assert!(outcome.filter_changed);
        assert_eq!(app_ids(&outcome.list), vec!["term", "web"]);
        let SwitchableItem::App(term) = &outcome.list[0] else { panic!("expected an app") };
        assert_eq!(term.windows, vec![WindowId::new(1), WindowId::new(3)]);

        settings.apps.show_apps_icon = true;
        let outcome = build(&host, &settings, &params);
        assert_eq!(outcome.scopes_tried, vec![FilterScope::Workspace, FilterScope::All]);
        assert_eq!(outcome.list.keys(), vec![
            ItemKey::App(AppId::new("term")),
            ItemKey::App(AppId::new("web")),
            ItemKey::ShowAppsIcon,
        ]);
    }

    #[test]
    fn apps_icon_does_not_hide_a_single_running_app() {
        let host = FakeHost::new();
        host.set_windows(vec![window(1, "term", 0, 0), window(2, "term", 0, 0)]);
        host.running.borrow_mut().push(app("term", "Term"));
        let mut settings = Settings::default();
        settings.apps.show_apps_icon = true;

        let outcome = build(&host, &settings, &BuildParams {
            mode: SwitcherMode::Apps,
            ..Default::default()
        });
        assert_eq!(outcome.fallback, Some(Fallback::WindowsForSingleApp));
        assert_eq!(outcome.list.keys(), vec![
            ItemKey::Window(WindowId::new(1)),
            ItemKey::Window(WindowId::new(2)),
        ]);
    }

    #[test]
    fn no_windows_at_all_shows_the_dash() {
        let host = FakeHost::new();
        host.running.borrow_mut().push(app("daemon", "Daemon"));
        host.installed.borrow_mut().push(app("files", "Files"));
        host.favorites.borrow_mut().push(AppId::new("files"));

        let outcome = build(&host, &Settings::default(), &BuildParams::default());
        assert_eq!(outcome.fallback, Some(Fallback::Dash));
        assert_eq!(outcome.mode, SwitcherMode::Apps);
        assert!(!outcome.filter_changed);
        assert_eq!(app_ids(&outcome.list), vec!["daemon", "files"]);
    }

    #[test]
    fn searching_without_across_scopes_stays_put() {
        let host = two_workspaces();
        let mut settings = Settings::default();
        settings.search.across_scopes = false;
        settings.search.apps_fallback = false;
        let outcome = build(&host, &settings, &BuildParams {
            search: SearchQuery::active("web web"),
            ..Default::default()
        });
        assert_eq!(window_ids(&outcome.list), vec![6]);

        let outcome = build(&host, &settings, &BuildParams {
            search: SearchQuery::active("nothing"),
            ..Default::default()
        });
        assert!(outcome.list.is_empty());
        assert_eq!(outcome.scopes_tried, vec![FilterScope::Workspace]);
        assert_eq!(outcome.fallback, None);
    }
}
