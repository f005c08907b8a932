//! The switcher popup: owns the current list, the selection and the timers,
//! and turns input and host events into rebuilds and executor requests.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, trace, warn};

use super::auto_commit::{AutoCommit, PointerCheck};
use crate::common::config::Config;
use crate::model::filter::{
    BuildParams, FilterScope, GroupPolicy, SearchQuery, SingleApp, SortOrder, SwitcherMode,
};
use crate::model::item::{ItemKey, ItemList, SwitchableItem, WindowId};
use crate::model::item_source::{BuildOutcome, ItemSource};
use crate::model::selection::{InitialHints, Removal, SelectionState, workspace_anchor};
use crate::sys::event::{Direction, KeyEvent, MouseEvent, TriggerBinding};
use crate::sys::executor::{ActionExecutor, ActionRequest, WorkspaceTarget};
use crate::sys::query::{AppSystemQuery, WindowSystemQuery};
use crate::sys::timer::{Clock, TimerKind, Timers};
use crate::ui::input::{ActionName, Command, KeyContext, dispatch_key, dispatch_mouse};
use crate::ui::renderer::{
    GrabError, ItemListSource, Renderer, SelectionController, SwitcherEvent,
};

/// Collaborators supplied by the host.
#[derive(Clone)]
pub struct Host {
    pub windows: Rc<dyn WindowSystemQuery>,
    pub apps: Rc<dyn AppSystemQuery>,
    pub executor: Rc<dyn ActionExecutor>,
    pub renderer: Rc<dyn Renderer>,
    pub clock: Rc<dyn Clock>,
}

#[derive(thiserror::Error, Debug)]
pub enum SwitcherError {
    #[error("nothing to switch to")]
    NoItems,
    #[error("could not grab input: {0}")]
    InputGrab(#[from] GrabError),
}

/// What to select after a rebuild.
#[derive(Debug, Clone)]
enum Reselect {
    /// The item that was selected before, if it survived.
    Keep,
    Key(Option<ItemKey>),
    First,
}

pub struct PopupController {
    host: Host,
    config: Config,
    params: BuildParams,
    selection: SelectionState,
    timers: Timers,
    trigger: TriggerBinding,
    visible: bool,
    /// Scope and mode of the list on screen, after any escalation.
    shown_scope: FilterScope,
    shown_mode: SwitcherMode,
    filter_changed: bool,
    submenu_open: bool,
    /// Show request waiting for the focus-retry timer.
    retry: Option<(Direction, TriggerBinding)>,
}

impl PopupController {
    pub fn new(host: Host, mut config: Config) -> Self {
        config.repair();
        let list = &config.settings.list;
        let selection = SelectionState::new(list.initial_selection, list.wraparound);
        PopupController {
            host,
            params: BuildParams::default(),
            selection,
            timers: Timers::new(),
            trigger: TriggerBinding::default(),
            visible: false,
            shown_scope: config.settings.list.filter,
            shown_mode: config.settings.list.mode,
            filter_changed: false,
            submenu_open: false,
            retry: None,
            config,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn is_visible(&self) -> bool { self.visible }

    pub fn params(&self) -> &BuildParams { &self.params }

    pub fn mode(&self) -> SwitcherMode { self.shown_mode }

    pub fn search(&self) -> &SearchQuery { &self.params.search }

    pub fn single_app(&self) -> Option<&SingleApp> { self.params.single_app.as_ref() }

    pub fn selected_item(&self) -> Option<&SwitchableItem> { self.selection.selected_item() }

    pub fn selected_key(&self) -> Option<ItemKey> { self.selection.selected_key() }

    pub fn next_deadline(&self) -> Option<Instant> { self.timers.next_deadline() }

    pub fn is_timer_pending(&self, kind: TimerKind) -> bool { self.timers.is_pending(kind) }

    fn now(&self) -> Instant { self.host.clock.now() }

    fn initial_params(&self, trigger: TriggerBinding) -> BuildParams {
        let list = &self.config.settings.list;
        let apps = &self.config.settings.apps;
        BuildParams {
            mode: list.mode,
            scope: list.filter,
            app_scope: list.app_filter,
            sort: list.sort,
            group: list.group,
            search: SearchQuery::inactive(),
            single_app: None,
            keyboard_triggered: trigger.is_keyboard(),
            include_favorites: apps.include_favorites,
            preserve_mru: apps.preserve_mru,
        }
    }

    /// Opens the popup, or steps the selection when it is already open.
    #[instrument(skip(self))]
    pub fn show(&mut self, direction: Direction, trigger: TriggerBinding) -> Result<(), SwitcherError> {
        self.open(direction, trigger, false)
    }

    fn open(
        &mut self,
        direction: Direction,
        trigger: TriggerBinding,
        is_retry: bool,
    ) -> Result<(), SwitcherError> {
        if self.visible {
            match direction {
                Direction::Forward => self.next(),
                Direction::Backward => self.previous(),
            };
            return Ok(());
        }

        let list = &self.config.settings.list;
        self.trigger = trigger;
        self.params = self.initial_params(trigger);
        self.selection = SelectionState::new(list.initial_selection, list.wraparound);
        self.selection
            .set_reversed(!trigger.is_keyboard() && list.pointer_affinity_reverse);

        let outcome = self.build();
        if outcome.list.is_empty() {
            debug!("no items to show");
            return Err(SwitcherError::NoItems);
        }

        if let Err(err) = self.host.renderer.grab_input() {
            warn!(%err, "switcher could not grab input");
            self.teardown(false);
            if !is_retry {
                self.retry = Some((direction, trigger));
                let delay = Duration::from_millis(self.config.settings.timing.focus_retry_ms);
                self.timers.schedule(TimerKind::FocusRetry, self.now(), delay);
            }
            return Err(SwitcherError::InputGrab(err));
        }

        self.visible = true;
        let hints = self.hints(outcome.mode, &outcome.list);
        self.selection.reset(outcome.list, &hints);
        if direction == Direction::Backward {
            self.selection.select_last();
        }
        let interval = Duration::from_millis(self.config.settings.timing.idle_timeout_ms);
        self.timers.schedule_repeating(TimerKind::AutoCommit, self.now(), interval);
        self.notify_rebuilt();
        Ok(())
    }

    fn build(&mut self) -> BuildOutcome {
        let source = ItemSource::new(
            &*self.host.windows,
            &*self.host.apps,
            &self.config.settings,
        );
        let outcome = source.build(&self.params);
        self.shown_scope = outcome.scope;
        self.shown_mode = outcome.mode;
        self.filter_changed = outcome.filter_changed;
        outcome
    }

    fn hints(&self, mode: SwitcherMode, list: &ItemList) -> InitialHints {
        let focused = match mode {
            SwitcherMode::Windows => self.host.windows.focused_window().map(ItemKey::Window),
            SwitcherMode::Apps => self.host.apps.focused_app().map(ItemKey::App),
        };
        let anchored = mode == SwitcherMode::Windows
            && self.params.group == GroupPolicy::ByWorkspace
            && self.params.sort == SortOrder::Mru
            && !self.params.search.is_active();
        let anchor = if anchored {
            let workspace = self.host.windows.active_workspace();
            workspace_anchor(list, workspace, self.selection.is_reversed())
        } else {
            None
        };
        InitialHints { focused, anchor }
    }

    /// Rebuilds now. A debounced rebuild still waiting is covered by this one.
    fn rebuild(&mut self, reselect: Reselect) {
        self.timers.cancel(TimerKind::RebuildDebounce);
        let prior = match reselect {
            Reselect::Keep => self.selection.selected_key(),
            Reselect::Key(ref key) => key.clone(),
            Reselect::First => None,
        };
        let outcome = self.build();
        if outcome.list.is_empty() && !self.params.search.is_active() {
            debug!("rebuild left nothing to show");
            self.dismiss();
            return;
        }
        let hints = self.hints(outcome.mode, &outcome.list);
        match reselect {
            Reselect::First => {
                self.selection.reset(outcome.list, &hints);
                self.selection.select_first();
            }
            _ => self.selection.replace(outcome.list, prior.as_ref(), &hints),
        }
        self.notify_rebuilt();
    }

    /// Schedules a rebuild after the debounce delay; repeated requests push
    /// the deadline back so a burst produces one rebuild.
    pub fn request_rebuild(&mut self) {
        if !self.visible {
            return;
        }
        let delay = Duration::from_millis(self.config.settings.timing.rebuild_debounce_ms);
        self.timers.schedule(TimerKind::RebuildDebounce, self.now(), delay);
    }

    fn notify(&self, event: SwitcherEvent) { self.host.renderer.notify(&event); }

    fn notify_rebuilt(&self) {
        self.notify(SwitcherEvent::ListRebuilt {
            len: self.selection.list().len(),
            selected: self.selection.selected_index(),
            scope: self.shown_scope,
            mode: self.shown_mode,
            search_active: self.params.search.is_active(),
            filter_changed: self.filter_changed,
        });
    }

    fn notify_selection(&self) {
        self.notify(SwitcherEvent::SelectionChanged {
            index: self.selection.selected_index(),
        });
    }

    fn execute(&self, request: ActionRequest) {
        let name = request.name();
        trace!(action = name, "executing");
        if let Err(err) = self.host.executor.execute(request) {
            warn!(action = name, %err, "switcher action failed");
        }
    }

    pub fn select(&mut self, index: usize) -> bool {
        let changed = self.selection.select(index);
        if changed {
            self.notify_selection();
        }
        changed
    }

    pub fn next(&mut self) -> bool {
        let changed = self.selection.next();
        if changed {
            self.notify_selection();
        }
        changed
    }

    pub fn previous(&mut self) -> bool {
        let changed = self.selection.previous();
        if changed {
            self.notify_selection();
        }
        changed
    }

    fn select_first(&mut self) {
        if self.selection.select_first() {
            self.notify_selection();
        }
    }

    fn select_last(&mut self) {
        if self.selection.select_last() {
            self.notify_selection();
        }
    }

    /// Commits the selection and closes the popup.
    #[instrument(skip(self))]
    pub fn finish(&mut self) {
        let Some(item) = self.selection.selected_item().cloned() else {
            self.dismiss();
            return;
        };
        let request = match item {
            SwitchableItem::ShowAppsIcon => ActionRequest::ShowAppGrid,
            other => ActionRequest::Activate { item: other.key() },
        };
        self.teardown(true);
        self.execute(request);
    }

    #[instrument(skip(self))]
    pub fn dismiss(&mut self) { self.teardown(false); }

    fn teardown(&mut self, committed: bool) {
        self.timers.cancel_all();
        self.retry = None;
        self.submenu_open = false;
        if !self.visible {
            return;
        }
        self.visible = false;
        self.host.renderer.release_input();
        self.selection = SelectionState::new(
            self.config.settings.list.initial_selection,
            self.config.settings.list.wraparound,
        );
        self.notify(SwitcherEvent::Hidden { committed });
    }

    pub fn toggle_search(&mut self) {
        if self.params.search.is_active() {
            self.params.search = SearchQuery::inactive();
            self.rebuild(Reselect::Keep);
        } else {
            self.params.search = SearchQuery::active("");
            self.rebuild(Reselect::First);
        }
    }

    fn search_push(&mut self, ch: char) {
        self.params.search.push(ch);
        self.rebuild(Reselect::First);
    }

    fn search_pop(&mut self) {
        if self.params.search.pop() {
            self.rebuild(Reselect::First);
        }
    }

    pub fn toggle_single_app(&mut self) {
        if self.params.single_app.is_some() {
            self.exit_single_app();
            return;
        }
        let Some(item) = self.selection.selected_item() else { return };
        let Some(id) = item.app_id().cloned() else { return };
        let name = match item {
            SwitchableItem::App(app) => app.app.name.clone(),
            SwitchableItem::Window(window) => {
                window.app_name.clone().unwrap_or_else(|| id.to_string())
            }
            _ => id.to_string(),
        };
        // An app entry narrows to its windows, starting with its most recent one.
        let key = item.primary_window().map(ItemKey::Window);
        self.params.single_app = Some(SingleApp { id, name });
        self.rebuild(Reselect::Key(key));
    }

    pub fn exit_single_app(&mut self) {
        if self.params.single_app.take().is_none() {
            return;
        }
        let key = match self.selection.selected_item() {
            Some(item) if self.params.mode == SwitcherMode::Apps => item.app_id().cloned().map(ItemKey::App),
            Some(item) => Some(item.key()),
            None => None,
        };
        self.rebuild(Reselect::Key(key));
    }

    /// Ignored while narrowed to one app, which always lists windows.
    pub fn toggle_switcher_mode(&mut self) {
        if self.params.single_app.is_some() {
            trace!("mode toggle ignored in single-app mode");
            return;
        }
        let target = self.shown_mode.toggled();
        let key = self.selection.selected_item().and_then(|item| match target {
            SwitcherMode::Apps => item.app_id().cloned().map(ItemKey::App),
            SwitcherMode::Windows => item.primary_window().map(ItemKey::Window),
        });
        self.params.mode = target;
        self.rebuild(Reselect::Key(key));
    }

    pub fn toggle_group_by_workspace(&mut self) {
        self.params.group = match self.params.group {
            GroupPolicy::ByWorkspace => GroupPolicy::None,
            _ => GroupPolicy::ByWorkspace,
        };
        self.rebuild(Reselect::Keep);
    }

    pub fn toggle_group_by_app(&mut self) {
        self.params.group = match self.params.group {
            GroupPolicy::ByApp => GroupPolicy::None,
            _ => GroupPolicy::ByApp,
        };
        self.rebuild(Reselect::Keep);
    }

    pub fn cycle_filter_scope(&mut self) {
        self.params.scope = self.params.scope.cycle();
        self.rebuild(Reselect::Keep);
    }

    pub fn set_submenu_open(&mut self, open: bool) { self.submenu_open = open; }

    #[instrument(skip(self))]
    pub fn handle_key(&mut self, event: KeyEvent) {
        if !self.visible {
            return;
        }
        let command = dispatch_key(event, &KeyContext {
            config: &self.config,
            search_active: self.params.search.is_active(),
            single_app: self.params.single_app.is_some(),
            trigger: self.trigger.modifiers,
            overlay_armed: self.timers.is_pending(TimerKind::OverlayDoublePress),
        });
        self.apply(command);
    }

    #[instrument(skip(self))]
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if !self.visible {
            return;
        }
        let command = dispatch_mouse(event, &self.config.settings.mouse);
        self.apply(command);
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Select { index, activate } => {
                if index < self.selection.list().len() {
                    self.select(index);
                    if activate {
                        self.finish();
                    }
                }
            }
            Command::SearchPush(ch) => self.search_push(ch),
            Command::SearchPop => self.search_pop(),
            Command::StartSearch(ch) => {
                self.params.search = SearchQuery::active(ch.to_string());
                self.rebuild(Reselect::First);
            }
            Command::ExitSingleApp => self.exit_single_app(),
            Command::Next => {
                self.next();
            }
            Command::Previous => {
                self.previous();
            }
            Command::SelectFirst => self.select_first(),
            Command::SelectLast => self.select_last(),
            Command::ToggleSingleApp => self.toggle_single_app(),
            Command::ToggleGroupByApp => self.toggle_group_by_app(),
            Command::CycleFilterScope => self.cycle_filter_scope(),
            Command::ArmOverlay => {
                let delay =
                    Duration::from_millis(self.config.settings.timing.overlay_double_press_ms);
                self.timers.schedule(TimerKind::OverlayDoublePress, self.now(), delay);
            }
            Command::OverlayDoublePress => {
                self.timers.cancel(TimerKind::OverlayDoublePress);
                self.toggle_switcher_mode();
            }
            Command::SwitchWorkspace(direction) => self.switch_workspace(direction),
            Command::MoveSelected { direction, new_workspace } => {
                self.move_selected(direction, new_workspace)
            }
            Command::Run { action, target } => self.run_action(action, target),
            Command::Dismiss => self.dismiss(),
            Command::Commit => self.finish(),
            Command::Ignore => {}
        }
    }

    fn switch_workspace(&mut self, direction: Direction) {
        let active = self.host.windows.active_workspace();
        let count = self.host.windows.workspace_count();
        let target = match direction {
            Direction::Backward => active.checked_sub(1),
            Direction::Forward => Some(active + 1).filter(|ws| *ws < count),
        };
        if let Some(workspace) = target {
            self.execute(ActionRequest::SwitchWorkspace { workspace });
        }
    }

    /// Neighbouring workspace for a window move; moving off either end
    /// creates a workspace there.
    fn move_target(&self, direction: Direction, new_workspace: bool) -> WorkspaceTarget {
        let active = self.host.windows.active_workspace();
        let count = self.host.windows.workspace_count();
        match (new_workspace, direction) {
            (true, Direction::Backward) => WorkspaceTarget::NewAt(active),
            (true, Direction::Forward) => WorkspaceTarget::NewAt(active + 1),
            (false, Direction::Backward) if active == 0 => WorkspaceTarget::NewAt(0),
            (false, Direction::Backward) => WorkspaceTarget::Existing(active - 1),
            (false, Direction::Forward) if active + 1 >= count => WorkspaceTarget::NewAt(count),
            (false, Direction::Forward) => WorkspaceTarget::Existing(active + 1),
        }
    }

    fn move_selected(&mut self, direction: Direction, new_workspace: bool) {
        let Some(window) = self.selection.selected_item().and_then(SwitchableItem::window) else {
            return;
        };
        let window = window.id;
        let target = self.move_target(direction, new_workspace);
        self.execute(ActionRequest::MoveToWorkspace { window, target });
        self.request_rebuild();
    }

    fn target_item(&self, target: Option<usize>) -> Option<SwitchableItem> {
        match target {
            Some(index) => self.selection.list().get(index).cloned(),
            None => self.selection.selected_item().cloned(),
        }
    }

    fn run_action(&mut self, action: ActionName, target: Option<usize>) {
        trace!(%action, ?target, "running action");
        match action {
            ActionName::Activate => {
                if let Some(index) = target {
                    // A stale index must not commit whatever happens to be selected.
                    if index >= self.selection.list().len() {
                        return;
                    }
                    self.select(index);
                }
                self.finish();
            }
            ActionName::Select => {
                if let Some(index) = target {
                    self.select(index);
                }
            }
            ActionName::SelectNext => {
                self.next();
            }
            ActionName::SelectPrevious => {
                self.previous();
            }
            ActionName::Dismiss => self.dismiss(),
            ActionName::ToggleSearch => self.toggle_search(),
            ActionName::ToggleSwitcherMode => self.toggle_switcher_mode(),
            ActionName::ToggleSingleApp => self.toggle_single_app(),
            ActionName::ToggleGroupByApp => self.toggle_group_by_app(),
            ActionName::ToggleGroupByWorkspace => self.toggle_group_by_workspace(),
            ActionName::CycleFilterScope => self.cycle_filter_scope(),
            ActionName::OpenPreferences => {
                self.dismiss();
                self.execute(ActionRequest::OpenPreferences);
            }
            ActionName::CloseQuit | ActionName::Kill => {
                let Some(item) = self.target_item(target) else { return };
                let item = item.key();
                self.execute(match action {
                    ActionName::Kill => ActionRequest::Kill { item },
                    _ => ActionRequest::CloseQuit { item },
                });
            }
            ActionName::NewWindow => {
                let Some(app) = self.target_item(target).and_then(|i| i.app_id().cloned()) else {
                    return;
                };
                self.dismiss();
                self.execute(ActionRequest::NewWindow { app });
            }
            ActionName::ToggleAbove
            | ActionName::ToggleSticky
            | ActionName::MaximizeOnCurrentMonitor
            | ActionName::CreateThumbnail => {
                let Some(window) = self.target_item(target).and_then(|i| i.primary_window()) else {
                    return;
                };
                self.execute(window_request(action, window));
            }
        }
    }

    /// Host reports a new window.
    pub fn window_created(&mut self, id: WindowId) {
        trace!(%id, "window created");
        self.request_rebuild();
    }

    /// Host reports a window went away. Window lists drop the item in place;
    /// app lists are rebuilt when an app entry owned the window.
    #[instrument(skip(self))]
    pub fn window_unmanaged(&mut self, id: WindowId) {
        if !self.visible {
            return;
        }
        if self.shown_mode == SwitcherMode::Apps {
            if self.selection.list().iter().any(|item| item.contains_window(id)) {
                self.request_rebuild();
            }
            return;
        }
        match self.selection.remove(&ItemKey::Window(id)) {
            Removal::NotPresent => {}
            Removal::Removed { index } => self.notify(SwitcherEvent::ItemRemoved {
                index,
                selected: self.selection.selected_index(),
            }),
            Removal::Exhausted => self.rebuild(Reselect::Keep),
        }
    }

    pub fn workspace_switched(&mut self) { self.request_rebuild(); }

    pub fn monitors_changed(&mut self) { self.request_rebuild(); }

    /// Installs a new configuration snapshot.
    pub fn update_config(&mut self, mut config: Config) {
        config.repair();
        self.selection.set_wraparound(config.settings.list.wraparound);
        self.selection.set_policy(config.settings.list.initial_selection);
        self.config = config;
        self.request_rebuild();
    }

    /// Runs every timer that is due.
    pub fn process_timers(&mut self) {
        let now = self.now();
        for kind in self.timers.take_due(now) {
            trace!(%kind, "timer fired");
            match kind {
                TimerKind::RebuildDebounce => {
                    if self.visible {
                        self.rebuild(Reselect::Keep);
                    }
                }
                TimerKind::AutoCommit => {
                    if self.visible {
                        self.check_pointer();
                    }
                }
                TimerKind::OverlayDoublePress => {
                    if self.visible {
                        self.dismiss();
                        self.execute(ActionRequest::ShowOverview);
                    }
                }
                TimerKind::FocusRetry => {
                    if let Some((direction, trigger)) = self.retry.take()
                        && !self.visible
                        && let Err(err) = self.open(direction, trigger, true)
                    {
                        warn!(%err, "switcher retry failed");
                    }
                }
            }
        }
    }

    fn check_pointer(&mut self) {
        let pointer = &self.config.settings.pointer;
        let check = PointerCheck {
            keyboard_triggered: self.trigger.is_keyboard(),
            pointer: self.host.windows.pointer(),
            popup: self.host.renderer.popup_bounds(),
            secondary: self.host.renderer.secondary_bounds(),
            suppressed: self.params.search.is_active() || self.submenu_open,
            commit_on_exit: pointer.activate_on_hide || pointer.preview_mode.requires_commit(),
        };
        match check.evaluate() {
            AutoCommit::Commit => self.finish(),
            AutoCommit::Dismiss => self.dismiss(),
            AutoCommit::Wait => {}
        }
    }
}

fn window_request(action: ActionName, window: WindowId) -> ActionRequest {
    match action {
        ActionName::ToggleAbove => ActionRequest::ToggleAbove { window },
        ActionName::ToggleSticky => ActionRequest::ToggleSticky { window },
        ActionName::CreateThumbnail => ActionRequest::CreateThumbnail { window },
        _ => ActionRequest::MaximizeOnCurrentMonitor { window },
    }
}

impl ItemListSource for PopupController {
    fn current_list(&self) -> ItemList { self.selection.list().clone() }

    fn is_search_active(&self) -> bool { self.params.search.is_active() }

    fn current_filter_scope(&self) -> FilterScope { self.shown_scope }
}

impl SelectionController for PopupController {
    fn selected_index(&self) -> Option<usize> { self.selection.selected_index() }

    fn select(&mut self, index: usize) -> bool { PopupController::select(self, index) }

    fn next(&mut self) -> bool { PopupController::next(self) }

    fn previous(&mut self) -> bool { PopupController::previous(self) }
}
