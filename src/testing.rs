//! In-memory host used by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::actor::popup::Host;
use crate::common::collections::HashMap;
use crate::model::item::{AppId, AppInfo, SystemAction, WindowId, WindowInfo};
use crate::sys::executor::{ActionExecutor, ActionRequest, ExecutorError};
use crate::sys::geometry::{Point, Rect};
use crate::sys::query::{AppSystemQuery, WindowSystemQuery};
use crate::sys::timer::Clock;
use crate::ui::renderer::{GrabError, Renderer, SwitcherEvent};

pub fn window(id: u64, app: &str, workspace: usize, monitor: usize) -> WindowInfo {
    WindowInfo {
        id: WindowId::new(id),
        app_id: Some(AppId::new(app)),
        title: format!("{app} {id}"),
        workspace,
        monitor,
        minimized: false,
        above: false,
        sticky: false,
        skip_taskbar: false,
        transient_for: None,
        stable_seq: id,
    }
}

pub fn app(id: &str, name: &str) -> AppInfo {
    AppInfo {
        id: AppId::new(id),
        name: name.to_string(),
        should_show: true,
        ..Default::default()
    }
}

pub struct FakeHost {
    pub windows: RefCell<Vec<WindowInfo>>,
    pub active_workspace: Cell<usize>,
    pub workspace_count: Cell<usize>,
    pub monitor: Cell<usize>,
    pub focused: Cell<Option<WindowId>>,
    pub pointer: Cell<Point>,

    pub running: RefCell<Vec<AppInfo>>,
    pub installed: RefCell<Vec<AppInfo>>,
    pub usage: RefCell<HashMap<AppId, u32>>,
    pub actions: RefCell<Vec<SystemAction>>,
    pub favorites: RefCell<Vec<AppId>>,
    pub focused_app: RefCell<Option<AppId>>,

    pub executed: RefCell<Vec<ActionRequest>>,
    pub fail_actions: Cell<bool>,

    pub events: RefCell<Vec<SwitcherEvent>>,
    pub grabbed: Cell<bool>,
    /// Number of upcoming grab attempts that fail.
    pub grab_failures: Cell<usize>,
    pub popup_bounds: Cell<Option<Rect>>,
    pub secondary_bounds: Cell<Option<Rect>>,
}

impl FakeHost {
    pub fn new() -> Self {
        FakeHost {
            windows: RefCell::new(Vec::new()),
            active_workspace: Cell::new(0),
            workspace_count: Cell::new(4),
            monitor: Cell::new(0),
            focused: Cell::new(None),
            pointer: Cell::new(Point::default()),
            running: RefCell::new(Vec::new()),
            installed: RefCell::new(Vec::new()),
            usage: RefCell::new(HashMap::default()),
            actions: RefCell::new(Vec::new()),
            favorites: RefCell::new(Vec::new()),
            focused_app: RefCell::new(None),
            executed: RefCell::new(Vec::new()),
            fail_actions: Cell::new(false),
            events: RefCell::new(Vec::new()),
            grabbed: Cell::new(false),
            grab_failures: Cell::new(0),
            popup_bounds: Cell::new(Some(Rect::new(0.0, 0.0, 400.0, 200.0))),
            secondary_bounds: Cell::new(None),
        }
    }

    pub fn set_windows(&self, windows: Vec<WindowInfo>) { *self.windows.borrow_mut() = windows; }

    pub fn remove_window(&self, id: u64) {
        self.windows.borrow_mut().retain(|w| w.id != WindowId::new(id));
    }

    pub fn take_events(&self) -> Vec<SwitcherEvent> { self.events.take() }

    pub fn take_executed(&self) -> Vec<ActionRequest> { self.executed.take() }

    pub fn rebuild_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, SwitcherEvent::ListRebuilt { .. }))
            .count()
    }
}

impl WindowSystemQuery for FakeHost {
    fn windows(&self, workspace: Option<usize>) -> Vec<WindowInfo> {
        self.windows
            .borrow()
            .iter()
            .filter(|w| workspace.is_none_or(|ws| w.workspace == ws))
            .cloned()
            .collect()
    }

    fn active_workspace(&self) -> usize { self.active_workspace.get() }

    fn workspace_count(&self) -> usize { self.workspace_count.get() }

    fn current_monitor(&self) -> usize { self.monitor.get() }

    fn focused_window(&self) -> Option<WindowId> { self.focused.get() }

    fn pointer(&self) -> Point { self.pointer.get() }
}

impl AppSystemQuery for FakeHost {
    fn running_apps(&self) -> Vec<AppInfo> { self.running.borrow().clone() }

    fn installed_apps(&self) -> Vec<AppInfo> { self.installed.borrow().clone() }

    fn app(&self, id: &AppId) -> Option<AppInfo> {
        let installed = self.installed.borrow();
        let running = self.running.borrow();
        installed.iter().chain(running.iter()).find(|a| &a.id == id).cloned()
    }

    fn usage_score(&self, id: &AppId) -> u32 { self.usage.borrow().get(id).copied().unwrap_or(0) }

    fn system_actions(&self) -> Vec<SystemAction> { self.actions.borrow().clone() }

    fn favorites(&self) -> Vec<AppId> { self.favorites.borrow().clone() }

    fn focused_app(&self) -> Option<AppId> { self.focused_app.borrow().clone() }
}

impl ActionExecutor for FakeHost {
    fn execute(&self, request: ActionRequest) -> Result<(), ExecutorError> {
        self.executed.borrow_mut().push(request);
        if self.fail_actions.get() {
            return Err(ExecutorError::Host("fake failure".into()));
        }
        Ok(())
    }
}

impl Renderer for FakeHost {
    fn notify(&self, event: &SwitcherEvent) { self.events.borrow_mut().push(event.clone()); }

    fn grab_input(&self) -> Result<(), GrabError> {
        let failures = self.grab_failures.get();
        if failures > 0 {
            self.grab_failures.set(failures - 1);
            return Err(GrabError::AlreadyGrabbed);
        }
        self.grabbed.set(true);
        Ok(())
    }

    fn release_input(&self) { self.grabbed.set(false); }

    fn popup_bounds(&self) -> Option<Rect> { self.popup_bounds.get() }

    fn secondary_bounds(&self) -> Option<Rect> { self.secondary_bounds.get() }
}

pub struct ManualClock(Cell<Instant>);

impl ManualClock {
    pub fn new() -> Self { ManualClock(Cell::new(Instant::now())) }

    pub fn advance(&self, by: Duration) { self.0.set(self.0.get() + by); }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { self.0.get() }
}

pub fn host(fake: &Rc<FakeHost>, clock: &Rc<ManualClock>) -> Host {
    Host {
        windows: fake.clone(),
        apps: fake.clone(),
        executor: fake.clone(),
        renderer: fake.clone(),
        clock: clock.clone(),
    }
}
