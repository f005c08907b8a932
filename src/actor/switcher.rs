//! Drives a [`PopupController`] from host events and its own timers.

use std::time::Instant;

use tracing::{debug, info, instrument};

use super::popup::{Host, PopupController};
use crate::actor;
use crate::common::config::Config;
use crate::model::item::WindowId;
use crate::sys::event::{Direction, KeyEvent, MouseEvent, TriggerBinding};

#[derive(Debug)]
pub enum Event {
    Show {
        direction: Direction,
        trigger: TriggerBinding,
    },
    Dismiss,
    Key(KeyEvent),
    Mouse(MouseEvent),
    WindowCreated(WindowId),
    WindowUnmanaged(WindowId),
    WorkspaceSwitched,
    MonitorsChanged,
    /// Running or installed applications changed.
    AppsChanged,
    SubmenuOpen(bool),
    ConfigUpdated(Config),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

pub struct SwitcherActor {
    popup: PopupController,
    rx: Receiver,
}

impl SwitcherActor {
    pub fn new(host: Host, config: Config, rx: Receiver) -> Self {
        SwitcherActor {
            popup: PopupController::new(host, config),
            rx,
        }
    }

    pub fn popup(&self) -> &PopupController { &self.popup }

    /// Runs until every sender is dropped.
    pub async fn run(mut self) {
        loop {
            let deadline = self.popup.next_deadline();
            tokio::select! {
                msg = self.rx.recv() => {
                    let Some((span, event)) = msg else { break };
                    let _guard = span.enter();
                    self.handle_event(event);
                }
                () = sleep_until(deadline) => self.popup.process_timers(),
            }
        }
        debug!("switcher actor stopped");
    }

    #[instrument(skip(self))]
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Show { direction, trigger } => {
                if let Err(err) = self.popup.show(direction, trigger) {
                    debug!(%err, "switcher not shown");
                }
            }
            Event::Dismiss => self.popup.dismiss(),
            Event::Key(key) => self.popup.handle_key(key),
            Event::Mouse(mouse) => self.popup.handle_mouse(mouse),
            Event::WindowCreated(id) => self.popup.window_created(id),
            Event::WindowUnmanaged(id) => self.popup.window_unmanaged(id),
            Event::WorkspaceSwitched => self.popup.workspace_switched(),
            Event::MonitorsChanged => self.popup.monitors_changed(),
            Event::AppsChanged => self.popup.request_rebuild(),
            Event::SubmenuOpen(open) => self.popup.set_submenu_open(open),
            Event::ConfigUpdated(config) => {
                info!("applying updated config");
                self.popup.update_config(config);
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}
