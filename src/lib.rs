//! Core of an alt-tab style switcher popup.
//!
//! The crate builds the switchable item list from host-supplied window and
//! application data, tracks the selection across rebuilds, and maps raw
//! input onto switcher commands. Rendering and window-manager effects stay
//! with the host, behind the traits in [`sys`] and [`ui::renderer`].

pub mod actor;
pub mod common;
pub mod model;
pub mod sys;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use actor::popup::{Host, PopupController, SwitcherError};
pub use actor::switcher::{Event, SwitcherActor};
pub use common::config::Config;
