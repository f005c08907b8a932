//! Reloads the config file when it changes on disk.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by renaming a temp file over the original are seen.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tracing::{debug, info, warn};

use super::switcher::{self, Event};
use crate::common::config::Config;

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Keeps the watch alive; dropping it stops reloading.
pub struct ConfigWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ConfigWatcher {
    /// Starts watching `path` if the config asks for hot reload.
    pub fn spawn(
        config: &Config,
        path: PathBuf,
        tx: switcher::Sender,
    ) -> anyhow::Result<Option<ConfigWatcher>> {
        if !config.settings.hot_reload {
            debug!("hot reload disabled");
            return Ok(None);
        }
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("config path {} has no parent", path.display()))?
            .to_path_buf();

        let watched = path.clone();
        let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| {
            handle_events(&watched, res, &tx);
        })?;
        debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive)?;
        info!(path = %path.display(), "watching config");

        Ok(Some(ConfigWatcher { _debouncer: debouncer }))
    }
}

fn handle_events(path: &Path, res: DebounceEventResult, tx: &switcher::Sender) {
    let events = match res {
        Ok(events) => events,
        Err(err) => {
            warn!(%err, "config watch error");
            return;
        }
    };
    if !events.iter().any(|e| e.path.file_name() == path.file_name()) {
        return;
    }
    reload(path, tx);
}

fn reload(path: &Path, tx: &switcher::Sender) {
    match Config::read(path) {
        Ok(config) => {
            info!(path = %path.display(), "config changed, reloading");
            tx.send(Event::ConfigUpdated(config));
        }
        // Keep the running config; the file may be mid-edit.
        Err(err) => warn!(path = %path.display(), "ignoring invalid config: {err:#}"),
    }
}
