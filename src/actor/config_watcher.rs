use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor;
use crate::common::config::{Config, Settings, SharedSettings};

#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// New settings are active. `fixes` counts values that were invalid and
    /// replaced.
    SettingsReloaded { settings: Arc<Settings>, fixes: usize },
    /// The file could not be read or parsed; the previous settings remain.
    ReloadFailed { error: String },
}

pub type Sender = actor::Sender<ConfigEvent>;
pub type Receiver = actor::Receiver<ConfigEvent>;

/// Polls the config file and swaps reloaded settings into a
/// [`SharedSettings`].
pub struct ConfigWatcher {
    file: PathBuf,
    settings: SharedSettings,
    events_tx: Sender,
    poll_interval: Duration,
}

impl ConfigWatcher {
    pub fn new(file: PathBuf, settings: SharedSettings, events_tx: Sender) -> Self {
        Self {
            file,
            settings,
            events_tx,
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Starts watching on a dedicated thread. The thread exits once the
    /// event receiver is dropped and the next change is observed.
    pub fn spawn(self) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new().name("config-watcher".to_string()).spawn(move || {
            if let Err(e) = self.run() {
                warn!("config-watcher: error: {e:?}");
            }
        })
    }

    fn run(self) -> notify::Result<()> {
        let (tx, rx) = crossbeam_channel::unbounded::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default()
                .with_poll_interval(self.poll_interval)
                .with_compare_contents(true),
        )?;

        watcher.watch(&self.file, RecursiveMode::NonRecursive)?;

        info!("watching {:?}", self.file);

        while let Ok(res) = rx.recv() {
            match res {
                Ok(event) if self.is_relevant(&event) => {
                    debug!("change detected: {:?}", event.kind);
                    self.reload();
                }
                Ok(event) => debug!("ignoring unrelated event: {:?}", event.kind),
                Err(e) => warn!("watch error: {e:?}"),
            }
            if self.events_tx.is_closed() {
                info!("receiver dropped, stopping");
                break;
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    /// Re-reads the config file and, if it parses, makes it the active
    /// settings. Invalid values are fixed up rather than rejected.
    pub fn reload(&self) {
        let mut config = match Config::read(&self.file) {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to reload {:?}: {e:#}", self.file);
                self.events_tx.send(ConfigEvent::ReloadFailed { error: format!("{e:#}") });
                return;
            }
        };

        for issue in config.validate() {
            warn!("config issue: {issue}");
        }
        let fixes = config.auto_fix_values();

        self.settings.replace(config.settings);
        info!(fixes, "settings reloaded");
        self.events_tx.send(ConfigEvent::SettingsReloaded {
            settings: self.settings.snapshot(),
            fixes,
        });
    }
}
