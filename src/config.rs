use anyhow::{anyhow, Context};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    time::Duration,
};

const MIN_PROBE_INTERVAL_SECS: f32 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ui: UiConfig,
    pub probe: ProbeConfig,
    /// File the values were read from, `None` when running on defaults.
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            probe: ProbeConfig::default(),
            source: None,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::candidates() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let doc: ConfigDocument = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        let mut config: Config = doc.into();
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = env::current_dir() {
            candidates.push(current_dir.join("config.toml"));
            candidates.push(current_dir.join("config").join("tuner.toml"));
        }

        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join("config.toml"));
                candidates.push(dir.join("config").join("tuner.toml"));
            }
        }

        if let Some(dir) = config_dir() {
            candidates.push(dir.join("config.toml"));
        }

        candidates
    }
}

/// `<platform config dir>/tuner`, home of `config.toml` and `icon.png`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tuner"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub dark_mode: bool,
    pub window_width: f32,
    pub window_height: f32,
    pub title_max_chars: usize,
    pub artist_max_chars: usize,
    pub hot_reload: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            window_width: 600.0,
            window_height: 200.0,
            title_max_chars: 30,
            artist_max_chars: 35,
            hot_reload: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub command: String,
    pub player: String,
    pub interval_secs: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command: "playerctl".to_string(),
            player: "spotify".to_string(),
            interval_secs: 2.0,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f32(self.interval_secs.max(MIN_PROBE_INTERVAL_SECS))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    ui: UiSection,
    #[serde(default)]
    probe: ProbeSection,
}

impl From<ConfigDocument> for Config {
    fn from(value: ConfigDocument) -> Self {
        let ui_defaults = UiConfig::default();
        let probe_defaults = ProbeConfig::default();

        let ui = UiConfig {
            dark_mode: value.ui.dark_mode.unwrap_or(ui_defaults.dark_mode),
            window_width: value
                .ui
                .window_width
                .unwrap_or(ui_defaults.window_width)
                .max(200.0),
            window_height: value
                .ui
                .window_height
                .unwrap_or(ui_defaults.window_height)
                .max(120.0),
            // Room for at least one character plus the ellipsis.
            title_max_chars: value
                .ui
                .title_max_chars
                .unwrap_or(ui_defaults.title_max_chars)
                .max(4),
            artist_max_chars: value
                .ui
                .artist_max_chars
                .unwrap_or(ui_defaults.artist_max_chars)
                .max(4),
            hot_reload: value.ui.hot_reload.unwrap_or(ui_defaults.hot_reload),
        };

        let probe = ProbeConfig {
            command: value
                .probe
                .command
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(probe_defaults.command),
            player: value
                .probe
                .player
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(probe_defaults.player),
            interval_secs: value
                .probe
                .interval_secs
                .filter(|secs| secs.is_finite())
                .unwrap_or(probe_defaults.interval_secs)
                .max(MIN_PROBE_INTERVAL_SECS),
        };

        Config {
            ui,
            probe,
            source: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UiSection {
    dark_mode: Option<bool>,
    window_width: Option<f32>,
    window_height: Option<f32>,
    title_max_chars: Option<usize>,
    artist_max_chars: Option<usize>,
    hot_reload: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeSection {
    command: Option<String>,
    player: Option<String>,
    interval_secs: Option<f32>,
}

/// Watches the directory holding the loaded config file and re-reads the file
/// when it changes.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
    changes_rx: Receiver<notify::Result<notify::Event>>,
}

impl ConfigWatcher {
    pub fn watch(path: &Path) -> anyhow::Result<Self> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("Config path {} has no parent", path.display()))?;

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        // Editors often replace the file instead of writing it in place, so
        // the parent directory is watched rather than the file itself.
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            path: path.to_path_buf(),
            _watcher: watcher,
            changes_rx: rx,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drains pending events and returns a freshly parsed config when the
    /// watched file was touched.
    pub fn poll(&self) -> Option<anyhow::Result<Config>> {
        let mut relevant = false;
        while let Ok(event) = self.changes_rx.try_recv() {
            match event {
                Ok(evt) => {
                    if evt
                        .paths
                        .iter()
                        .any(|p| p.file_name() == self.path.file_name())
                    {
                        relevant = true;
                    }
                }
                Err(err) => tracing::warn!("Config watcher error: {err}"),
            }
        }

        if relevant && self.path.exists() {
            Some(Config::load_from(&self.path))
        } else {
            None
        }
    }
}
