use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".reflow.toml")
}

/// Read-only view of the user settings the layout pipeline depends on.
///
/// Every method is a synchronous, side-effect free read.
pub trait SettingsProvider: Send + Sync {
    fn margins_enabled(&self) -> bool;
    fn margin_size(&self) -> f64;
    fn minimum_window_width(&self) -> f64;
    fn minimum_window_height(&self) -> f64;
    fn screen_padding_top(&self) -> f64;
    fn screen_padding_bottom(&self) -> f64;
    fn screen_padding_left(&self) -> f64;
    fn screen_padding_right(&self) -> f64;
    fn ignore_menu_bar(&self) -> bool;
    /// Fraction of the unconstrained dimension a single expand/shrink moves.
    fn resize_step(&self) -> f64;
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Whether windows are separated by a margin.
    #[serde(default)]
    pub window_margins: bool,
    /// Full width of the margin between two adjacent windows, in pixels.
    #[serde(default)]
    pub window_margin_size: f64,
    #[serde(default)]
    pub window_minimum_width: f64,
    #[serde(default)]
    pub window_minimum_height: f64,
    /// Extra space reserved on each screen edge.
    #[serde(default)]
    pub screen_padding: ScreenPadding,
    /// Tile over the menu bar and dock instead of around them.
    #[serde(default)]
    pub ignore_menu_bar: bool,
    /// Main pane ratio change per expand/shrink command, in `(0, 1]`.
    #[serde(default = "default_window_resize_step")]
    pub window_resize_step: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ScreenPadding {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_margins: false,
            window_margin_size: 0.0,
            window_minimum_width: 0.0,
            window_minimum_height: 0.0,
            screen_padding: ScreenPadding::default(),
            ignore_menu_bar: false,
            window_resize_step: default_window_resize_step(),
        }
    }
}

impl SettingsProvider for Settings {
    fn margins_enabled(&self) -> bool { self.window_margins }

    fn margin_size(&self) -> f64 { self.window_margin_size }

    fn minimum_window_width(&self) -> f64 { self.window_minimum_width }

    fn minimum_window_height(&self) -> f64 { self.window_minimum_height }

    fn screen_padding_top(&self) -> f64 { self.screen_padding.top }

    fn screen_padding_bottom(&self) -> f64 { self.screen_padding.bottom }

    fn screen_padding_left(&self) -> f64 { self.screen_padding.left }

    fn screen_padding_right(&self) -> f64 { self.screen_padding.right }

    fn ignore_menu_bar(&self) -> bool { self.ignore_menu_bar }

    fn resize_step(&self) -> f64 { self.window_resize_step }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let lengths = [
            ("window_margin_size", self.window_margin_size),
            ("window_minimum_width", self.window_minimum_width),
            ("window_minimum_height", self.window_minimum_height),
        ];
        for (name, value) in lengths {
            if value < 0.0 {
                issues.push(format!("{name} must be non-negative, got {value}"));
            }
        }

        issues.extend(self.screen_padding.validate());

        if !(self.window_resize_step > 0.0 && self.window_resize_step <= 1.0) {
            issues.push(format!(
                "window_resize_step must be in (0, 1], got {}",
                self.window_resize_step
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for value in [
            &mut self.window_margin_size,
            &mut self.window_minimum_width,
            &mut self.window_minimum_height,
        ] {
            if *value < 0.0 {
                *value = 0.0;
                fixes += 1;
            }
        }

        fixes += self.screen_padding.auto_fix_values();

        if !(self.window_resize_step > 0.0 && self.window_resize_step <= 1.0) {
            self.window_resize_step = default_window_resize_step();
            fixes += 1;
        }

        fixes
    }
}

impl ScreenPadding {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (edge, value) in self.edges() {
            if value < 0.0 {
                issues.push(format!(
                    "screen_padding.{edge} must be non-negative, got {value}"
                ));
            }
        }

        issues
    }

    /// Clamps negative padding to zero. Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for value in [&mut self.top, &mut self.bottom, &mut self.left, &mut self.right] {
            if *value < 0.0 {
                *value = 0.0;
                fixes += 1;
            }
        }

        fixes
    }

    fn edges(&self) -> [(&'static str, f64); 4] {
        [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ]
    }
}

fn default_window_resize_step() -> f64 { 0.05 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path` if it exists, falling back to the built-in defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Self::default_config()) }
    }

    pub fn default_config() -> Config {
        Self::parse(Self::default_toml()).unwrap_or_default()
    }

    pub fn default_toml() -> &'static str { include_str!("../../reflow.default.toml") }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_file = ConfigFile { settings: self.settings.clone() };

        let toml_string = toml::to_string_pretty(&config_file)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let c: ConfigFile = toml::from_str(buf)?;
        Ok(Config { settings: c.settings })
    }
}

/// Shared, swappable handle to the active settings.
///
/// Computations take a [`snapshot`](Self::snapshot) once and read from it for
/// their whole duration, so a reload never changes settings halfway through a
/// batch.
#[derive(Clone, Debug)]
pub struct SharedSettings(Arc<RwLock<Arc<Settings>>>);

impl SharedSettings {
    pub fn new(settings: Settings) -> Self { Self(Arc::new(RwLock::new(Arc::new(settings)))) }

    pub fn snapshot(&self) -> Arc<Settings> { self.0.read().clone() }

    pub fn replace(&self, settings: Settings) { *self.0.write() = Arc::new(settings); }
}

impl Default for SharedSettings {
    fn default() -> Self { Self::new(Settings::default()) }
}
