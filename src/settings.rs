use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::pdf::{HighlightStyle, Zoom, ZoomBounds};
use crate::viewer::ViewerConfig;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const LOG_FILENAME: &str = "folio.log";
const APP_NAME: &str = "folio";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f32,

    #[serde(default = "default_zoom_in_step")]
    pub zoom_in_step: f32,

    #[serde(default = "default_zoom_out_step")]
    pub zoom_out_step: f32,

    #[serde(default = "default_wheel_zoom_in")]
    pub wheel_zoom_in: f32,

    #[serde(default = "default_wheel_zoom_out")]
    pub wheel_zoom_out: f32,

    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,

    /// Scrolling past the top or bottom edge turns the page
    #[serde(default = "default_true")]
    pub scroll_page_turn: bool,

    #[serde(default = "default_scroll_step_lines")]
    pub scroll_step_lines: u16,

    #[serde(default = "default_frame_cache_size")]
    pub frame_cache_size: usize,

    #[serde(default)]
    pub background_render: bool,

    #[serde(default = "default_highlight_color")]
    pub highlight_color: [u8; 3],

    #[serde(default = "default_highlight_opacity")]
    pub highlight_opacity: f32,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_initial_zoom() -> f32 {
    Zoom::DEFAULT_FACTOR
}

fn default_zoom_in_step() -> f32 {
    Zoom::ZOOM_IN_RATE
}

fn default_zoom_out_step() -> f32 {
    Zoom::ZOOM_OUT_RATE
}

fn default_wheel_zoom_in() -> f32 {
    Zoom::WHEEL_IN_RATE
}

fn default_wheel_zoom_out() -> f32 {
    Zoom::WHEEL_OUT_RATE
}

fn default_min_zoom() -> f32 {
    Zoom::MIN_SCALE
}

fn default_max_zoom() -> f32 {
    Zoom::MAX_SCALE
}

fn default_scroll_step_lines() -> u16 {
    3
}

fn default_frame_cache_size() -> usize {
    8
}

fn default_highlight_color() -> [u8; 3] {
    HighlightStyle::default().color
}

fn default_highlight_opacity() -> f32 {
    HighlightStyle::default().opacity
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            initial_zoom: default_initial_zoom(),
            zoom_in_step: default_zoom_in_step(),
            zoom_out_step: default_zoom_out_step(),
            wheel_zoom_in: default_wheel_zoom_in(),
            wheel_zoom_out: default_wheel_zoom_out(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            scroll_page_turn: true,
            scroll_step_lines: default_scroll_step_lines(),
            frame_cache_size: default_frame_cache_size(),
            background_render: false,
            highlight_color: default_highlight_color(),
            highlight_opacity: default_highlight_opacity(),
        }
    }
}

impl From<&Settings> for ViewerConfig {
    fn from(settings: &Settings) -> Self {
        let defaults = Self::default();
        let step = |value: f32, fallback: f32| {
            if Zoom::is_valid_step(value) {
                value
            } else {
                warn!("Ignoring invalid zoom step {value} in settings");
                fallback
            }
        };

        Self {
            initial_zoom: settings.initial_zoom,
            zoom_in_step: step(settings.zoom_in_step, defaults.zoom_in_step),
            zoom_out_step: step(settings.zoom_out_step, defaults.zoom_out_step),
            wheel_zoom_in: step(settings.wheel_zoom_in, defaults.wheel_zoom_in),
            wheel_zoom_out: step(settings.wheel_zoom_out, defaults.wheel_zoom_out),
            zoom_bounds: ZoomBounds::new(settings.min_zoom, settings.max_zoom),
            scroll_page_turn: settings.scroll_page_turn,
            scroll_step_lines: settings.scroll_step_lines.max(1),
            frame_cache_size: settings.frame_cache_size.max(1),
            background_render: settings.background_render,
            highlight_style: HighlightStyle {
                color: settings.highlight_color,
                opacity: settings.highlight_opacity.clamp(0.0, 1.0),
            },
        }
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Default log file location, next to the config file
pub fn default_log_path() -> PathBuf {
    dirs::config_dir()
        .map(|config| config.join(APP_NAME).join(LOG_FILENAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILENAME))
}

/// Load settings from `override_path`, or the per-user config file.
///
/// A missing per-user file is created with defaults.
pub fn load_settings(override_path: Option<&Path>) {
    if let Some(path) = override_path {
        load_settings_from_path(path);
        return;
    }

    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };

    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

fn load_settings_from_path(path: &Path) {
    match fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok((settings, migrated)) => {
                debug!("Loaded settings from {path:?}");
                if migrated {
                    save_settings_to_file(&settings, path);
                }
                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

/// Parse YAML settings, migrating old versions. The flag is true when a
/// migration ran and the file should be rewritten.
pub fn parse_settings(content: &str) -> Result<(Settings, bool), serde_yaml::Error> {
    let mut settings: Settings = serde_yaml::from_str(content)?;
    let migrated = settings.version < CURRENT_VERSION;
    if migrated {
        migrate_settings(&mut settings);
    }
    Ok((settings, migrated))
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here:
    // if settings.version < 2 {
    //     migrate_v1_to_v2(settings);
    // }

    settings.version = CURRENT_VERSION;
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    match serde_yaml::to_string(settings) {
        Ok(content) => match fs::write(path, format!("{SETTINGS_HEADER}{content}")) {
            Ok(()) => debug!("Saved settings to {path:?}"),
            Err(e) => error!("Failed to save settings to {path:?}: {e}"),
        },
        Err(e) => error!("Failed to serialize settings: {e}"),
    }
}

const SETTINGS_HEADER: &str = r"# folio settings
#
# Zoom steps multiply the current zoom factor. highlight_color is RGB,
# highlight_opacity is in [0, 1]. Enable background_render to rasterize
# pages on a worker thread.
";

// Public API for accessing settings

pub fn get_settings() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

pub fn viewer_config() -> ViewerConfig {
    ViewerConfig::from(&get_settings())
}
