//! Application settings, read from a TOML file.
//!
//! Every field has a default, so an empty or partial file is valid:
//!
//! ```toml
//! resources = "resources.cfg"
//! confirm_config = false
//!
//! [window]
//! title = "Simple Flow App"
//! width = 1280
//! height = 720
//! background = { r = 0.0, g = 0.0, b = 0.0 }
//!
//! [scene]
//! ambient_light = { r = 0.5, g = 0.5, b = 0.5 }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::scene::{Colour, SceneDescriptor};

/// File read by the binary when `FLOW_SCENE_CONFIG` is not set.
pub const DEFAULT_SETTINGS_FILE: &str = "flow-scene.toml";
pub const SETTINGS_ENV: &str = "FLOW_SCENE_CONFIG";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Viewport clear colour.
    pub background: Colour,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Simple Flow App".to_string(),
            width: 1280,
            height: 720,
            background: Colour::BLACK,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the `resources.cfg`-style file listing resource locations.
    pub resources: PathBuf,
    /// Ask on the console before the window is opened.
    pub confirm_config: bool,
    pub window: WindowSettings,
    pub scene: SceneDescriptor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resources: PathBuf::from("resources.cfg"),
            confirm_config: false,
            window: WindowSettings::default(),
            scene: SceneDescriptor::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read settings file {:?}", path))?;
        Self::from_toml(&text).with_context(|| format!("invalid settings file {:?}", path))
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Settings path from the environment, falling back to [`DEFAULT_SETTINGS_FILE`].
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }
}
