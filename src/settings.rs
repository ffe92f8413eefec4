use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::alerts::AlertStore;
use crate::canvas::Color;
use crate::constants::{
    DEFAULT_ACCENT_COLOR, DEFAULT_INSTRUMENT, DEFAULT_OPACITY, DEFAULT_REFRESH_SECS,
    DEFAULT_TIMEZONE, MAX_OPACITY, MIN_OPACITY, MIN_REFRESH_SECS,
};
use crate::logging;
use crate::model::Timeframe;

/// Persisted widget settings, camelCase on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub instrument: String,
    pub api_key: String,
    pub timezone: String,
    pub refresh_interval: u64,
    pub accent_color: String,
    pub opacity: f64,
    pub mini_mode: bool,
    pub timeframe: Timeframe,
    pub alerts: AlertStore,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instrument: DEFAULT_INSTRUMENT.to_string(),
            api_key: String::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            refresh_interval: DEFAULT_REFRESH_SECS,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            opacity: DEFAULT_OPACITY,
            mini_mode: false,
            timeframe: Timeframe::default(),
            alerts: AlertStore::default(),
        }
    }
}

impl Settings {
    /// Clamp out-of-range values and replace an unparseable accent color.
    pub fn normalized(mut self) -> Self {
        self.refresh_interval = self.refresh_interval.max(MIN_REFRESH_SECS);
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(MIN_OPACITY, MAX_OPACITY)
        } else {
            DEFAULT_OPACITY
        };
        if Color::from_hex(&self.accent_color).is_err() {
            self.accent_color = DEFAULT_ACCENT_COLOR.to_string();
        }
        if self.instrument.trim().is_empty() {
            self.instrument = DEFAULT_INSTRUMENT.to_string();
        }
        self
    }

    pub fn accent(&self) -> Color {
        Color::from_hex(&self.accent_color)
            .or_else(|_| Color::from_hex(DEFAULT_ACCENT_COLOR))
            .unwrap_or(Color::rgb(0x4f, 0x9c, 0xf9))
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Persistence collaborator. Saves are fire-and-forget; there is no read-back.
pub trait SettingsSink {
    fn save(&mut self, settings: &Settings);
}

/// Settings stored as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings, falling back to defaults when the file does not exist yet.
    pub fn load(&self) -> Result<Settings> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read settings at {:?}", self.path))
            }
        };
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings at {:?}", self.path))?;
        Ok(settings.normalized())
    }

    pub fn write(&self, settings: &Settings) -> Result<()> {
        let payload = serde_json::to_string_pretty(settings).context("serialize settings")?;
        fs::write(&self.path, payload)
            .with_context(|| format!("failed to write settings at {:?}", self.path))
    }
}

impl SettingsSink for JsonFileStore {
    fn save(&mut self, settings: &Settings) {
        if let Err(err) = self.write(settings) {
            logging::error(
                "settings.save_failed",
                "Failed to persist settings",
                json!({ "path": self.path.display().to_string(), "error": format!("{err:#}") }),
            );
        }
    }
}
