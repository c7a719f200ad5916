use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;

use crate::behavior::ScreenBounds;
use crate::error::{PetError, PetResult};
use crate::mood::constants::DECAY_CHECK_INTERVAL_MS;
use crate::mood::interactions::{Interaction, InteractionTable};

pub const CONFIG_PATH: &str = "petpal.toml";

/// Shortest mood tick accepted from config.
const MIN_TICK_INTERVAL_MS: i64 = 1_000;

#[derive(Debug, Clone, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    window: RawWindowSection,
    #[serde(default)]
    mood: RawMoodSection,
    #[serde(default)]
    store: RawStoreSection,
    #[serde(default)]
    input: RawInputSection,
    #[serde(default)]
    interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawWindowSection {
    pet_size: f32,
    screen_width: f32,
    screen_height: f32,
    start_x: f32,
    start_y: f32,
}

impl Default for RawWindowSection {
    fn default() -> Self {
        Self {
            pet_size: 100.0,
            screen_width: 1920.0,
            screen_height: 1080.0,
            start_x: 100.0,
            start_y: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawMoodSection {
    tick_interval_secs: f32,
}

impl Default for RawMoodSection {
    fn default() -> Self {
        Self {
            tick_interval_secs: (DECAY_CHECK_INTERVAL_MS / 1000) as f32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawStoreSection {
    path: PathBuf,
    background: bool,
}

impl Default for RawStoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("petpal-mood.json"),
            background: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawInputSection {
    mic_enabled: bool,
}

impl Default for RawInputSection {
    fn default() -> Self {
        Self { mic_enabled: true }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pet_size: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub start_position: Vec2,
    pub tick_interval_ms: i64,
    pub store_path: PathBuf,
    /// Write the mood file from a background thread.
    pub background_save: bool,
    pub mic_enabled: bool,
    pub interactions: InteractionTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default()).unwrap_or_else(|_| Self::fallback())
    }
}

impl AppConfig {
    /// Read `path`, falling back to defaults if it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => match Self::from_toml_str(&data) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(data: &str) -> PetResult<Self> {
        let raw: RawConfig = toml::from_str(data)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> PetResult<Self> {
        let window = raw.window;
        if !(window.pet_size.is_finite() && window.pet_size > 0.0) {
            return Err(PetError::InvalidConfig(format!(
                "window.pet_size must be positive, got {}",
                window.pet_size
            )));
        }

        let tick_ms = (raw.mood.tick_interval_secs.max(0.0) * 1000.0) as i64;
        let mut interactions = InteractionTable::default();
        interactions.merge(raw.interactions)?;

        Ok(Self {
            pet_size: window.pet_size,
            screen_width: window.screen_width.max(window.pet_size),
            screen_height: window.screen_height.max(window.pet_size),
            start_position: Vec2::new(window.start_x, window.start_y),
            tick_interval_ms: tick_ms.max(MIN_TICK_INTERVAL_MS),
            store_path: raw.store.path,
            background_save: raw.store.background,
            mic_enabled: raw.input.mic_enabled,
            interactions,
        })
    }

    fn fallback() -> Self {
        Self {
            pet_size: 100.0,
            screen_width: 1920.0,
            screen_height: 1080.0,
            start_position: Vec2::new(100.0, 100.0),
            tick_interval_ms: DECAY_CHECK_INTERVAL_MS,
            store_path: PathBuf::from("petpal-mood.json"),
            background_save: true,
            mic_enabled: true,
            interactions: InteractionTable::default(),
        }
    }

    /// Area the pet window's origin may occupy.
    pub fn screen_bounds(&self) -> ScreenBounds {
        ScreenBounds::for_screen(self.screen_width, self.screen_height, self.pet_size)
    }
}
