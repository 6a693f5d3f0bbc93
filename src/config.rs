//! Controller tuning loaded from `assets/config/controller.toml`.
//!
//! Every field has a default so a partial file only overrides what it names.
//! Values are taken as given; range checking is left to whoever writes the file.

use std::path::{Path, PathBuf};

use bevy::log::info;
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable that points [`ControllerConfig::load_default`] at another file.
pub const CONFIG_PATH_ENV: &str = "CONTROLLER_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // Locomotion
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub jump_height: f32,
    /// Signed vertical acceleration, negative is down.
    pub gravity: f32,
    pub turn_smooth_time: f32,
    /// Coyote time in seconds.
    pub coyote_time: f32,

    // Combat
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_windup: f32,
    pub combo_count: u32,
    pub combo_reset_window: f32,
    /// Bit mask of the physics layers that melee hits can reach.
    pub target_layers: u32,

    // Camera
    pub camera_distance: f32,
    /// Degrees of rotation per unit of pointer delta.
    pub mouse_sensitivity: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,

    // Inventory
    pub inventory_capacity: usize,
    pub starting_items: Vec<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_speed: 8.0,
            jump_height: 1.5,
            gravity: -20.0,
            turn_smooth_time: 0.1,
            coyote_time: 0.2,

            attack_range: 1.5,
            attack_cooldown: 0.5,
            attack_windup: 0.3,
            combo_count: 2,
            combo_reset_window: 1.0,
            target_layers: 1 << 2,

            camera_distance: 5.0,
            mouse_sensitivity: 2.0,
            pitch_min: -10.0,
            pitch_max: 60.0,

            inventory_capacity: 12,
            starting_items: Vec::new(),
        }
    }
}

impl ControllerConfig {
    /// Launch speed that carries the character to `jump_height` under `gravity`.
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * self.jump_height * self.gravity.abs()).sqrt()
    }

    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Reads the default config file, or the file named by [`CONFIG_PATH_ENV`].
    /// A missing default file yields [`ControllerConfig::default`]; a missing
    /// file named explicitly through the environment is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(explicit);
        }
        let path = default_path();
        if path.is_file() {
            info!(target: "controller", path = %path.display(), "loading controller config");
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

fn default_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/config/controller.toml")
}
