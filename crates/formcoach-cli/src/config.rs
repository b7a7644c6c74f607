//! Configuration Vault – reads/writes `~/.formcoach/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use formcoach_runtime::{ConstantSource, DriverConfig, EntropySource, RandomSource};
use formcoach_types::CoachError;

/// Persisted user configuration stored in `~/.formcoach/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Landmarks with a visibility score below this are ignored.  `0`
    /// disables the gate.
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f64,

    /// Pace of `formcoach replay` in frames per second.  `0` replays as fast
    /// as possible.
    #[serde(default = "default_replay_fps")]
    pub replay_fps: u32,

    /// Whether clean reps occasionally earn an encouraging cue.
    #[serde(default = "default_encouragement")]
    pub encouragement: bool,
}

fn default_min_visibility() -> f64 {
    0.5
}
fn default_replay_fps() -> u32 {
    30
}
fn default_encouragement() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_visibility: default_min_visibility(),
            replay_fps: default_replay_fps(),
            encouragement: default_encouragement(),
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns [`CoachError::Config`] when `min_visibility` is outside
    /// `[0, 1]`.
    pub fn validate(&self) -> Result<(), CoachError> {
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(CoachError::Config(format!(
                "min_visibility must be within [0, 1], got {}",
                self.min_visibility
            )));
        }
        Ok(())
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            min_visibility: (self.min_visibility > 0.0).then_some(self.min_visibility),
        }
    }

    /// Draw source for the session; a constant `1.0` never encourages.
    pub fn random_source(&self) -> Box<dyn RandomSource> {
        if self.encouragement {
            Box::new(EntropySource)
        } else {
            Box::new(ConstantSource(1.0))
        }
    }
}

/// Return the path to `~/.formcoach/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".formcoach").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from disk, falling back to defaults when the file is
/// absent.  Env overrides apply either way.
pub fn load_or_default() -> Result<Config, String> {
    let mut cfg = load()?.unwrap_or_default();
    apply_env_overrides(&mut cfg);
    cfg.validate().map_err(|e| e.to_string())?;
    Ok(cfg)
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `FORMCOACH_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `FORMCOACH_MIN_VISIBILITY` | `min_visibility` |
/// | `FORMCOACH_REPLAY_FPS` | `replay_fps` |
/// | `FORMCOACH_ENCOURAGEMENT` | `encouragement` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("FORMCOACH_MIN_VISIBILITY")
        && let Ok(threshold) = v.parse::<f64>()
    {
        cfg.min_visibility = threshold;
    }
    if let Ok(v) = std::env::var("FORMCOACH_REPLAY_FPS")
        && let Ok(fps) = v.parse::<u32>()
    {
        cfg.replay_fps = fps;
    }
    if let Ok(v) = std::env::var("FORMCOACH_ENCOURAGEMENT")
        && let Ok(on) = v.parse::<bool>()
    {
        cfg.encouragement = on;
    }
}

/// Save the config to disk, creating `~/.formcoach/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
