//! Runtime settings and gameplay tuning
//!
//! Loaded from a JSON file named by `STAR_BLADE_SETTINGS`; every field is
//! optional and falls back to the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "STAR_BLADE_SETTINGS";

/// Lookahead used by the bullet-vs-enemy swept test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SweptRay {
    /// One unit along the bullet's direction, regardless of speed.
    /// Fast bullets can step over thin targets.
    #[default]
    Unit,
    /// The bullet's full per-frame displacement (`velocity * dt`)
    Displacement,
}

impl SweptRay {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweptRay::Unit => "unit",
            SweptRay::Displacement => "displacement",
        }
    }
}

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub starting_lives: i32,
    pub pickups_for_invulnerability: u32,
    pub invulnerability_secs: f64,
    pub death_delay_secs: f64,

    // === Player ===
    pub player_max_accel: f32,
    pub player_accel_step: f32,
    pub player_turn_step_deg: f32,

    // === Weapons ===
    pub bullet_speed: f32,
    pub bullet_lifetime_secs: f64,
    pub fire_cooldown_secs: f64,
    pub swept_ray: SweptRay,

    // === Enemies ===
    pub enemy_spawn_interval_secs: f64,
    pub enemy_despawn_delay_secs: f64,
    pub patrol_angular_speed: f32,
    pub pursuit_speed: f32,

    // === Effects ===
    pub explosion_lifetime_secs: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,
            pickups_for_invulnerability: PICKUPS_FOR_INVULNERABILITY,
            invulnerability_secs: INVULNERABILITY_SECS,
            death_delay_secs: DEATH_DELAY_SECS,

            player_max_accel: PLAYER_MAX_ACCEL,
            player_accel_step: PLAYER_ACCEL_STEP,
            player_turn_step_deg: PLAYER_TURN_STEP_DEG,

            bullet_speed: BULLET_SPEED,
            bullet_lifetime_secs: BULLET_LIFETIME_SECS,
            fire_cooldown_secs: FIRE_COOLDOWN_SECS,
            swept_ray: SweptRay::Unit,

            enemy_spawn_interval_secs: ENEMY_SPAWN_INTERVAL_SECS,
            enemy_despawn_delay_secs: ENEMY_DESPAWN_DELAY_SECS,
            patrol_angular_speed: PATROL_ANGULAR_SPEED,
            pursuit_speed: PURSUIT_SPEED,

            explosion_lifetime_secs: EXPLOSION_LIFETIME_SECS,
        }
    }
}

/// Runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed (wall clock when absent)
    pub seed: Option<u64>,
    /// Fixed frame step for the headless runner
    pub frame_dt: f32,
    /// Safety cap on headless frames
    pub max_frames: u64,
    /// Drive the ship with the demo autopilot
    pub autopilot: bool,
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            frame_dt: FRAME_DT,
            max_frames: 60 * 60 * 5,
            autopilot: true,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let json = std::fs::read_to_string(path).map_err(|source| GameError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json).map_err(|source| GameError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the file named by [`SETTINGS_ENV`], or use defaults
    pub fn from_env() -> Result<Self, GameError> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        fn positive(field: &'static str, value: f64) -> Result<(), GameError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(GameError::InvalidSetting {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        let t = &self.tuning;
        positive("frame_dt", self.frame_dt as f64)?;
        positive("tuning.invulnerability_secs", t.invulnerability_secs)?;
        positive("tuning.death_delay_secs", t.death_delay_secs)?;
        positive("tuning.bullet_speed", t.bullet_speed as f64)?;
        positive("tuning.bullet_lifetime_secs", t.bullet_lifetime_secs)?;
        positive("tuning.fire_cooldown_secs", t.fire_cooldown_secs)?;
        positive("tuning.enemy_spawn_interval_secs", t.enemy_spawn_interval_secs)?;
        positive("tuning.enemy_despawn_delay_secs", t.enemy_despawn_delay_secs)?;
        positive("tuning.explosion_lifetime_secs", t.explosion_lifetime_secs)?;
        positive("tuning.patrol_angular_speed", t.patrol_angular_speed as f64)?;
        positive("tuning.pursuit_speed", t.pursuit_speed as f64)?;
        positive("tuning.player_max_accel", t.player_max_accel as f64)?;
        positive("tuning.player_accel_step", t.player_accel_step as f64)?;
        positive("tuning.player_turn_step_deg", t.player_turn_step_deg as f64)?;
        positive("max_frames", self.max_frames as f64)?;

        if t.pickups_for_invulnerability == 0 {
            return Err(GameError::InvalidSetting {
                field: "tuning.pickups_for_invulnerability",
                reason: "must be at least 1".to_string(),
            });
        }
        if t.starting_lives < 0 {
            return Err(GameError::InvalidSetting {
                field: "tuning.starting_lives",
                reason: format!("must not be negative, got {}", t.starting_lives),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "seed": 7, "tuning": { "swept_ray": "displacement" } }"#)
                .unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.tuning.swept_ray, SweptRay::Displacement);
        assert_eq!(settings.tuning.starting_lives, STARTING_LIVES);
        assert_eq!(settings.frame_dt, FRAME_DT);
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        let mut settings = Settings::default();
        settings.tuning.enemy_spawn_interval_secs = 0.0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidSetting {
                field: "tuning.enemy_spawn_interval_secs",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_speeds() {
        let field_of = |settings: &Settings| match settings.validate() {
            Err(GameError::InvalidSetting { field, .. }) => field,
            other => panic!("expected an invalid setting, got {other:?}"),
        };

        let mut settings = Settings::default();
        settings.tuning.pursuit_speed = -5.0;
        assert_eq!(field_of(&settings), "tuning.pursuit_speed");

        let mut settings = Settings::default();
        settings.tuning.patrol_angular_speed = 0.0;
        assert_eq!(field_of(&settings), "tuning.patrol_angular_speed");

        let mut settings = Settings::default();
        settings.tuning.player_turn_step_deg = -1.0;
        assert_eq!(field_of(&settings), "tuning.player_turn_step_deg");

        let mut settings = Settings::default();
        settings.max_frames = 0;
        assert_eq!(field_of(&settings), "max_frames");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Settings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, GameError::SettingsRead { .. }));
    }
}
