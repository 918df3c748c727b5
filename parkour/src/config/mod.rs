/*!
Process-wide tunables.

`ParkourConfig` is loaded once (usually from a JSON document), validated, then shared
read-only by every component that references it. Every field has a compiled-in
default, so a partial document only overrides what it names.

- detection: gates, primary probe scaling, refinement grid, ledge-top snap, budget
- bands:     height / depth / speed bands of the classification table
- probes:    sub-probe offsets and acceptance thresholds
- ik:        hand / foot IK probing
- profile:   per-probe shape dimensions keyed by tag path
- actions:   warp windows and linger per action
*/

pub mod actions;
pub mod bands;
pub mod detection;
pub mod ik;
pub mod probes;
pub mod profile;

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

pub use actions::{ActionDefinition, ActionDefinitionTable, FacingMode, WarpWindow};
pub use bands::BandConfig;
pub use detection::DetectionConfig;
pub use ik::IkConfig;
pub use probes::ProbeConfig;
pub use profile::{TraceProfile, TraceProfileTable};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Execution timing shared by every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Time spent in `Exiting` after the linger elapses (a new detection may chain in).
    pub exit_blend_seconds: f32,
    /// Reposition the body directly when no aligner is available.
    pub teleport_fallback: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            exit_blend_seconds: 0.15,
            teleport_fallback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkourConfig {
    pub detection: DetectionConfig,
    pub bands: BandConfig,
    pub probes: ProbeConfig,
    pub ik: IkConfig,
    pub execution: ExecutionConfig,
    pub profiles: TraceProfileTable,
    pub actions: ActionDefinitionTable,
    /// Seed for the randomized climb cooldowns.
    pub rng_seed: u64,
}

impl Default for ParkourConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            bands: BandConfig::default(),
            probes: ProbeConfig::default(),
            ik: IkConfig::default(),
            execution: ExecutionConfig::default(),
            profiles: TraceProfileTable::default(),
            actions: ActionDefinitionTable::default(),
            rng_seed: 0x5eed_9a4b,
        }
    }
}

fn ordered(field: &'static str, lo: f32, hi: f32) -> Result<(), ConfigError> {
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected min <= max, got [{lo}, {hi}]"),
        })
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a non-negative value, got {v}"),
        })
    }
}

impl ParkourConfig {
    /// Parse and validate a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ParkourConfig = serde_json::from_str(json)?;
        config.validate()?;
        config.warn_missing_entries();
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load `path`, falling back to the compiled-in defaults (with a warning) on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("parkour config unavailable ({err}); using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detection;
        ordered(
            "detection.climb_detection_cooldown",
            d.climb_detection_cooldown[0],
            d.climb_detection_cooldown[1],
        )?;
        non_negative("detection.climb_detection_cooldown", d.climb_detection_cooldown[0])?;
        non_negative("detection.min_speed_for_detection", d.min_speed_for_detection)?;
        non_negative("detection.forward_speed_scale", d.forward_speed_scale)?;
        non_negative("detection.ledge_probe_radius", d.ledge_probe_radius)?;

        let b = &self.bands;
        non_negative("bands.drop_max_height", b.drop_max_height)?;
        ordered("bands.mantle_height", b.mantle_min_height, b.mantle_max_height)?;
        ordered("bands.mantle_wall_depth", b.mantle_min_wall_depth, b.mantle_max_wall_depth)?;
        ordered("bands.vault_height", b.vault_min_height, b.vault_max_height)?;
        ordered("bands.vault_wall_depth", b.vault_min_wall_depth, b.vault_max_wall_depth)?;
        if !(b.vault_thin_height_max < b.vault_high_height_min) {
            return Err(ConfigError::Invalid {
                field: "bands.vault_sub_heights",
                reason: format!(
                    "thin ceiling {} must sit below the high floor {}",
                    b.vault_thin_height_max, b.vault_high_height_min
                ),
            });
        }
        ordered("bands.vault_sub_heights", b.vault_min_height, b.vault_thin_height_max)?;
        ordered("bands.vault_sub_heights", b.vault_high_height_min, b.vault_max_height)?;
        ordered("bands.climb_wall_depth", b.climb_min_wall_depth, b.climb_max_wall_depth)?;
        ordered("bands.climb_height", b.climb_min_height, b.climb_max_height)?;

        let p = &self.probes;
        non_negative("probes.auto_climb_jump_impulse", p.auto_climb_jump_impulse)?;
        if !(0.0..=1.0).contains(&p.corner_max_normal_dot) {
            return Err(ConfigError::Invalid {
                field: "probes.corner_max_normal_dot",
                reason: format!("expected a cosine in [0, 1], got {}", p.corner_max_normal_dot),
            });
        }

        let ik = &self.ik;
        non_negative("ik.hand_radius", ik.hand_radius)?;
        non_negative("ik.foot_radius", ik.foot_radius)?;
        non_negative("ik.hand_cooldown", ik.hand_cooldown)?;
        if ik.hand_lateral_offsets.is_empty() {
            return Err(ConfigError::Invalid {
                field: "ik.hand_lateral_offsets",
                reason: "at least one offset is required".to_owned(),
            });
        }

        for (key, profile) in self.profiles.iter() {
            if !(profile.radius > 0.0) {
                return Err(ConfigError::Invalid {
                    field: "profiles",
                    reason: format!("profile '{key}' has non-positive radius {}", profile.radius),
                });
            }
            ordered("profiles.forward", profile.forward_min, profile.forward_max)?;
            ordered("profiles.vertical", profile.vertical_min, profile.vertical_max)?;
        }

        for (action, def) in self.actions.iter() {
            non_negative("actions.linger_seconds", def.linger_seconds)?;
            for window in &def.warp_windows {
                if !(window.start_time <= window.end_time) {
                    return Err(ConfigError::Invalid {
                        field: "actions.warp_windows",
                        reason: format!(
                            "{} window '{}' ends before it starts",
                            action.name(),
                            window.name
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn warn_missing_entries(&self) {
        for key in self.profiles.missing_builtin_keys() {
            warn!("trace profile '{key}' missing from config; compiled-in default will be used");
        }
        for action in self.actions.missing_actions() {
            warn!(
                "action definition for {} missing from config; compiled-in default will be used",
                action.name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ParkourConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = ParkourConfig::from_json_str(
            r#"{ "bands": { "mantle_max_height": 180.0 }, "detection": { "max_traces_per_step": 12 } }"#,
        )
        .unwrap();
        assert_eq!(config.bands.mantle_max_height, 180.0);
        assert_eq!(config.bands.mantle_min_height, 30.0);
        assert_eq!(config.detection.max_traces_per_step, 12);
        assert_eq!(config.probes, ProbeConfig::default());
    }

    #[test]
    fn inverted_band_is_rejected() {
        let err = ParkourConfig::from_json_str(
            r#"{ "bands": { "vault_min_height": 150.0, "vault_max_height": 100.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "bands.vault_height", .. }));
    }

    #[test]
    fn vault_sub_bands_must_not_touch() {
        let mut config = ParkourConfig::default();
        config.bands.vault_thin_height_max = 80.0;
        config.bands.vault_high_height_min = 80.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "bands.vault_sub_heights", .. })
        ));

        config.bands.vault_high_height_min = 140.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "bands.vault_sub_heights", .. })
        ));

        config.bands.vault_high_height_min = 100.0;
        config.bands.vault_thin_height_max = 20.0;
        assert!(config.validate().is_err());

        config.bands.vault_thin_height_max = 50.0;
        config.validate().unwrap();
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ParkourConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ParkourConfig::load_or_default("/definitely/not/here/parkour.json");
        assert_eq!(config, ParkourConfig::default());
    }

    #[test]
    fn round_trips_through_json() {
        let config = ParkourConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(ParkourConfig::from_json_str(&json).unwrap(), config);
    }
}
