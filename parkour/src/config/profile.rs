//! Per-probe shape dimensions and reach ranges, keyed by tag path.
//!
//! Detection families use the `Parkour.Detect.*` keys; sub-probes and confirmation
//! overlaps use the action tag path (`Parkour.Action.Mantle`, ...). A key missing
//! from the table falls back to the compiled-in profile for that key, then to
//! [`TraceProfile::default`].

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::action::ParkourAction;
use crate::constants::{AIR_DETECT_PROFILE, CLIMB_DETECT_PROFILE, GROUND_DETECT_PROFILE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceProfile {
    pub radius: f32,
    /// Half-length of the capsule's cylinder section (unused by sphere casts).
    pub half_height: f32,
    /// Shortest reach of the cast.
    pub forward_min: f32,
    /// Longest reach of the cast.
    pub forward_max: f32,
    /// Height of the cast centre above the probe base (feet, or climb anchor).
    pub vertical_offset: f32,
    /// Lowest centre height (relative to the probe base) any extra cast may use.
    pub vertical_min: f32,
    /// Highest centre height (relative to the probe base) any extra cast may use.
    pub vertical_max: f32,
}

impl Default for TraceProfile {
    fn default() -> Self {
        Self {
            radius: 10.0,
            half_height: 10.0,
            forward_min: 30.0,
            forward_max: 100.0,
            vertical_offset: 0.0,
            vertical_min: -100.0,
            vertical_max: 200.0,
        }
    }
}

impl TraceProfile {
    /// Reach for a given planar speed: `forward_min + speed * scale`, clamped to the range.
    pub fn forward_distance(&self, speed: f32, scale: f32) -> f32 {
        (self.forward_min + speed * scale).clamp(self.forward_min, self.forward_max.max(self.forward_min))
    }

    /// The compiled-in profile for a key, if there is one.
    pub fn builtin(key: &str) -> Option<TraceProfile> {
        let base = TraceProfile::default();
        let profile = match key {
            GROUND_DETECT_PROFILE => TraceProfile {
                radius: 20.0,
                half_height: 100.0,
                forward_min: 60.0,
                forward_max: 200.0,
                vertical_offset: 60.0,
                vertical_min: -60.0,
                vertical_max: 180.0,
            },
            AIR_DETECT_PROFILE => TraceProfile {
                radius: 15.0,
                half_height: 50.0,
                forward_min: 40.0,
                forward_max: 120.0,
                vertical_offset: 90.0,
                vertical_min: 0.0,
                vertical_max: 150.0,
            },
            CLIMB_DETECT_PROFILE => TraceProfile {
                radius: 10.0,
                half_height: 20.0,
                forward_min: 10.0,
                forward_max: 60.0,
                vertical_offset: 0.0,
                vertical_min: -40.0,
                vertical_max: 60.0,
            },
            _ => {
                let action = ParkourAction::ALL.into_iter().find(|a| a.tag_path() == key)?;
                match action {
                    ParkourAction::Mantle | ParkourAction::LowMantle | ParkourAction::DistanceMantle => {
                        TraceProfile {
                            radius: 8.0,
                            half_height: 10.0,
                            ..base
                        }
                    }
                    ParkourAction::Vault
                    | ParkourAction::ThinVault
                    | ParkourAction::HighVault
                    | ParkourAction::VaultToBraced => TraceProfile {
                        radius: 6.0,
                        half_height: 10.0,
                        ..base
                    },
                    ParkourAction::TicTac => TraceProfile {
                        radius: 15.0,
                        forward_max: 80.0,
                        ..base
                    },
                    ParkourAction::LedgeMove => TraceProfile {
                        radius: 8.0,
                        forward_max: 60.0,
                        ..base
                    },
                    ParkourAction::CornerMove => TraceProfile {
                        radius: 8.0,
                        forward_max: 70.0,
                        ..base
                    },
                    ParkourAction::BackHop => TraceProfile {
                        radius: 15.0,
                        half_height: 40.0,
                        forward_max: 250.0,
                        ..base
                    },
                    ParkourAction::PredictJump => TraceProfile {
                        radius: 15.0,
                        forward_max: 300.0,
                        ..base
                    },
                    ParkourAction::Drop | ParkourAction::AirHang => TraceProfile {
                        radius: 20.0,
                        ..base
                    },
                    ParkourAction::None => return None,
                }
            }
        };
        Some(profile)
    }

    /// Every key with a compiled-in profile.
    pub fn builtin_keys() -> Vec<String> {
        let mut keys = vec![
            GROUND_DETECT_PROFILE.to_owned(),
            AIR_DETECT_PROFILE.to_owned(),
            CLIMB_DETECT_PROFILE.to_owned(),
        ];
        keys.extend(
            ParkourAction::ALL
                .into_iter()
                .filter(|a| *a != ParkourAction::None)
                .map(ParkourAction::tag_path),
        );
        keys
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceProfileTable {
    entries: BTreeMap<String, TraceProfile>,
}

impl Default for TraceProfileTable {
    fn default() -> Self {
        let entries = TraceProfile::builtin_keys()
            .into_iter()
            .filter_map(|key| TraceProfile::builtin(&key).map(|p| (key, p)))
            .collect();
        Self { entries }
    }
}

impl TraceProfileTable {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, profile: TraceProfile) {
        self.entries.insert(key.into(), profile);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> TraceProfile {
        if let Some(profile) = self.entries.get(key) {
            return *profile;
        }
        debug!("trace profile '{key}' not configured, using compiled-in default");
        TraceProfile::builtin(key).unwrap_or_default()
    }

    #[inline]
    pub fn for_action(&self, action: ParkourAction) -> TraceProfile {
        self.get(&action.tag_path())
    }

    /// Compiled-in keys absent from this table.
    pub fn missing_builtin_keys(&self) -> Vec<String> {
        TraceProfile::builtin_keys()
            .into_iter()
            .filter(|k| !self.contains(k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TraceProfile)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
