//! Height / depth / speed bands consulted by the classification table.
//!
//! Heights are `HeightDelta` (ledge top minus feet), depths are the forward sweep
//! distance to the wall, XY distances are planar character-to-contact distances.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    /// Deepest drop (below the feet) still classified as `Drop`.
    pub drop_max_height: f32,

    pub mantle_min_height: f32,
    pub mantle_max_height: f32,
    pub mantle_min_wall_depth: f32,
    pub mantle_max_wall_depth: f32,
    /// Mantles at or under this height become `LowMantle`.
    pub low_mantle_max_height: f32,
    /// Mantles from at least this far away become `DistanceMantle`.
    pub distance_mantle_min_xy: f32,

    pub vault_min_height: f32,
    pub vault_max_height: f32,
    pub vault_min_wall_depth: f32,
    pub vault_max_wall_depth: f32,
    /// `ThinVault` at or below this height.
    pub vault_thin_height_max: f32,
    /// `HighVault` at or above this height.
    pub vault_high_height_min: f32,
    /// Minimum planar speed for any vault.
    pub vault_min_speed: f32,

    /// Depth window used for both mantle and vault while climbing.
    pub climb_min_wall_depth: f32,
    pub climb_max_wall_depth: f32,

    /// Tighter ledge ceiling while falling; higher ledges count as unreachable.
    pub airborne_max_ledge_height: f32,

    /// Ledge heights the climb fallbacks will grab.
    pub climb_min_height: f32,
    pub climb_max_height: f32,
    /// At or under this planar distance a climb fallback is `Braced`, otherwise `FreeHang`.
    pub braced_climb_max_xy_distance: f32,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            drop_max_height: 300.0,
            mantle_min_height: 30.0,
            mantle_max_height: 200.0,
            mantle_min_wall_depth: 30.0,
            mantle_max_wall_depth: 120.0,
            low_mantle_max_height: 40.0,
            distance_mantle_min_xy: 122.0,
            vault_min_height: 30.0,
            vault_max_height: 130.0,
            vault_min_wall_depth: 10.0,
            vault_max_wall_depth: 100.0,
            vault_thin_height_max: 50.0,
            vault_high_height_min: 100.0,
            vault_min_speed: 250.0,
            climb_min_wall_depth: 0.0,
            climb_max_wall_depth: 80.0,
            airborne_max_ledge_height: 150.0,
            climb_min_height: 60.0,
            climb_max_height: 300.0,
            braced_climb_max_xy_distance: 60.0,
        }
    }
}

impl BandConfig {
    /// Depth range for mantles given the current climbing flag.
    pub fn mantle_depth(&self, climbing: bool) -> (f32, f32) {
        if climbing {
            (self.climb_min_wall_depth, self.climb_max_wall_depth)
        } else {
            (self.mantle_min_wall_depth, self.mantle_max_wall_depth)
        }
    }

    pub fn vault_depth(&self, climbing: bool) -> (f32, f32) {
        if climbing {
            (self.climb_min_wall_depth, self.climb_max_wall_depth)
        } else {
            (self.vault_min_wall_depth, self.vault_max_wall_depth)
        }
    }
}
