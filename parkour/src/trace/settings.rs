/*!
Trace tolerances.

These constants centralize the numeric guards used by the probe code. They are
not gameplay tuning (that lives in `ParkourConfig`); they exist so every probe
agrees on what "vertical", "wall-like" and "negligible" mean.

Notes
- Distances are in world units.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Practical small distance for comparisons (world units).
pub const DIST_EPS: f32 = 1.0e-4;

/// Minimum squared length for a direction to be normalized.
pub const MIN_DIR_SQ: f32 = 1.0e-8;

/// A surface whose normal has `|y|` at or below this counts as a wall.
pub const WALL_NORMAL_MAX_Y: f32 = 0.7;

/// A surface whose normal has `y` at or above this counts as walkable ground / ledge top.
pub const WALKABLE_NORMAL_MIN_Y: f32 = 0.7;

/// Is this normal wall-like (mostly horizontal)?
#[inline]
pub fn is_wall_normal(normal_y: f32) -> bool {
    normal_y.abs() <= WALL_NORMAL_MAX_Y
}

/// Is this normal walkable (mostly up)?
#[inline]
pub fn is_walkable_normal(normal_y: f32) -> bool {
    normal_y >= WALKABLE_NORMAL_MIN_Y
}
