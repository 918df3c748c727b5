//! Configuration for detection gating, the primary forward probe and its refinement grid.

use serde::{Deserialize, Serialize};

/// Configuration for detection gating, the primary forward probe and its refinement grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum planar speed (units/second) for a non-climbing detection pass.
    pub min_speed_for_detection: f32,

    /// Maximum distance from the viewpoint to the character for detection to run.
    /// `<= 0` disables the gate.
    pub max_viewpoint_distance: f32,

    /// Randomized cooldown range (seconds) between detection passes while climbing.
    /// Also armed on entering `Climb`.
    pub climb_detection_cooldown: [f32; 2],

    /// Run a detection pass every tick instead of only on request.
    pub auto_detect_every_tick: bool,

    /// Shape casts allowed per simulation step. `<= 0` disables the cap.
    pub max_traces_per_step: i32,

    /// Extra forward distance per unit of planar speed for the grounded probe.
    pub forward_speed_scale: f32,

    /// Lateral half-count of the refinement grid while not busy.
    pub grid_lateral_half_count_idle: u32,

    /// Lateral half-count of the refinement grid while busy (e.g. climbing).
    pub grid_lateral_half_count_busy: u32,

    /// Rows of the refinement grid above the primary cast.
    pub grid_vertical_count: u32,

    /// Lateral spacing between grid columns.
    pub grid_lateral_spacing: f32,

    /// Vertical spacing between grid rows.
    pub grid_vertical_spacing: f32,

    /// Radius of the downward sphere that snaps onto the obstacle top.
    pub ledge_probe_radius: f32,

    /// How far past the wall contact (into the obstacle) the top probe lands.
    pub ledge_probe_inset: f32,

    /// Height above the feet the top probe starts from.
    pub ledge_probe_top_height: f32,

    /// How far below the feet the top probe reaches (finds lower ledges for drops).
    pub ledge_probe_depth_below_feet: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_speed_for_detection: 5.0,
            max_viewpoint_distance: 5000.0,
            climb_detection_cooldown: [0.08, 0.2],
            auto_detect_every_tick: false,
            max_traces_per_step: 48,
            forward_speed_scale: 0.25,
            grid_lateral_half_count_idle: 2,
            grid_lateral_half_count_busy: 1,
            grid_vertical_count: 3,
            grid_lateral_spacing: 20.0,
            grid_vertical_spacing: 25.0,
            ledge_probe_radius: 10.0,
            ledge_probe_inset: 15.0,
            ledge_probe_top_height: 250.0,
            ledge_probe_depth_below_feet: 320.0,
        }
    }
}
