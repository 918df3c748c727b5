//! Configuration for the surface-confirmation and traversal sub-probes.
//!
//! Shape radii and reach distances come from the per-action trace profiles; these are
//! the placement offsets and acceptance thresholds around them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Mantle warp point distance past the wall contact onto the ledge top.
    pub mantle_confirm_inset: f32,
    /// Vault warp point distance past the wall contact (further, over the obstacle).
    pub vault_confirm_inset: f32,

    /// Fine radius for the second drop-hang cast (the coarse one comes from the profile).
    pub drop_hang_fine_radius: f32,
    /// Drop-hang casts land this far past the wall contact.
    pub drop_hang_inset: f32,
    /// Drop-hang casts start this far above the ledge estimate.
    pub drop_hang_above: f32,
    /// ... and reach this far below it.
    pub drop_hang_below: f32,

    /// Minimum planar speed for a tic-tac.
    pub tic_tac_min_speed: f32,
    /// Maximum planar distance to the wall for a tic-tac.
    pub tic_tac_max_xy_distance: f32,
    /// Height gained by the tic-tac warp above the side contact.
    pub tic_tac_height_gain: f32,

    /// Lateral shimmy distance along the held ledge.
    pub ledge_move_distance: f32,
    /// Forward ledge casts start this far out from the wall.
    pub ledge_probe_back: f32,
    /// Forward ledge casts run this far below the ledge top.
    pub ledge_probe_drop: f32,
    /// Downward top casts start this far above the expected ledge.
    pub ledge_top_above: f32,
    /// ... and reach this far below it.
    pub ledge_top_below: f32,
    /// Downward top casts land this far past the forward contact.
    pub ledge_top_inset: f32,
    /// Largest ledge height change a shimmy accepts.
    pub ledge_move_max_step: f32,

    /// A corner wall must turn away from the current one: `dot(old, new) <= this`.
    pub corner_max_normal_dot: f32,
    /// Outside-corner casts start this far out from the current wall.
    pub corner_probe_outset: f32,

    /// Input must point away from the wall at least this much (`dot(input, normal)`).
    pub back_hop_min_input_dot: f32,
    /// Control yaw must be turned at least this far (degrees) from the facing yaw.
    pub back_hop_min_yaw_degrees: f32,
    /// Back-hop casts start this far out from the current wall.
    pub back_hop_start_outset: f32,
    /// The landing wall must face back toward us: `dot(old, new) <= -this`.
    pub back_hop_min_facing_dot: f32,
    /// Clearance capsule sits this far out from the landing wall ...
    pub back_hop_clearance_offset: f32,
    /// ... and this far below the landing ledge top.
    pub back_hop_clearance_drop: f32,

    /// Lateral offsets of the hop grid (climb-up intent).
    pub hop_lateral_offsets: Vec<f32>,
    /// Vertical offsets of the hop grid above the held ledge.
    pub hop_vertical_offsets: Vec<f32>,
    /// Lateral offsets of the predictive bands (mirrored by side).
    pub predict_lateral_offsets: Vec<f32>,

    /// Probe height above the feet when the ledge height is unknown.
    pub predict_default_height: f32,
    /// Forward predictive casts run this far below the ledge estimate.
    pub predict_probe_drop: f32,
    /// Highest landing above the feet a predictive jump accepts.
    pub predict_jump_max_height: f32,
    /// Deepest landing below the feet a predictive jump accepts.
    pub predict_jump_max_drop: f32,

    /// Jump when every classification fails near a wall.
    pub auto_climb_enabled: bool,
    pub auto_climb_jump_impulse: f32,

    /// Minimum input magnitude to count as climb intent.
    pub climb_intent_min_input: f32,
    /// Both components above this make a diagonal (up-left / up-right) intent.
    pub climb_intent_diagonal: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            mantle_confirm_inset: 20.0,
            vault_confirm_inset: 40.0,
            drop_hang_fine_radius: 8.0,
            drop_hang_inset: 10.0,
            drop_hang_above: 30.0,
            drop_hang_below: 60.0,
            tic_tac_min_speed: 200.0,
            tic_tac_max_xy_distance: 90.0,
            tic_tac_height_gain: 60.0,
            ledge_move_distance: 50.0,
            ledge_probe_back: 30.0,
            ledge_probe_drop: 10.0,
            ledge_top_above: 30.0,
            ledge_top_below: 60.0,
            ledge_top_inset: 10.0,
            ledge_move_max_step: 40.0,
            corner_max_normal_dot: 0.5,
            corner_probe_outset: 50.0,
            back_hop_min_input_dot: 0.5,
            back_hop_min_yaw_degrees: 120.0,
            back_hop_start_outset: 30.0,
            back_hop_min_facing_dot: 0.5,
            back_hop_clearance_offset: 40.0,
            back_hop_clearance_drop: 90.0,
            hop_lateral_offsets: vec![0.0, -60.0, 60.0],
            hop_vertical_offsets: vec![60.0, 120.0],
            predict_lateral_offsets: vec![150.0],
            predict_default_height: 60.0,
            predict_probe_drop: 10.0,
            predict_jump_max_height: 150.0,
            predict_jump_max_drop: 200.0,
            auto_climb_enabled: true,
            auto_climb_jump_impulse: 420.0,
            climb_intent_min_input: 0.3,
            climb_intent_diagonal: 0.35,
        }
    }
}
