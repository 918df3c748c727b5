//! Configuration for hand and foot IK target derivation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkConfig {
    /// Lateral hand offsets along the wall, tried in order (largest first).
    pub hand_lateral_offsets: Vec<f32>,
    pub hand_radius: f32,
    /// Hand casts start this far above the anchor contact ...
    pub hand_lift: f32,
    /// ... and this far out from the wall.
    pub hand_outset: f32,
    /// Hand casts end this far below the anchor ...
    pub hand_reach: f32,
    /// ... and this far into the wall.
    pub hand_inset: f32,
    /// Minimum `dot(hit normal, wall normal)` for a hand contact.
    pub hand_normal_min_dot: f32,
    /// Refinement cast half-length around the accepted contact.
    pub hand_refine_height: f32,
    /// Refinement cast offset into the wall from the accepted contact.
    pub hand_refine_inset: f32,
    /// Consecutive missed passes before a hand backs off.
    pub hand_max_consecutive_miss_frames: u32,
    /// Back-off duration (seconds) after the miss ceiling.
    pub hand_cooldown: f32,
    /// Vertical offset applied to a hand target while it has no traced surface.
    pub hand_fallback_z_offset: f32,
    /// Synthesized hand spacing from the anchor along the wall.
    pub hand_synth_spacing: f32,
    /// Synthesized hand offset toward the wall.
    pub hand_synth_forward: f32,
    /// Synthesized hand offset upward.
    pub hand_synth_up: f32,

    /// Lateral foot widths, tried in order.
    pub foot_widths: Vec<f32>,
    /// Wider width set used during a corner move.
    pub foot_corner_widths: Vec<f32>,
    pub foot_radius: f32,
    /// Foot casts start this far toward the wall from the anchor.
    pub foot_forward: f32,
    pub foot_lift: f32,
    pub foot_reach: f32,
    /// Consecutive misses before a foot skips one pass.
    pub foot_max_consecutive_misses: u32,
    /// Fallback foot anchor half-spacing when the body reports none.
    pub foot_hip_width: f32,
    /// Fallback foot anchor depth below the held ledge.
    pub foot_hang_depth: f32,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            hand_lateral_offsets: vec![30.0, 25.0, 20.0, 15.0],
            hand_radius: 4.0,
            hand_lift: 15.0,
            hand_outset: 15.0,
            hand_reach: 30.0,
            hand_inset: 10.0,
            hand_normal_min_dot: 0.7,
            hand_refine_height: 10.0,
            hand_refine_inset: 4.0,
            hand_max_consecutive_miss_frames: 3,
            hand_cooldown: 0.5,
            hand_fallback_z_offset: -8.0,
            hand_synth_spacing: 25.0,
            hand_synth_forward: 2.0,
            hand_synth_up: 0.0,
            foot_widths: vec![10.0, 20.0],
            foot_corner_widths: vec![15.0, 30.0, 45.0],
            foot_radius: 6.0,
            foot_forward: 20.0,
            foot_lift: 20.0,
            foot_reach: 60.0,
            foot_max_consecutive_misses: 3,
            foot_hip_width: 15.0,
            foot_hang_depth: 150.0,
        }
    }
}
