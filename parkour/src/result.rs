//! The single output of a detection pass.

use crate::action::{ClimbStyle, ParkourAction, ResultType, Side, TraversalDirection};
use crate::tags::GameplayTag;
use crate::trace::{TraceHit, Transform, Vec3};

/// One limb's contact state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LimbContact {
    /// A traced surface backs this limb.
    pub has_surface: bool,
    pub contact: Option<TraceHit>,
    /// Placement target for the IK consumer (traced or synthesized).
    pub base_transform: Option<Transform>,
}

impl LimbContact {
    pub fn traced(hit: TraceHit, base: Transform) -> Self {
        Self {
            has_surface: true,
            contact: Some(hit),
            base_transform: Some(base),
        }
    }

    pub fn synthesized(base: Transform) -> Self {
        Self {
            has_surface: false,
            contact: None,
            base_transform: Some(base),
        }
    }
}

/// Tags mirroring the result's action, the owner's logical state, climb style and direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResultTags {
    pub action: Option<GameplayTag>,
    pub state: Option<GameplayTag>,
    pub climb_style: Option<GameplayTag>,
    pub direction: Option<GameplayTag>,
}

impl ResultTags {
    pub fn iter(&self) -> impl Iterator<Item = GameplayTag> + '_ {
        [self.action, self.state, self.climb_style, self.direction]
            .into_iter()
            .flatten()
    }
}

/// A warp target as handed to the root-motion aligner.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeWarpTarget {
    pub name: String,
    pub transform: Transform,
    pub start_time: f32,
    pub end_time: f32,
    pub warp_translation: bool,
    pub warp_rotation: bool,
    pub adjust_height: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WarpWindowSummary {
    pub name: String,
    pub start_time: f32,
    pub end_time: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParkourResult {
    /// Legacy validity flag. Kept in lockstep with `is_valid`.
    pub has_result: bool,
    pub is_valid: bool,
    pub action: ParkourAction,
    pub result_type: ResultType,
    pub climb_style: ClimbStyle,
    pub direction: TraversalDirection,

    /// Representative location / normal for consumers.
    pub world_location: Vec3,
    pub world_normal: Vec3,
    /// Raw contact from the decisive probe.
    pub target_location: Vec3,
    pub surface_normal: Vec3,
    /// Target height minus feet height (positive above the feet).
    pub height_delta: f32,
    pub xy_distance: f32,
    pub wall_depth: f32,
    pub primary_contact: Option<TraceHit>,

    pub left_hand: LimbContact,
    pub right_hand: LimbContact,
    pub left_foot: LimbContact,
    pub right_foot: LimbContact,
    pub climb_ledge: Option<TraceHit>,
    /// Vertical offset applied to each hand after repeated probe misses.
    pub hand_fallback_z: [f32; 2],
    pub enable_left_climb_ik: bool,
    pub enable_right_climb_ik: bool,
    pub enable_left_foot_ik: bool,
    pub enable_right_foot_ik: bool,

    pub tags: ResultTags,
    pub warp_targets: Vec<RuntimeWarpTarget>,
    pub earliest_window: Option<WarpWindowSummary>,
}

impl ParkourResult {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Both validity flags set and an action chosen.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_valid && self.has_result && self.action != ParkourAction::None
    }

    pub fn mark_valid(&mut self, action: ParkourAction) {
        debug_assert!(action != ParkourAction::None);
        self.action = action;
        self.result_type = action.result_type();
        self.is_valid = action != ParkourAction::None;
        self.has_result = self.is_valid;
    }

    pub fn hand(&self, side: Side) -> &LimbContact {
        match side {
            Side::Left => &self.left_hand,
            Side::Right => &self.right_hand,
        }
    }

    pub fn hand_mut(&mut self, side: Side) -> &mut LimbContact {
        match side {
            Side::Left => &mut self.left_hand,
            Side::Right => &mut self.right_hand,
        }
    }

    pub fn foot(&self, side: Side) -> &LimbContact {
        match side {
            Side::Left => &self.left_foot,
            Side::Right => &self.right_foot,
        }
    }

    pub fn foot_mut(&mut self, side: Side) -> &mut LimbContact {
        match side {
            Side::Left => &mut self.left_foot,
            Side::Right => &mut self.right_foot,
        }
    }

    #[inline]
    pub fn has_hand_surface(&self, side: Side) -> bool {
        self.hand(side).has_surface
    }

    pub fn climb_ik_enabled(&self, side: Side) -> bool {
        match side {
            Side::Left => self.enable_left_climb_ik,
            Side::Right => self.enable_right_climb_ik,
        }
    }

    pub fn set_climb_ik_enabled(&mut self, side: Side, enabled: bool) {
        match side {
            Side::Left => self.enable_left_climb_ik = enabled,
            Side::Right => self.enable_right_climb_ik = enabled,
        }
    }

    pub fn foot_ik_enabled(&self, side: Side) -> bool {
        match side {
            Side::Left => self.enable_left_foot_ik,
            Side::Right => self.enable_right_foot_ik,
        }
    }

    pub fn set_foot_ik_enabled(&mut self, side: Side, enabled: bool) {
        match side {
            Side::Left => self.enable_left_foot_ik = enabled,
            Side::Right => self.enable_right_foot_ik = enabled,
        }
    }

    /// Clear every per-limb field (IK is re-derived as a unit).
    pub fn clear_limbs(&mut self) {
        self.left_hand = LimbContact::default();
        self.right_hand = LimbContact::default();
        self.left_foot = LimbContact::default();
        self.right_foot = LimbContact::default();
        self.hand_fallback_z = [0.0; 2];
        self.enable_left_climb_ik = false;
        self.enable_right_climb_ik = false;
        self.enable_left_foot_ik = false;
        self.enable_right_foot_ik = false;
    }

    /// Replace the warp targets and recompute the earliest-window summary.
    pub fn set_warp_targets(&mut self, targets: Vec<RuntimeWarpTarget>) {
        self.earliest_window = targets
            .iter()
            .min_by(|a, b| a.start_time.total_cmp(&b.start_time))
            .map(|t| WarpWindowSummary {
                name: t.name.clone(),
                start_time: t.start_time,
                end_time: t.end_time,
            });
        self.warp_targets = targets;
    }
}
