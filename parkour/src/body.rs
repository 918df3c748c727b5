//! Capabilities the engine consumes from the host: the character body and the
//! root-motion aligner.

use serde::{Deserialize, Serialize};

use crate::action::Side;
use crate::result::RuntimeWarpTarget;
use crate::trace::{BodyId, CapsuleSpec, Transform, Vec3};
use crate::utils::{planar_direction, planar_speed, yaw_of};

/// Movement mode reported by the body simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    None,
    #[default]
    Walking,
    Falling,
    /// Free movement driven by the aligner (no gravity).
    Flying,
}

impl MovementMode {
    #[inline]
    pub fn is_grounded(self) -> bool {
        self == MovementMode::Walking
    }

    #[inline]
    pub fn is_falling(self) -> bool {
        self == MovementMode::Falling
    }
}

/// The character body / movement component.
pub trait CharacterBody {
    /// Capsule-centre transform.
    fn transform(&self) -> Transform;
    fn velocity(&self) -> Vec3;
    fn capsule(&self) -> CapsuleSpec;
    fn movement_mode(&self) -> MovementMode;
    fn max_speed(&self) -> f32;

    /// The body's own collider, excluded from every probe.
    fn body_id(&self) -> Option<BodyId> {
        None
    }

    /// Yaw the player is steering toward (camera / controller).
    fn control_yaw(&self) -> f32 {
        yaw_of(&self.transform().rotation)
    }

    /// Dedicated probe transform used while climbing (e.g. a socket between the hands).
    fn climb_probe_anchor(&self) -> Option<Transform> {
        None
    }

    /// Skeletal foot anchor in world space.
    fn foot_anchor(&self, _side: Side) -> Option<Vec3> {
        None
    }

    /// Viewer position for the distance gate.
    fn viewpoint(&self) -> Option<Vec3> {
        None
    }

    fn teleport(&mut self, transform: &Transform);
    fn jump(&mut self, impulse: f32);
    fn stop_movement(&mut self);
    fn set_movement_mode(&mut self, mode: MovementMode);
}

/// Aligns animated root motion to named targets over time windows.
pub trait RootMotionAligner {
    fn set_targets(&mut self, targets: &[RuntimeWarpTarget]);
    fn clear_targets(&mut self);
}

/// Read-only copy of the body state taken at the start of a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySample {
    pub transform: Transform,
    pub velocity: Vec3,
    pub capsule: CapsuleSpec,
    pub mode: MovementMode,
    pub max_speed: f32,
    pub body_id: Option<BodyId>,
    pub control_yaw: f32,
    pub climb_anchor: Option<Transform>,
    pub foot_anchors: [Option<Vec3>; 2],
    pub viewpoint: Option<Vec3>,
}

impl BodySample {
    pub fn capture(body: &dyn CharacterBody) -> Self {
        Self {
            transform: body.transform(),
            velocity: body.velocity(),
            capsule: body.capsule(),
            mode: body.movement_mode(),
            max_speed: body.max_speed(),
            body_id: body.body_id(),
            control_yaw: body.control_yaw(),
            climb_anchor: body.climb_probe_anchor(),
            foot_anchors: [body.foot_anchor(Side::Left), body.foot_anchor(Side::Right)],
            viewpoint: body.viewpoint(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }

    /// World position of the feet (bottom of the capsule).
    #[inline]
    pub fn feet(&self) -> Vec3 {
        self.transform.translation - Vec3::y() * self.capsule.feet_offset()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        planar_speed(&self.velocity)
    }

    /// Planar facing direction.
    pub fn forward(&self) -> Vec3 {
        planar_direction(&self.transform.forward()).unwrap_or_else(|| Vec3::new(0.0, 0.0, -1.0))
    }

    /// Planar right direction.
    pub fn right(&self) -> Vec3 {
        let f = self.forward();
        Vec3::new(-f.z, 0.0, f.x)
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.mode.is_grounded()
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.mode.is_falling()
    }

    pub fn viewpoint_distance(&self) -> Option<f32> {
        self.viewpoint.map(|v| (v - self.position()).norm())
    }

    pub fn foot_anchor(&self, side: Side) -> Option<Vec3> {
        self.foot_anchors[side.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBody;

    #[test]
    fn sample_derives_feet_and_axes() {
        let body = RecordingBody::standing_at(Vec3::new(0.0, 0.0, 0.0));
        let s = BodySample::capture(&body);
        assert!((s.feet().y - 0.0).abs() < 1e-4);
        assert!((s.position().y - body.capsule().feet_offset()).abs() < 1e-4);
        assert!((s.forward() - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
        assert!((s.right() - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }
}
