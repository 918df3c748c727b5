//! Timed corner-move interpolation.
//!
//! Corner moves rotate the character around an edge, which a root-motion warp handles
//! badly, so the body is driven directly: each tick yields the transform to apply.

use crate::trace::{Transform, Vec3};
use crate::trace::settings::DIST_EPS;

/// One tick of the tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenStep {
    /// Transform to apply this tick.
    pub transform: Transform,
    /// The target was reached; the tween can be dropped.
    pub finished: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerMoveTween {
    start: Transform,
    target: Transform,
    elapsed: f32,
    duration: f32,
}

impl CornerMoveTween {
    pub fn new(start: Transform, target: Transform, duration: f32) -> Self {
        Self {
            start,
            target,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    #[inline]
    pub fn target(&self) -> &Transform {
        &self.target
    }

    /// Progress in `[0, 1]`.
    pub fn alpha(&self) -> f32 {
        if self.duration <= DIST_EPS {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Advance by `dt` seconds (negative `dt` is treated as zero).
    pub fn advance(&mut self, dt: f32) -> TweenStep {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let alpha = self.alpha();
        if alpha >= 1.0 {
            return TweenStep {
                transform: self.target,
                finished: true,
            };
        }
        // Smoothstep: ease in and out of the corner.
        let s = alpha * alpha * (3.0 - 2.0 * alpha);
        let translation: Vec3 = self.start.translation.lerp(&self.target.translation, s);
        let rotation = self
            .start
            .rotation
            .try_slerp(&self.target.rotation, s, 1.0e-6)
            .unwrap_or(self.target.rotation);
        TweenStep {
            transform: Transform::new(translation, rotation),
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rotation_from_yaw;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn reaches_the_target_exactly_once_duration_elapses() {
        let start = Transform::new(Vec3::zeros(), rotation_from_yaw(0.0));
        let target = Transform::new(Vec3::new(100.0, 0.0, -50.0), rotation_from_yaw(FRAC_PI_2));
        let mut tween = CornerMoveTween::new(start, target, 0.4);

        let mid = tween.advance(0.2);
        assert!(!mid.finished);
        assert!((mid.transform.translation - Vec3::new(50.0, 0.0, -25.0)).norm() < 1e-3);

        let end = tween.advance(0.3);
        assert!(end.finished);
        assert_eq!(end.transform, target);
        assert_eq!(tween.alpha(), 1.0);
    }

    #[test]
    fn zero_duration_snaps() {
        let target = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let mut tween = CornerMoveTween::new(Transform::identity(), target, 0.0);
        assert!(tween.advance(0.0).finished);
    }
}
