//! Climb intent: the player's input read relative to the held wall.

use crate::action::{Side, TraversalDirection};
use crate::trace::Vec3;
use crate::utils::wall_tangent;

/// Desired traversal while hanging on a wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClimbIntent {
    #[default]
    None,
    /// Into the wall (climb up), optionally drifting to one side.
    Up { lateral: Option<Side> },
    /// Along the wall.
    Lateral(Side),
    /// Away from the wall.
    Back,
}

impl ClimbIntent {
    /// Classify planar `input` against a wall whose outward normal is `wall_normal`.
    ///
    /// Inputs shorter than `min_input` are no intent; inputs longer than 1 are normalized.
    /// When both the into-wall and the lateral component reach `diagonal`, the intent is
    /// a diagonal climb.
    pub fn classify(input: &Vec3, wall_normal: &Vec3, min_input: f32, diagonal: f32) -> Self {
        let planar = Vec3::new(input.x, 0.0, input.z);
        let len = planar.norm();
        if len < min_input.max(1.0e-4) {
            return ClimbIntent::None;
        }
        let planar = if len > 1.0 { planar / len } else { planar };
        let n = Vec3::new(wall_normal.x, 0.0, wall_normal.z);
        let into = -planar.dot(&n);
        let along = planar.dot(&wall_tangent(&n));
        let side = if along < 0.0 { Side::Left } else { Side::Right };

        if into >= diagonal && along.abs() >= diagonal {
            return ClimbIntent::Up {
                lateral: Some(side),
            };
        }
        if into.abs() >= along.abs() {
            if into > 0.0 {
                ClimbIntent::Up { lateral: None }
            } else {
                ClimbIntent::Back
            }
        } else {
            ClimbIntent::Lateral(side)
        }
    }

    pub fn lateral_side(self) -> Option<Side> {
        match self {
            ClimbIntent::Up { lateral } => lateral,
            ClimbIntent::Lateral(side) => Some(side),
            ClimbIntent::None | ClimbIntent::Back => None,
        }
    }

    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, ClimbIntent::Up { .. })
    }

    pub fn direction(self) -> TraversalDirection {
        match self {
            ClimbIntent::None => TraversalDirection::None,
            ClimbIntent::Up { lateral: None } => TraversalDirection::Up,
            ClimbIntent::Up {
                lateral: Some(Side::Left),
            } => TraversalDirection::UpLeft,
            ClimbIntent::Up {
                lateral: Some(Side::Right),
            } => TraversalDirection::UpRight,
            ClimbIntent::Lateral(side) => TraversalDirection::lateral(side.sign()),
            ClimbIntent::Back => TraversalDirection::Backward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wall ahead of a character facing -Z: outward normal +Z, right is +X.
    fn n() -> Vec3 {
        Vec3::z()
    }

    #[test]
    fn classifies_relative_to_the_wall() {
        let c = |x: f32, z: f32| ClimbIntent::classify(&Vec3::new(x, 0.0, z), &n(), 0.3, 0.35);
        assert_eq!(c(0.0, 0.0), ClimbIntent::None);
        assert_eq!(c(0.0, -1.0), ClimbIntent::Up { lateral: None });
        assert_eq!(c(0.0, 1.0), ClimbIntent::Back);
        assert_eq!(c(1.0, 0.0), ClimbIntent::Lateral(Side::Right));
        assert_eq!(c(-1.0, 0.1), ClimbIntent::Lateral(Side::Left));
        assert_eq!(
            c(-0.7, -0.7),
            ClimbIntent::Up {
                lateral: Some(Side::Left)
            }
        );
    }

    #[test]
    fn direction_tags() {
        assert_eq!(ClimbIntent::Back.direction(), TraversalDirection::Backward);
        assert_eq!(
            ClimbIntent::Up {
                lateral: Some(Side::Right)
            }
            .direction(),
            TraversalDirection::UpRight
        );
        assert_eq!(ClimbIntent::Lateral(Side::Left).direction(), TraversalDirection::Left);
    }
}
