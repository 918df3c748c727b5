use nalgebra::{Vector2, Vector3};

use crate::{
    constants::YAW_EPS,
    trace::{Quat, Vec3, settings::MIN_DIR_SQ},
};

/// Yaw (about +Y) that faces the planar direction `xz`, or `None` if it is too short.
///
/// Convention: a yaw of zero faces -Z, so `yaw = atan2(-x, -z)`.
pub fn yaw_from_xz(xz: Vector2<f32>) -> Option<f32> {
    if xz.norm_squared() > YAW_EPS {
        return Some((-xz[0]).atan2(-xz[1]));
    }

    None
}

/// Yaw-only rotation facing `yaw` radians.
#[inline]
pub fn rotation_from_yaw(yaw: f32) -> Quat {
    Quat::from_axis_angle(&Vector3::y_axis(), yaw)
}

/// Yaw-only rotation facing the planar part of `dir`, if it has one.
pub fn rotation_facing(dir: Vec3) -> Option<Quat> {
    yaw_from_xz(to_planar(&dir)).map(rotation_from_yaw)
}

/// Yaw of a rotation's facing direction.
pub fn yaw_of(rotation: &Quat) -> f32 {
    let fwd = rotation * Vec3::new(0.0, 0.0, -1.0);
    yaw_from_xz(to_planar(&fwd)).unwrap_or(0.0)
}

/// Signed smallest difference `a - b` between two yaws, in `[-PI, PI]`.
pub fn yaw_delta(a: f32, b: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut d = (a - b) % TAU;
    if d > PI {
        d -= TAU;
    } else if d < -PI {
        d += TAU;
    }
    d
}

/// XZ components of a world vector.
#[inline]
pub fn to_planar(v: &Vec3) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

/// Drop the vertical component and normalize; `None` if nothing is left.
pub fn planar_direction(v: &Vec3) -> Option<Vec3> {
    let flat = Vec3::new(v.x, 0.0, v.z);
    let len_sq = flat.norm_squared();
    if len_sq <= MIN_DIR_SQ {
        return None;
    }
    Some(flat / len_sq.sqrt())
}

/// Planar (XZ) distance between two world positions.
pub fn planar_distance(a: &Vec3, b: &Vec3) -> f32 {
    planar_distance_sq(to_planar(a), to_planar(b)).sqrt()
}

/// Planar (XZ) distance squared between two planar positions.
pub fn planar_distance_sq(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    let x = b.x - a.x;
    let z = b.y - a.y;
    x * x + z * z
}

/// Planar speed of a velocity.
#[inline]
pub fn planar_speed(velocity: &Vec3) -> f32 {
    to_planar(velocity).norm()
}

/// Horizontal tangent along a wall: `up × wall_normal`.
///
/// For a wall facing the character this points to the character's right.
pub fn wall_tangent(wall_normal: &Vec3) -> Vec3 {
    let n = planar_direction(wall_normal).unwrap_or_else(|| Vec3::new(0.0, 0.0, 1.0));
    Vec3::y().cross(&n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-4
    }

    #[test]
    fn yaw_zero_faces_negative_z() {
        let yaw = yaw_from_xz(Vector2::new(0.0, -1.0)).unwrap();
        assert!(approx(yaw, 0.0));
        let fwd = rotation_from_yaw(yaw) * Vec3::new(0.0, 0.0, -1.0);
        assert!((fwd - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-4);
    }

    #[test]
    fn rotation_facing_round_trips_direction() {
        let dir = Vec3::new(1.0, 0.3, 0.0);
        let rot = rotation_facing(dir).unwrap();
        let fwd = rot * Vec3::new(0.0, 0.0, -1.0);
        assert!((fwd - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-4);
    }

    #[test]
    fn tiny_direction_has_no_yaw() {
        assert!(yaw_from_xz(Vector2::new(0.0, 0.0)).is_none());
        assert!(planar_direction(&Vec3::new(0.0, 5.0, 0.0)).is_none());
    }

    #[test]
    fn yaw_delta_wraps() {
        assert!(approx(yaw_delta(PI - 0.1, -PI + 0.1), -0.2));
        assert!(approx(yaw_delta(FRAC_PI_2, 0.0), FRAC_PI_2));
    }

    #[test]
    fn tangent_points_right_of_a_facing_wall() {
        // Character faces -Z, so the wall it looks at faces +Z.
        let tangent = wall_tangent(&Vec3::new(0.0, 0.0, 1.0));
        assert!((tangent - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-4);
    }
}
