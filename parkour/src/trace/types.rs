/*!
Core trace types and math aliases shared by the probe modules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the gated cast wrapper (`tracer`) and the world-query backends
- the detection engine and the sub-probe library
- IK derivation and the warp-target builder

Conventions
- +Y is up. A character faces `rotation * -Z`.
- The character position is the capsule centre; the feet sit
  `half_height + radius` below it.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for use with rapier/parry queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    /// Facing direction (`rotation * -Z`).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::new(0.0, 0.0, -1.0)
    }

    /// Right-hand direction (`rotation * +X`).
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::new(1.0, 0.0, 0.0)
    }
}

/// Identity of whatever a query hit, as reported by the backend.
///
/// The rapier backend packs a collider handle's `(index, generation)` pair into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

/// Capsule dimensions of the character body.
///
/// `half_height` is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is `2*half_height + 2*radius`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Distance from the capsule centre down to the feet.
    #[inline]
    pub fn feet_offset(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// Volume swept or overlapped by a single query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceShape {
    Sphere { radius: f32 },
    /// Y-aligned capsule.
    Capsule { radius: f32, half_height: f32 },
}

impl TraceShape {
    #[inline]
    pub fn radius(&self) -> f32 {
        match *self {
            TraceShape::Sphere { radius } | TraceShape::Capsule { radius, .. } => radius,
        }
    }

    /// Distance from the shape centre to its top (or bottom) along +Y.
    #[inline]
    pub fn vertical_extent(&self) -> f32 {
        match *self {
            TraceShape::Sphere { radius } => radius,
            TraceShape::Capsule {
                radius,
                half_height,
            } => half_height + radius,
        }
    }
}

/// Ephemeral description of one capsule cast.
///
/// Produced by the probe builders, consumed by the tracer, discarded after use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleTraceSettings {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleTraceSettings {
    #[inline]
    pub fn shape(&self) -> TraceShape {
        TraceShape::Capsule {
            radius: self.radius,
            half_height: self.half_height,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.end - self.start).norm()
    }

    /// The same cast moved rigidly by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            ..*self
        }
    }
}

/// Nearest blocking contact reported by a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceHit {
    /// World-space contact point on the blocking surface.
    pub point: Vec3,
    /// World-space surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,
    /// Distance travelled by the shape centre before impact.
    pub distance: f32,
    /// What was hit, if the backend reports it.
    pub body: Option<BodyId>,
}

impl TraceHit {
    /// The contact normal flattened onto the XZ plane (zero if the normal is vertical).
    #[inline]
    pub fn planar_normal(&self) -> Vec3 {
        let n = Vec3::new(self.normal.x, 0.0, self.normal.z);
        let len_sq = n.norm_squared();
        if len_sq > 1.0e-12 {
            n / len_sq.sqrt()
        } else {
            Vec3::zeros()
        }
    }
}
