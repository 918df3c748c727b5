//! Rapier-backed [`WorldQuery`] over immutable level geometry.
//!
//! Statics are built once from [`WorldStaticDef`]s and never move. Every collider carries
//! its definition id in `user_data`, which is what traces report as [`BodyId`].
//!
//! Sweeps go through parry's narrow phase per candidate collider (AABB-culled against the
//! swept bounds), keeping the earliest time of impact. The world-space contact is then
//! resolved with a contact query at the impact pose.

pub use rapier3d;

use rapier3d::parry::bounding_volume::{Aabb, BoundingVolume};
use rapier3d::parry::query::{self, ShapeCastOptions};
use rapier3d::parry::shape::{Ball, Capsule, Shape};
use rapier3d::prelude::*;

use crate::trace::{BodyId, Quat, TraceHit, TraceShape, Vec3, WorldQuery};

/// Contact resolution slack at the impact pose (cm).
const CONTACT_PREDICTION: f32 = 0.5;

/// One immutable level collider.
///
/// Units are centimetres. For planes the normal is `rotation * +Y`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable id; insertion is sorted by it and traces report it as the hit body.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    /// Axis-aligned box from its min/max corners.
    pub fn aabb(id: u32, min: Vec3, max: Vec3) -> Self {
        Self {
            id,
            translation: (min + max) * 0.5,
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Cuboid {
                half_extents: (max - min) * 0.5,
            },
        }
    }

    /// Horizontal ground plane at height `y`.
    pub fn ground(id: u32, y: f32) -> Self {
        Self {
            id,
            translation: Vec3::new(0.0, y, 0.0),
            rotation: Quat::identity(),
            shape: ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        }
    }
}

/// Static shapes a level can be made of.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite half-space, offset along its pose-derived normal.
    Plane { offset_along_normal: f32 },
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    CapsuleY { radius: f32, half_height: f32 },
    CylinderY { radius: f32, half_height: f32 },
    /// Cuboid with rounded edges, e.g. a railing or a worn wall top.
    RoundCuboid { half_extents: Vec3, border_radius: f32 },
}

pub struct RapierQueryWorld {
    colliders: ColliderSet,
}

impl RapierQueryWorld {
    /// Build the query world. Input order does not matter; colliders are inserted by id.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut colliders = ColliderSet::new();
        for def in &defs {
            colliders.insert(collider_from_def(def));
        }
        log::debug!("rapier query world built with {} statics", colliders.len());

        Self { colliders }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn candidates<'a>(
        &'a self,
        bounds: Aabb,
        ignore: Option<BodyId>,
    ) -> impl Iterator<Item = &'a Collider> + 'a {
        self.colliders
            .iter()
            .map(|(_, c)| c)
            .filter(move |c| ignore != Some(body_id(c)))
            .filter(move |c| c.compute_aabb().intersects(&bounds))
    }
}

impl WorldQuery for RapierQueryWorld {
    fn sweep(
        &self,
        shape: TraceShape,
        start: Vec3,
        end: Vec3,
        ignore: Option<BodyId>,
    ) -> Option<TraceHit> {
        let query_shape = to_shape(shape);
        let start_pos = Isometry::translation(start.x, start.y, start.z);
        let delta = end - start;
        let vel = Vector::new(delta.x, delta.y, delta.z);
        let end_pos = Isometry::translation(end.x, end.y, end.z);

        let swept = query_shape
            .compute_aabb(&start_pos)
            .merged(&query_shape.compute_aabb(&end_pos));

        let options = ShapeCastOptions {
            stop_at_penetration: false,
            ..ShapeCastOptions::with_max_time_of_impact(1.0)
        };

        let mut best: Option<(&Collider, f32, Vec3)> = None;
        for collider in self.candidates(swept, ignore) {
            let hit = match query::cast_shapes(
                &start_pos,
                &vel,
                query_shape.as_ref(),
                collider.position(),
                &Vector::zeros(),
                collider.shape(),
                options,
            ) {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(err) => {
                    log::warn!(
                        "unsupported shape cast against static {}: {err:?}",
                        body_id(collider).0
                    );
                    continue;
                }
            };
            if best.is_some_and(|(_, toi, _)| toi <= hit.time_of_impact) {
                continue;
            }
            // Identity rotation: the local normal on the swept shape is already world-space.
            let fallback = -Vec3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z);
            best = Some((collider, hit.time_of_impact, fallback));
        }

        let (collider, toi, fallback_normal) = best?;
        let center = start + delta * toi;
        let impact_pos = Isometry::translation(center.x, center.y, center.z);

        let (point, normal) = match query::contact(
            &impact_pos,
            query_shape.as_ref(),
            collider.position(),
            collider.shape(),
            CONTACT_PREDICTION,
        ) {
            Ok(Some(contact)) => (
                Vec3::new(contact.point2.x, contact.point2.y, contact.point2.z),
                Vec3::new(contact.normal2.x, contact.normal2.y, contact.normal2.z),
            ),
            _ => (
                center - fallback_normal * shape.radius(),
                fallback_normal,
            ),
        };

        Some(TraceHit {
            point,
            normal,
            distance: delta.norm() * toi,
            body: Some(body_id(collider)),
        })
    }

    fn overlap(&self, shape: TraceShape, center: Vec3, ignore: Option<BodyId>) -> bool {
        let query_shape = to_shape(shape);
        let pos = Isometry::translation(center.x, center.y, center.z);
        let bounds = query_shape.compute_aabb(&pos);

        self.candidates(bounds, ignore).any(|collider| {
            query::intersection_test(
                &pos,
                query_shape.as_ref(),
                collider.position(),
                collider.shape(),
            )
            .unwrap_or(false)
        })
    }
}

fn body_id(collider: &Collider) -> BodyId {
    BodyId(collider.user_data as u64)
}

fn to_shape(shape: TraceShape) -> Box<dyn Shape> {
    match shape {
        TraceShape::Sphere { radius } => Box::new(Ball::new(radius)),
        TraceShape::Capsule {
            radius,
            half_height,
        } => Box::new(Capsule::new_y(half_height, radius)),
    }
}

fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let t = Vector::new(def.translation.x, def.translation.y, def.translation.z);

    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // n . x = n . t + offset
            let n = def.rotation * Vector::y();
            let dist = n.dot(&t) + *offset_along_normal;
            let unit_n = UnitVector::new_normalize(n);
            return ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                .translation(unit_n.into_inner() * dist)
                .user_data(u128::from(def.id))
                .build();
        }
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
        ColliderShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => ColliderBuilder::round_cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
            *border_radius,
        ),
    };

    builder
        .translation(t)
        .rotation(def.rotation.scaled_axis())
        .user_data(u128::from(def.id))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_world() -> RapierQueryWorld {
        RapierQueryWorld::build(vec![
            WorldStaticDef::aabb(
                2,
                Vec3::new(-200.0, 0.0, -150.0),
                Vec3::new(200.0, 100.0, -100.0),
            ),
            WorldStaticDef::ground(1, 0.0),
        ])
    }

    #[test]
    fn build_sorts_and_tags_by_id() {
        let world = wall_world();
        assert_eq!(world.len(), 2);
        let mut ids: Vec<u64> = world.colliders.iter().map(|(_, c)| body_id(c).0).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn sphere_sweep_reports_wall_face() {
        let world = wall_world();
        let hit = world
            .sweep(
                TraceShape::Sphere { radius: 10.0 },
                Vec3::new(0.0, 50.0, 0.0),
                Vec3::new(0.0, 50.0, -200.0),
                None,
            )
            .expect("wall should block the sweep");

        assert_eq!(hit.body, Some(BodyId(2)));
        assert!((hit.distance - 90.0).abs() < 0.5, "distance {}", hit.distance);
        assert!(hit.normal.z > 0.99, "normal {:?}", hit.normal);
        assert!((hit.point.z + 100.0).abs() < 0.5, "point {:?}", hit.point);
    }

    #[test]
    fn downward_sweep_lands_on_top_face() {
        let world = wall_world();
        let hit = world
            .sweep(
                TraceShape::Sphere { radius: 5.0 },
                Vec3::new(0.0, 200.0, -125.0),
                Vec3::new(0.0, 50.0, -125.0),
                None,
            )
            .expect("top face");
        assert!(hit.normal.y > 0.99);
        assert!((hit.point.y - 100.0).abs() < 0.5);
    }

    #[test]
    fn ignored_body_is_transparent() {
        let world = wall_world();
        let hit = world.sweep(
            TraceShape::Sphere { radius: 10.0 },
            Vec3::new(0.0, 50.0, 0.0),
            Vec3::new(0.0, 50.0, -200.0),
            Some(BodyId(2)),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn capsule_overlap_respects_ignore() {
        let world = wall_world();
        let shape = TraceShape::Capsule {
            radius: 20.0,
            half_height: 40.0,
        };
        let inside = Vec3::new(0.0, 50.0, -125.0);
        assert!(world.overlap(shape, inside, None));
        assert!(world.overlap(shape, inside, Some(BodyId(2))), "ground still overlaps");
        assert!(!world.overlap(shape, Vec3::new(0.0, 100.0, 100.0), None));
    }
}
