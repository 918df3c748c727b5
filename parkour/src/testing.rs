//! Test doubles: an analytic box world and recording collaborators.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::action::{ParkourAction, Side};
use crate::body::{CharacterBody, MovementMode, RootMotionAligner};
use crate::hooks::ParkourListener;
use crate::result::{ParkourResult, RuntimeWarpTarget};
use crate::state::{AbortReason, StateChange};
use crate::trace::{BodyId, CapsuleSpec, TraceHit, TraceShape, Transform, Vec3, WorldQuery};

#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
    pub id: BodyId,
}

/// Axis-aligned boxes queried analytically.
///
/// Sweeps are ray casts against each box inflated by the shape's extents (capsules
/// are treated as their bounding box). Boxes already containing the cast origin are
/// ignored, like a penetration-tolerant physics query.
#[derive(Default)]
pub struct BoxWorld {
    boxes: Vec<Aabb>,
    queries: Cell<u32>,
    overlap_override: Option<bool>,
}

fn shape_extents(shape: TraceShape) -> Vec3 {
    let r = shape.radius();
    Vec3::new(r, shape.vertical_extent(), r)
}

/// Slab test for the segment `start + t * delta`, `t` in `[0, 1]`.
/// Returns the entry parameter and entry face normal; `None` if the segment starts inside.
fn segment_box(start: Vec3, delta: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::zeros();
    for axis in 0..3 {
        let s = start[axis];
        let v = delta[axis];
        if v.abs() < 1.0e-9 {
            if s < min[axis] || s > max[axis] {
                return None;
            }
            continue;
        }
        let t0 = (min[axis] - s) / v;
        let t1 = (max[axis] - s) / v;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        if near > t_enter {
            t_enter = near;
            normal = Vec3::zeros();
            normal[axis] = if v > 0.0 { -1.0 } else { 1.0 };
        }
        t_exit = t_exit.min(far);
    }
    if t_enter > t_exit || t_enter < 0.0 || t_enter > 1.0 {
        return None;
    }
    Some((t_enter, normal))
}

impl BoxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_box(&mut self, min: Vec3, max: Vec3) -> BodyId {
        let id = BodyId(self.boxes.len() as u64 + 1);
        self.boxes.push(Aabb { min, max, id });
        id
    }

    pub fn with_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.add_box(min, max);
        self
    }

    /// Force every overlap query to report `value` (or restore geometry when `None`).
    pub fn set_overlap_override(&mut self, value: Option<bool>) {
        self.overlap_override = value;
    }

    pub fn query_count(&self) -> u32 {
        self.queries.get()
    }

    pub fn reset_query_count(&self) {
        self.queries.set(0);
    }
}

impl WorldQuery for BoxWorld {
    fn sweep(
        &self,
        shape: TraceShape,
        start: Vec3,
        end: Vec3,
        ignore: Option<BodyId>,
    ) -> Option<TraceHit> {
        self.queries.set(self.queries.get() + 1);
        let e = shape_extents(shape);
        let delta = end - start;
        let len = delta.norm();
        let mut best: Option<(f32, Vec3, &Aabb)> = None;
        for b in &self.boxes {
            if Some(b.id) == ignore {
                continue;
            }
            if let Some((t, n)) = segment_box(start, delta, b.min - e, b.max + e) {
                if best.is_none_or(|(bt, _, _)| t < bt) {
                    best = Some((t, n, b));
                }
            }
        }
        best.map(|(t, normal, b)| {
            let center = start + delta * t;
            let toward = center - normal.component_mul(&e);
            let point = Vec3::new(
                toward.x.clamp(b.min.x, b.max.x),
                toward.y.clamp(b.min.y, b.max.y),
                toward.z.clamp(b.min.z, b.max.z),
            );
            TraceHit {
                point,
                normal,
                distance: t * len,
                body: Some(b.id),
            }
        })
    }

    fn overlap(&self, shape: TraceShape, center: Vec3, ignore: Option<BodyId>) -> bool {
        self.queries.set(self.queries.get() + 1);
        if let Some(v) = self.overlap_override {
            return v;
        }
        let e = shape_extents(shape);
        let (lo, hi) = (center - e, center + e);
        self.boxes.iter().any(|b| {
            Some(b.id) != ignore
                && lo.x < b.max.x
                && hi.x > b.min.x
                && lo.y < b.max.y
                && hi.y > b.min.y
                && lo.z < b.max.z
                && hi.z > b.min.z
        })
    }
}

/// Character body that records every command it receives.
#[derive(Clone, Debug)]
pub struct RecordingBody {
    pub transform: Transform,
    pub velocity: Vec3,
    pub capsule: CapsuleSpec,
    pub mode: MovementMode,
    pub max_speed: f32,
    pub control_yaw: Option<f32>,
    pub climb_anchor: Option<Transform>,
    pub foot_anchors: [Option<Vec3>; 2],
    pub viewpoint: Option<Vec3>,
    pub jumps: Vec<f32>,
    pub teleports: Vec<Transform>,
    pub stops: u32,
    pub mode_changes: Vec<MovementMode>,
}

impl RecordingBody {
    /// Facing -Z with the feet at `feet`.
    pub fn standing_at(feet: Vec3) -> Self {
        let capsule = CapsuleSpec {
            radius: 30.0,
            half_height: 60.0,
        };
        Self {
            transform: Transform::from_translation(feet + Vec3::y() * capsule.feet_offset()),
            velocity: Vec3::zeros(),
            capsule,
            mode: MovementMode::Walking,
            max_speed: 600.0,
            control_yaw: None,
            climb_anchor: None,
            foot_anchors: [None, None],
            viewpoint: None,
            jumps: Vec::new(),
            teleports: Vec::new(),
            stops: 0,
            mode_changes: Vec::new(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mode(mut self, mode: MovementMode) -> Self {
        self.mode = mode;
        self
    }
}

impl CharacterBody for RecordingBody {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn capsule(&self) -> CapsuleSpec {
        self.capsule
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn control_yaw(&self) -> f32 {
        self.control_yaw
            .unwrap_or_else(|| crate::utils::yaw_of(&self.transform.rotation))
    }

    fn climb_probe_anchor(&self) -> Option<Transform> {
        self.climb_anchor
    }

    fn foot_anchor(&self, side: Side) -> Option<Vec3> {
        self.foot_anchors[side.index()]
    }

    fn viewpoint(&self) -> Option<Vec3> {
        self.viewpoint
    }

    fn teleport(&mut self, transform: &Transform) {
        self.transform = *transform;
        self.teleports.push(*transform);
    }

    fn jump(&mut self, impulse: f32) {
        self.jumps.push(impulse);
    }

    fn stop_movement(&mut self) {
        self.velocity = Vec3::zeros();
        self.stops += 1;
    }

    fn set_movement_mode(&mut self, mode: MovementMode) {
        self.mode = mode;
        self.mode_changes.push(mode);
    }
}

#[derive(Default, Debug)]
pub struct RecordingAligner {
    pub targets: Vec<RuntimeWarpTarget>,
    pub set_calls: u32,
    pub clears: u32,
}

impl RootMotionAligner for RecordingAligner {
    fn set_targets(&mut self, targets: &[RuntimeWarpTarget]) {
        self.targets = targets.to_vec();
        self.set_calls += 1;
    }

    fn clear_targets(&mut self) {
        self.targets.clear();
        self.clears += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerEvent {
    Result(ParkourAction),
    State(StateChange),
    Failed(AbortReason),
    Finished(ParkourAction),
}

/// Listener whose clones share one event log.
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<ListenerEvent>>>,
}

impl RecordingListener {
    pub fn take(&self) -> Vec<ListenerEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl ParkourListener for RecordingListener {
    fn on_result_changed(&mut self, result: &ParkourResult) {
        self.events.borrow_mut().push(ListenerEvent::Result(result.action));
    }

    fn on_state_changed(&mut self, change: StateChange) {
        self.events.borrow_mut().push(ListenerEvent::State(change));
    }

    fn on_parkour_failed(&mut self, reason: AbortReason) {
        self.events.borrow_mut().push(ListenerEvent::Failed(reason));
    }

    fn on_action_finished(&mut self, action: ParkourAction) {
        self.events.borrow_mut().push(ListenerEvent::Finished(action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_reports_face_contact_and_distance() {
        let world = BoxWorld::new().with_box(
            Vec3::new(-100.0, 0.0, -400.0),
            Vec3::new(100.0, 45.0, -80.0),
        );
        let hit = world
            .sweep(
                TraceShape::Sphere { radius: 10.0 },
                Vec3::new(0.0, 20.0, 0.0),
                Vec3::new(0.0, 20.0, -200.0),
                None,
            )
            .unwrap();
        assert!((hit.distance - 70.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::z()).norm() < 1e-6);
        assert!((hit.point - Vec3::new(0.0, 20.0, -80.0)).norm() < 1e-3);
        assert_eq!(world.query_count(), 1);
    }

    #[test]
    fn sweep_ignores_boxes_containing_the_origin_and_excluded_ids() {
        let mut world = BoxWorld::new();
        let floor = world.add_box(Vec3::new(-500.0, -50.0, -500.0), Vec3::new(500.0, 0.0, 500.0));
        let shape = TraceShape::Capsule {
            radius: 20.0,
            half_height: 50.0,
        };
        assert!(world
            .sweep(shape, Vec3::new(0.0, 40.0, 0.0), Vec3::new(0.0, 40.0, -100.0), None)
            .is_none());
        assert!(world
            .sweep(shape, Vec3::new(0.0, 200.0, 0.0), Vec3::new(0.0, 0.0, 0.0), Some(floor))
            .is_none());
    }

    #[test]
    fn overlap_and_override() {
        let mut world = BoxWorld::new().with_box(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        let s = TraceShape::Sphere { radius: 1.0 };
        assert!(world.overlap(s, Vec3::new(5.0, 10.5, 5.0), None));
        assert!(!world.overlap(s, Vec3::new(5.0, 12.0, 5.0), None));
        world.set_overlap_override(Some(false));
        assert!(!world.overlap(s, Vec3::new(5.0, 5.0, 5.0), None));
    }
}
